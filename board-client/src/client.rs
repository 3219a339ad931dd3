use tracing::info;
use validator::Validate;

use crate::api::BoardApi;
use crate::error::{AuthError, BoardClientError, BoardClientResult};
use crate::listing::{FetchOutcome, ListingController};
use crate::models::{Post, PostRequest, UserProfile};
use crate::session::{Session, SessionManager};
use crate::storage::TokenStore;

/// Клиент форума: сессия плюс операции над постами.
///
/// Токен для каждого авторизованного запроса берётся из сессии в момент
/// вызова; общих заголовков по умолчанию нет.
pub struct BoardClient<A, S> {
    session: SessionManager<A, S>,
}

impl<A, S> BoardClient<A, S>
where
    A: BoardApi + Clone,
    S: TokenStore,
{
    /// Создаёт клиент с пустой сессией.
    pub fn new(api: A, store: S) -> Self {
        Self {
            session: SessionManager::new(api, store),
        }
    }

    /// Восстанавливает сессию из хранилища. Вызывается при старте.
    pub async fn restore(&mut self) {
        self.session.restore().await;
    }

    /// Перезапрашивает профиль; при отказе сервера выполняет выход.
    pub async fn refresh(&mut self) -> bool {
        self.session.refresh().await
    }

    /// Вход. См. [`SessionManager::login`].
    pub async fn login(&mut self, username: &str, password: &str) -> Result<UserProfile, AuthError> {
        self.session.login(username, password).await
    }

    /// Регистрация. См. [`SessionManager::signup`].
    pub async fn signup(
        &self,
        username: &str,
        password: &str,
        email: &str,
        full_name: &str,
    ) -> Result<(), AuthError> {
        self.session.signup(username, password, email, full_name).await
    }

    /// Выход.
    pub fn logout(&mut self) {
        self.session.logout();
    }

    /// Текущая сессия.
    pub fn session(&self) -> &Session {
        self.session.session()
    }

    /// Профиль вошедшего пользователя.
    pub fn current_user(&self) -> Option<&UserProfile> {
        self.session.user()
    }

    /// Вошёл ли пользователь.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Новый контроллер списка постов поверх того же API.
    pub fn listing(&self) -> ListingController<A> {
        ListingController::new(self.session.api().clone())
    }

    /// Загружает страницу списка с токеном текущей сессии.
    pub async fn fetch_listing(
        &self,
        listing: &ListingController<A>,
    ) -> BoardClientResult<FetchOutcome> {
        listing.fetch(self.session.token()).await
    }

    /// Возвращает пост целиком.
    pub async fn get_post(&self, id: i64) -> BoardClientResult<Post> {
        self.session.api().get_post(self.session.token(), id).await
    }

    /// Создаёт пост от имени вошедшего пользователя.
    pub async fn create_post(&self, title: &str, content: &str) -> BoardClientResult<Post> {
        let token = self.require_token()?;
        let request = PostRequest::new(title, content);
        request.validate()?;

        let post = self.session.api().create_post(token, &request).await?;
        info!(id = post.id, "post created");
        Ok(post)
    }

    /// Изменяет заголовок и содержимое поста.
    pub async fn update_post(&self, id: i64, title: &str, content: &str) -> BoardClientResult<Post> {
        let token = self.require_token()?;
        let request = PostRequest::new(title, content);
        request.validate()?;

        let post = self.session.api().update_post(token, id, &request).await?;
        info!(id, "post updated");
        Ok(post)
    }

    /// Удаляет пост.
    pub async fn delete_post(&self, id: i64) -> BoardClientResult<()> {
        let token = self.require_token()?;
        self.session.api().delete_post(token, id).await?;
        info!(id, "post deleted");
        Ok(())
    }

    /// Является ли вошедший пользователь автором поста.
    pub fn is_author(&self, post: &Post) -> bool {
        self.session
            .user()
            .is_some_and(|user| user.username == post.author_name)
    }

    fn require_token(&self) -> BoardClientResult<&str> {
        self.session.token().ok_or(BoardClientError::Unauthorized(None))
    }
}
