//! Состояние аутентификации клиента.
//!
//! Токен и профиль живут в одном значении [`Session`], поэтому состояние
//! "токен без пользователя" или "пользователь без токена" наружу не видно:
//! токен из хранилища становится сессией только после проверки на сервере.

use tracing::{debug, info, warn};
use validator::Validate;

use crate::api::BoardApi;
use crate::error::{AuthError, BoardClientError};
use crate::models::{LoginRequest, SignupRequest, UserProfile};
use crate::storage::TokenStore;

const LOGIN_FAILED: &str = "Не удалось войти";
const SIGNUP_FAILED: &str = "Не удалось зарегистрироваться";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Текущая сессия.
pub enum Session {
    /// Пользователь не вошёл.
    #[default]
    Anonymous,
    /// Токен проверен сервером, профиль получен.
    Authenticated {
        /// Токен доступа.
        token: String,
        /// Профиль пользователя.
        user: UserProfile,
    },
}

impl Session {
    /// Токен, если сессия активна.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Authenticated { token, .. } => Some(token),
            Self::Anonymous => None,
        }
    }

    /// Профиль, если сессия активна.
    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated { user, .. } => Some(user),
            Self::Anonymous => None,
        }
    }

    /// Есть и токен, и профиль.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some() && self.user().is_some()
    }
}

/// Единственный источник правды о том, кто вошёл в систему.
pub struct SessionManager<A, S> {
    api: A,
    store: S,
    session: Session,
}

impl<A, S> SessionManager<A, S>
where
    A: BoardApi,
    S: TokenStore,
{
    /// Создаёт менеджер с пустой сессией. Сохранённый токен читается только
    /// в [`SessionManager::restore`].
    pub fn new(api: A, store: S) -> Self {
        Self {
            api,
            store,
            session: Session::Anonymous,
        }
    }

    /// Восстанавливает сессию из сохранённого токена.
    ///
    /// Любая ошибка проверки токена приводит к выходу; наружу ошибка не
    /// передаётся.
    pub async fn restore(&mut self) {
        let token = match self.store.load() {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("no stored token, starting anonymous");
                self.session = Session::Anonymous;
                return;
            }
            Err(err) => {
                warn!(error = %err, "failed to read stored token");
                self.logout();
                return;
            }
        };

        self.validate(token).await;
    }

    /// Перезапрашивает профиль по текущему токену.
    ///
    /// Возвращает `true`, если сессия осталась активной.
    pub async fn refresh(&mut self) -> bool {
        let Some(token) = self.session.token().map(str::to_string) else {
            return false;
        };
        self.validate(token).await;
        self.is_authenticated()
    }

    async fn validate(&mut self, token: String) {
        match self.api.current_user(&token).await {
            Ok(user) => {
                debug!(username = %user.username, "token accepted");
                self.session = Session::Authenticated { token, user };
            }
            Err(err) => {
                warn!(error = %err, "token rejected, logging out");
                self.logout();
            }
        }
    }

    /// Выполняет вход и сохраняет токен.
    ///
    /// При ошибке текущая сессия не меняется, а сообщение берётся из ответа
    /// сервера, если он его прислал.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<UserProfile, AuthError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let auth = self
            .api
            .login(&request)
            .await
            .map_err(|err| AuthError::LoginFailed(err.user_message(LOGIN_FAILED)))?;

        if let Err(err) = self.store.save(&auth.token) {
            warn!(error = %err, "failed to persist token, session is kept in memory only");
        }

        info!(username = %auth.user.username, "logged in");
        let user = auth.user.clone();
        self.session = Session::Authenticated {
            token: auth.token,
            user: auth.user,
        };
        Ok(user)
    }

    /// Регистрирует пользователя. Сессию не создаёт: после регистрации нужен
    /// отдельный вход.
    pub async fn signup(
        &self,
        username: &str,
        password: &str,
        email: &str,
        full_name: &str,
    ) -> Result<(), AuthError> {
        let request = SignupRequest {
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
            full_name: full_name.to_string(),
        };

        let result = match request.validate() {
            Ok(()) => self.api.signup(&request).await,
            Err(errors) => Err(BoardClientError::from(errors)),
        };

        result.map_err(|err| AuthError::SignupFailed(err.user_message(SIGNUP_FAILED)))?;
        info!(username, "signed up");
        Ok(())
    }

    /// Очищает сессию в памяти и в хранилище. Повторный вызов ничего не
    /// меняет.
    pub fn logout(&mut self) {
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to clear stored token");
        }
        if self.session.is_authenticated() {
            info!("logged out");
        }
        self.session = Session::Anonymous;
    }

    /// Текущая сессия.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Токен для авторизованных запросов.
    pub fn token(&self) -> Option<&str> {
        self.session.token()
    }

    /// Профиль вошедшего пользователя.
    pub fn user(&self) -> Option<&UserProfile> {
        self.session.user()
    }

    /// Вошёл ли пользователь.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// API, через которое работает менеджер.
    pub fn api(&self) -> &A {
        &self.api
    }
}
