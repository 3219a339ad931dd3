use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BoardClientResult;
use crate::models::{
    AuthResponse, LoginRequest, Post, PostPage, PostRequest, SignupRequest, UserProfile,
};

/// REST-поверхность сервера форума.
///
/// Токен передаётся в каждый вызов явно: реализация не хранит состояния
/// сессии и не подставляет заголовки сама.
#[async_trait]
pub trait BoardApi: Send + Sync {
    /// `GET /api/auth/me`
    async fn current_user(&self, token: &str) -> BoardClientResult<UserProfile>;

    /// `POST /api/auth/login`
    async fn login(&self, request: &LoginRequest) -> BoardClientResult<AuthResponse>;

    /// `POST /api/auth/signup`. Тело ответа игнорируется.
    async fn signup(&self, request: &SignupRequest) -> BoardClientResult<()>;

    /// `GET /api/posts?page={page}&size={size}`
    async fn list_posts(
        &self,
        token: Option<&str>,
        page: u32,
        size: u32,
    ) -> BoardClientResult<PostPage>;

    /// `GET /api/posts/search?keyword={keyword}&page={page}&size={size}`
    async fn search_posts(
        &self,
        token: Option<&str>,
        keyword: &str,
        page: u32,
        size: u32,
    ) -> BoardClientResult<PostPage>;

    /// `GET /api/posts/{id}`
    async fn get_post(&self, token: Option<&str>, id: i64) -> BoardClientResult<Post>;

    /// `POST /api/posts`
    async fn create_post(&self, token: &str, request: &PostRequest) -> BoardClientResult<Post>;

    /// `PUT /api/posts/{id}`
    async fn update_post(
        &self,
        token: &str,
        id: i64,
        request: &PostRequest,
    ) -> BoardClientResult<Post>;

    /// `DELETE /api/posts/{id}`
    async fn delete_post(&self, token: &str, id: i64) -> BoardClientResult<()>;
}

#[async_trait]
impl<T: BoardApi + ?Sized> BoardApi for Arc<T> {
    async fn current_user(&self, token: &str) -> BoardClientResult<UserProfile> {
        (**self).current_user(token).await
    }

    async fn login(&self, request: &LoginRequest) -> BoardClientResult<AuthResponse> {
        (**self).login(request).await
    }

    async fn signup(&self, request: &SignupRequest) -> BoardClientResult<()> {
        (**self).signup(request).await
    }

    async fn list_posts(
        &self,
        token: Option<&str>,
        page: u32,
        size: u32,
    ) -> BoardClientResult<PostPage> {
        (**self).list_posts(token, page, size).await
    }

    async fn search_posts(
        &self,
        token: Option<&str>,
        keyword: &str,
        page: u32,
        size: u32,
    ) -> BoardClientResult<PostPage> {
        (**self).search_posts(token, keyword, page, size).await
    }

    async fn get_post(&self, token: Option<&str>, id: i64) -> BoardClientResult<Post> {
        (**self).get_post(token, id).await
    }

    async fn create_post(&self, token: &str, request: &PostRequest) -> BoardClientResult<Post> {
        (**self).create_post(token, request).await
    }

    async fn update_post(
        &self,
        token: &str,
        id: i64,
        request: &PostRequest,
    ) -> BoardClientResult<Post> {
        (**self).update_post(token, id, request).await
    }

    async fn delete_post(&self, token: &str, id: i64) -> BoardClientResult<()> {
        (**self).delete_post(token, id).await
    }
}
