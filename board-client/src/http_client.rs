use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::api::BoardApi;
use crate::error::{BoardClientError, BoardClientResult};
use crate::models::{
    AuthResponse, LoginRequest, Post, PostPage, PostRequest, SignupRequest, UserProfile,
};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    error: Option<String>,
    // Ошибки @Valid приходят в стандартном теле Spring.
    message: Option<String>,
}

#[derive(Serialize)]
struct PageQuery {
    page: u32,
    size: u32,
}

#[derive(Serialize)]
struct SearchQuery<'a> {
    keyword: &'a str,
    page: u32,
    size: u32,
}

#[derive(Debug, Clone)]
/// HTTP-клиент REST API сервера форума.
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Создаёт клиент с базовым URL сервера и таймаутами по умолчанию.
    pub fn new(base_url: impl Into<String>) -> BoardClientResult<Self> {
        Self::with_timeouts(base_url, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Создаёт клиент с явными таймаутами подключения и запроса.
    pub fn with_timeouts(
        base_url: impl Into<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> BoardClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Базовый URL сервера.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let url = self.endpoint(path);
        debug!(method = method.as_str(), url = url.as_str(), authenticated = token.is_some(), "sending request");

        let request = self.client.request(method, url);
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn parse_error_message(raw: &str) -> Option<String> {
        let body = serde_json::from_str::<ErrorResponseDto>(raw).ok()?;
        body.error
            .or(body.message)
            .filter(|message| !message.trim().is_empty())
    }

    async fn decode_error(response: Response) -> BoardClientError {
        let status = response.status();
        let message = match response.text().await {
            Ok(raw) => Self::parse_error_message(&raw),
            Err(_) => None,
        };
        debug!(%status, ?message, "request failed");
        BoardClientError::from_http_status(status, message)
    }

    async fn send(request: RequestBuilder) -> BoardClientResult<Response> {
        let response = request
            .send()
            .await
            .map_err(BoardClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    async fn send_json<TRes>(request: RequestBuilder) -> BoardClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        Self::send(request)
            .await?
            .json::<TRes>()
            .await
            .map_err(BoardClientError::from_reqwest)
    }
}

#[async_trait]
impl BoardApi for HttpClient {
    async fn current_user(&self, token: &str) -> BoardClientResult<UserProfile> {
        Self::send_json(self.request(Method::GET, "/api/auth/me", Some(token))).await
    }

    async fn login(&self, request: &LoginRequest) -> BoardClientResult<AuthResponse> {
        Self::send_json(self.request(Method::POST, "/api/auth/login", None).json(request)).await
    }

    async fn signup(&self, request: &SignupRequest) -> BoardClientResult<()> {
        Self::send(self.request(Method::POST, "/api/auth/signup", None).json(request)).await?;
        Ok(())
    }

    async fn list_posts(
        &self,
        token: Option<&str>,
        page: u32,
        size: u32,
    ) -> BoardClientResult<PostPage> {
        let query = PageQuery { page, size };
        Self::send_json(self.request(Method::GET, "/api/posts", token).query(&query)).await
    }

    async fn search_posts(
        &self,
        token: Option<&str>,
        keyword: &str,
        page: u32,
        size: u32,
    ) -> BoardClientResult<PostPage> {
        let query = SearchQuery {
            keyword,
            page,
            size,
        };
        Self::send_json(
            self.request(Method::GET, "/api/posts/search", token)
                .query(&query),
        )
        .await
    }

    async fn get_post(&self, token: Option<&str>, id: i64) -> BoardClientResult<Post> {
        Self::send_json(self.request(Method::GET, &format!("/api/posts/{id}"), token)).await
    }

    async fn create_post(&self, token: &str, request: &PostRequest) -> BoardClientResult<Post> {
        Self::send_json(
            self.request(Method::POST, "/api/posts", Some(token))
                .json(request),
        )
        .await
    }

    async fn update_post(
        &self,
        token: &str,
        id: i64,
        request: &PostRequest,
    ) -> BoardClientResult<Post> {
        Self::send_json(
            self.request(Method::PUT, &format!("/api/posts/{id}"), Some(token))
                .json(request),
        )
        .await
    }

    async fn delete_post(&self, token: &str, id: i64) -> BoardClientResult<()> {
        Self::send(self.request(Method::DELETE, &format!("/api/posts/{id}"), Some(token))).await?;
        Ok(())
    }
}
