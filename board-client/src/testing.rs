//! Поддельный сервер форума в памяти для модульных тестов.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::StatusCode;
use tokio::sync::Notify;

use crate::api::BoardApi;
use crate::error::{BoardClientError, BoardClientResult};
use crate::models::{
    AuthResponse, LoginRequest, Post, PostPage, PostRequest, PostSummary, SignupRequest,
    UserProfile,
};

pub(crate) const BAD_CREDENTIALS: &str = "로그인에 실패했습니다. 사용자명과 비밀번호를 확인해주세요.";
pub(crate) const DUPLICATE_USERNAME: &str = "이미 존재하는 사용자명입니다.";

#[derive(Default)]
struct FakeState {
    users: Vec<(UserProfile, String)>,
    tokens: HashMap<String, i64>,
    posts: Vec<Post>,
    issued_tokens: u32,
    calls: Vec<String>,
    offline: bool,
    page_gates: HashMap<u32, Arc<Notify>>,
}

#[derive(Default)]
pub(crate) struct FakeBoard {
    state: Mutex<FakeState>,
}

pub(crate) fn timestamp(minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|date| date.and_hms_opt(10, minute, 0))
        .expect("valid timestamp")
}

impl FakeBoard {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_user(self, username: &str, password: &str) -> Self {
        {
            let mut state = self.lock();
            let id = state.users.len() as i64 + 1;
            state.users.push((profile(id, username), password.to_string()));
        }
        self
    }

    pub(crate) fn with_posts(self, author: &str, count: usize) -> Self {
        {
            let mut state = self.lock();
            for _ in 0..count {
                let id = state.posts.len() as i64 + 1;
                state.posts.push(Post {
                    id,
                    title: format!("post {id}"),
                    content: format!("content {id}"),
                    author_name: author.to_string(),
                    view_count: 0,
                    created_at: timestamp(0),
                    updated_at: timestamp(0),
                });
            }
        }
        self
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub(crate) fn revoke(&self, token: &str) {
        self.lock().tokens.remove(token);
    }

    /// Задерживает `list_posts`/`search_posts` для страницы `page`, пока не
    /// сработает возвращённый `Notify`.
    pub(crate) fn gate_page(&self, page: u32) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.lock().page_gates.insert(page, gate.clone());
        gate
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub(crate) fn count_calls(&self, prefix: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: String) -> BoardClientResult<MutexGuard<'_, FakeState>> {
        let mut state = self.lock();
        state.calls.push(call);
        if state.offline {
            // Шлюз без тела: сообщения сервера у вызывающего не будет.
            return Err(BoardClientError::Api {
                status: StatusCode::BAD_GATEWAY,
                message: None,
            });
        }
        Ok(state)
    }

    fn user_for(state: &FakeState, token: &str) -> BoardClientResult<UserProfile> {
        let id = state.tokens.get(token).ok_or(BoardClientError::Unauthorized(None))?;
        state
            .users
            .iter()
            .find(|(user, _)| user.id == *id)
            .map(|(user, _)| user.clone())
            .ok_or(BoardClientError::Unauthorized(None))
    }

    async fn page(
        &self,
        call: String,
        keyword: Option<&str>,
        page: u32,
        size: u32,
    ) -> BoardClientResult<PostPage> {
        let gate = {
            let state = self.record(call)?;
            state.page_gates.get(&page).cloned()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let state = self.lock();
        if state.offline {
            return Err(BoardClientError::Api {
                status: StatusCode::BAD_GATEWAY,
                message: None,
            });
        }
        let matching: Vec<PostSummary> = state
            .posts
            .iter()
            .filter(|post| keyword.is_none_or(|keyword| post.title.contains(keyword)))
            .map(summary)
            .collect();

        let total_elements = matching.len() as u64;
        let total_pages = total_elements.div_ceil(u64::from(size)) as u32;
        let content = matching
            .into_iter()
            .skip((page * size) as usize)
            .take(size as usize)
            .collect();

        Ok(PostPage {
            content,
            total_pages,
            total_elements,
            number: page,
            size,
        })
    }
}

fn profile(id: i64, username: &str) -> UserProfile {
    UserProfile {
        id,
        username: username.to_string(),
        email: format!("{username}@example.com"),
        full_name: username.to_uppercase(),
        role: "USER".to_string(),
    }
}

fn summary(post: &Post) -> PostSummary {
    PostSummary {
        id: post.id,
        title: post.title.clone(),
        author_name: post.author_name.clone(),
        view_count: post.view_count,
        created_at: post.created_at,
    }
}

fn bearer(token: Option<&str>) -> String {
    token.map(|token| format!(" [Bearer {token}]")).unwrap_or_default()
}

#[async_trait]
impl BoardApi for FakeBoard {
    async fn current_user(&self, token: &str) -> BoardClientResult<UserProfile> {
        let state = self.record(format!("GET /api/auth/me{}", bearer(Some(token))))?;
        Self::user_for(&state, token)
    }

    async fn login(&self, request: &LoginRequest) -> BoardClientResult<AuthResponse> {
        let mut state = self.record("POST /api/auth/login".to_string())?;
        let user = state
            .users
            .iter()
            .find(|(user, password)| user.username == request.username && *password == request.password)
            .map(|(user, _)| user.clone())
            .ok_or_else(|| BoardClientError::Api {
                status: StatusCode::BAD_REQUEST,
                message: Some(BAD_CREDENTIALS.to_string()),
            })?;

        state.issued_tokens += 1;
        let token = format!("t{}", state.issued_tokens);
        state.tokens.insert(token.clone(), user.id);
        Ok(AuthResponse { token, user })
    }

    async fn signup(&self, request: &SignupRequest) -> BoardClientResult<()> {
        let mut state = self.record("POST /api/auth/signup".to_string())?;
        if state.users.iter().any(|(user, _)| user.username == request.username) {
            return Err(BoardClientError::Api {
                status: StatusCode::BAD_REQUEST,
                message: Some(DUPLICATE_USERNAME.to_string()),
            });
        }
        let id = state.users.len() as i64 + 1;
        state.users.push((profile(id, &request.username), request.password.clone()));
        Ok(())
    }

    async fn list_posts(
        &self,
        token: Option<&str>,
        page: u32,
        size: u32,
    ) -> BoardClientResult<PostPage> {
        let call = format!("GET /api/posts?page={page}&size={size}{}", bearer(token));
        self.page(call, None, page, size).await
    }

    async fn search_posts(
        &self,
        token: Option<&str>,
        keyword: &str,
        page: u32,
        size: u32,
    ) -> BoardClientResult<PostPage> {
        let call = format!(
            "GET /api/posts/search?keyword={keyword}&page={page}&size={size}{}",
            bearer(token)
        );
        self.page(call, Some(keyword), page, size).await
    }

    async fn get_post(&self, token: Option<&str>, id: i64) -> BoardClientResult<Post> {
        let state = self.record(format!("GET /api/posts/{id}{}", bearer(token)))?;
        state
            .posts
            .iter()
            .find(|post| post.id == id)
            .cloned()
            .ok_or(BoardClientError::NotFound(None))
    }

    async fn create_post(&self, token: &str, request: &PostRequest) -> BoardClientResult<Post> {
        let mut state = self.record(format!("POST /api/posts{}", bearer(Some(token))))?;
        let author = Self::user_for(&state, token)?;
        let id = state.posts.iter().map(|post| post.id).max().unwrap_or(0) + 1;
        let post = Post {
            id,
            title: request.title.clone(),
            content: request.content.clone(),
            author_name: author.username,
            view_count: 0,
            created_at: timestamp(1),
            updated_at: timestamp(1),
        };
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(
        &self,
        token: &str,
        id: i64,
        request: &PostRequest,
    ) -> BoardClientResult<Post> {
        let mut state = self.record(format!("PUT /api/posts/{id}{}", bearer(Some(token))))?;
        let author = Self::user_for(&state, token)?;
        let post = state
            .posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or(BoardClientError::NotFound(None))?;
        if post.author_name != author.username {
            return Err(BoardClientError::Api {
                status: StatusCode::BAD_REQUEST,
                message: Some("수정 권한이 없습니다.".to_string()),
            });
        }
        post.title = request.title.clone();
        post.content = request.content.clone();
        post.updated_at = timestamp(2);
        Ok(post.clone())
    }

    async fn delete_post(&self, token: &str, id: i64) -> BoardClientResult<()> {
        let mut state = self.record(format!("DELETE /api/posts/{id}{}", bearer(Some(token))))?;
        let author = Self::user_for(&state, token)?;
        let index = state
            .posts
            .iter()
            .position(|post| post.id == id)
            .ok_or(BoardClientError::NotFound(None))?;
        if state.posts[index].author_name != author.username {
            return Err(BoardClientError::Api {
                status: StatusCode::BAD_REQUEST,
                message: Some("삭제 권한이 없습니다.".to_string()),
            });
        }
        state.posts.remove(index);
        Ok(())
    }
}
