//! Клиентская библиотека форума поверх REST API сервера.
//!
//! Основные части:
//! - [`SessionManager`] — вход, регистрация, выход и восстановление сессии
//!   из сохранённого токена;
//! - [`ListingController`] — постраничный список постов с поиском, где
//!   показывается только ответ на последний выданный запрос;
//! - [`BoardClient`] — связка сессии и операций над постами;
//! - [`HttpClient`] — реализация [`BoardApi`] на `reqwest`.
#![warn(missing_docs)]

mod api;
mod client;
mod error;
mod http_client;
mod listing;
mod models;
mod session;
mod storage;

#[cfg(test)]
mod testing;

pub use api::BoardApi;
pub use client::BoardClient;
pub use error::{AuthError, BoardClientError, BoardClientResult};
pub use http_client::HttpClient;
pub use listing::{FetchOutcome, ListingController, ListingQuery, ListingSnapshot, LoadState};
pub use models::{
    AuthResponse, LoginRequest, PAGE_SIZE, Post, PostPage, PostRequest, PostSummary,
    SignupRequest, UserProfile,
};
pub use session::{Session, SessionManager};
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore};

pub use reqwest::StatusCode;
