use std::borrow::Cow;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Размер страницы списка постов.
pub const PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Профиль пользователя, как его отдаёт сервер.
///
/// Заменяется целиком при каждом запросе профиля.
pub struct UserProfile {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    pub username: String,
    /// Email.
    pub email: String,
    /// Полное имя.
    pub full_name: String,
    /// Роль (`USER`, `ADMIN`, ...).
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Пост целиком, со содержимым.
pub struct Post {
    /// Идентификатор поста.
    pub id: i64,
    /// Заголовок.
    pub title: String,
    /// Содержимое.
    pub content: String,
    /// Логин автора.
    pub author_name: String,
    /// Количество просмотров.
    pub view_count: i64,
    /// Время создания (локальное время сервера).
    pub created_at: NaiveDateTime,
    /// Время последнего изменения.
    pub updated_at: NaiveDateTime,
}

impl Post {
    /// Был ли пост изменён после создания.
    pub fn is_edited(&self) -> bool {
        self.updated_at != self.created_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Элемент списка постов. Содержимое в списке не передаётся.
pub struct PostSummary {
    /// Идентификатор поста.
    pub id: i64,
    /// Заголовок.
    pub title: String,
    /// Логин автора.
    pub author_name: String,
    /// Количество просмотров.
    pub view_count: i64,
    /// Время создания.
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Одна страница списка постов.
pub struct PostPage {
    /// Посты на странице.
    pub content: Vec<PostSummary>,
    /// Всего страниц.
    pub total_pages: u32,
    /// Всего постов.
    pub total_elements: u64,
    /// Номер страницы (с нуля).
    pub number: u32,
    /// Размер страницы.
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Ответ на успешный вход.
pub struct AuthResponse {
    /// Токен доступа, непрозрачная строка.
    pub token: String,
    /// Профиль вошедшего пользователя.
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize)]
/// Данные для входа.
pub struct LoginRequest {
    /// Логин.
    pub username: String,
    /// Пароль.
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
/// Данные регистрации. Ограничения совпадают с серверными.
pub struct SignupRequest {
    /// Логин, 3–20 символов.
    #[validate(
        length(min = 3, max = 20, message = "имя пользователя должно быть от 3 до 20 символов"),
        custom(function = "not_blank")
    )]
    pub username: String,
    /// Пароль, не короче 6 символов.
    #[validate(
        length(min = 6, message = "пароль должен быть не короче 6 символов"),
        custom(function = "not_blank")
    )]
    pub password: String,
    /// Email.
    #[validate(email(message = "некорректный email"))]
    pub email: String,
    /// Полное имя.
    #[validate(custom(function = "not_blank"))]
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
/// Тело запроса создания и изменения поста.
pub struct PostRequest {
    /// Заголовок.
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    /// Содержимое.
    #[validate(custom(function = "not_blank"))]
    pub content: String,
}

impl PostRequest {
    /// Собирает тело запроса из заголовка и содержимого.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("не должно быть пустым")));
    }
    Ok(())
}
