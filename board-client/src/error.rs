use reqwest::StatusCode;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `board-client`.
pub enum BoardClientError {
    /// Ошибка HTTP-транспорта (`reqwest`): сеть недоступна, таймаут,
    /// некорректное тело ответа.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Требуется авторизация (отсутствует/отклонён токен).
    ///
    /// Внутри сообщение сервера, если оно было.
    #[error("unauthorized")]
    Unauthorized(Option<String>),

    /// Запрошенный ресурс не найден.
    #[error("not found")]
    NotFound(Option<String>),

    /// Сервер ответил неуспешным статусом.
    ///
    /// `message` заполняется, если сервер вернул тело вида `{"error": "..."}`.
    #[error("api error {status}: {}", message.as_deref().unwrap_or("no details"))]
    Api {
        /// HTTP-статус ответа.
        status: StatusCode,
        /// Сообщение сервера, если оно было.
        message: Option<String>,
    },

    /// Входные данные не прошли локальную проверку; запрос не отправлялся.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),
}

/// Результат операций `board-client`.
pub type BoardClientResult<T> = Result<T, BoardClientError>;

impl BoardClientError {
    pub(crate) fn from_http_status(status: StatusCode, message: Option<String>) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            _ => Self::Api { status, message },
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None);
        }
        Self::Http(err)
    }

    /// Сообщение, которое пришло от сервера (или из локальной валидации),
    /// если оно есть.
    pub fn server_message(&self) -> Option<String> {
        match self {
            Self::Api { message, .. } | Self::Unauthorized(message) | Self::NotFound(message) => {
                message.clone()
            }
            Self::Validation(errors) => Some(errors.to_string()),
            _ => None,
        }
    }

    /// Сообщение для пользователя: приоритет у причины от сервера,
    /// иначе используется `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message()
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Ошибки операций сессии, которые показываются пользователю как есть.
pub enum AuthError {
    /// Вход не выполнен.
    #[error("{0}")]
    LoginFailed(String),

    /// Регистрация не выполнена.
    #[error("{0}")]
    SignupFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_auth_statuses_to_unauthorized() {
        let err = BoardClientError::from_http_status(StatusCode::FORBIDDEN, None);
        assert!(matches!(err, BoardClientError::Unauthorized(None)));
    }

    #[test]
    fn auth_and_missing_statuses_keep_server_reason() {
        let err = BoardClientError::from_http_status(
            StatusCode::UNAUTHORIZED,
            Some("계정이 잠겼습니다".to_string()),
        );
        assert_eq!(err.user_message("fallback"), "계정이 잠겼습니다");

        let err = BoardClientError::from_http_status(
            StatusCode::NOT_FOUND,
            Some("게시글을 찾을 수 없습니다".to_string()),
        );
        assert!(matches!(err, BoardClientError::NotFound(Some(_))));
        assert_eq!(err.user_message("fallback"), "게시글을 찾을 수 없습니다");
    }

    #[test]
    fn maps_missing_resource_to_not_found() {
        let err = BoardClientError::from_http_status(StatusCode::NOT_FOUND, None);
        assert!(matches!(err, BoardClientError::NotFound(None)));
    }

    #[test]
    fn user_message_prefers_server_reason() {
        let err = BoardClientError::from_http_status(
            StatusCode::BAD_REQUEST,
            Some("이미 존재하는 사용자명입니다".to_string()),
        );
        assert_eq!(err.user_message("fallback"), "이미 존재하는 사용자명입니다");
    }

    #[test]
    fn user_message_falls_back_without_reason() {
        let err = BoardClientError::from_http_status(StatusCode::INTERNAL_SERVER_ERROR, None);
        assert_eq!(err.user_message("fallback"), "fallback");

        let blank = BoardClientError::Api {
            status: StatusCode::BAD_REQUEST,
            message: Some("  ".to_string()),
        };
        assert_eq!(blank.user_message("fallback"), "fallback");
    }
}
