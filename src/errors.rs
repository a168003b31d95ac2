use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to encode habits: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write habit file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("assistant is not configured")]
    Unavailable,
    #[error("assistant rate limit reached")]
    RateLimited,
    #[error("assistant timed out")]
    Timeout,
    #[error("assistant returned HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("assistant request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("assistant returned an unusable response: {0}")]
    InvalidResponse(String),
}

impl AssistantError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AssistantError::RateLimited)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}
