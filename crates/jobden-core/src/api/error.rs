use serde_json::Value;
use thiserror::Error;

use crate::auth::RefreshError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - please log in again")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rejected by server: {0}")]
    Validation(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Request failed with status {status}: {message}")]
    Request { status: u16, message: String },

    #[error("Session expired: {0}")]
    SessionExpired(#[from] RefreshError),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Session storage error: {0}")]
    Storage(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull the human-readable message out of an error body.
    ///
    /// The backend answers `{"detail": "..."}`, `{"message": "..."}`, or for
    /// schema failures `{"detail": [{"loc": [...], "msg": "..."}]}`.
    pub fn extract_message(body: &str) -> String {
        let Ok(json) = serde_json::from_str::<Value>(body) else {
            return Self::truncate_body(body);
        };

        match json.get("detail") {
            Some(Value::String(detail)) => return detail.clone(),
            Some(Value::Array(items)) => {
                let messages: Vec<String> = items
                    .iter()
                    .filter_map(|item| {
                        let msg = item.get("msg")?.as_str()?;
                        let field = item
                            .get("loc")
                            .and_then(Value::as_array)
                            .and_then(|loc| loc.last())
                            .and_then(Value::as_str);
                        Some(match field {
                            Some(field) => format!("{}: {}", field, msg),
                            None => msg.to_string(),
                        })
                    })
                    .collect();
                if !messages.is_empty() {
                    return messages.join("; ");
                }
            }
            _ => {}
        }

        if let Some(message) = json.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
        Self::truncate_body(body)
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::extract_message(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            422 => ApiError::Validation(message),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(message),
            code => ApiError::Request {
                status: code,
                message,
            },
        }
    }

    /// True when the session is gone and the user must log in again.
    pub fn requires_login(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::SessionExpired(_))
    }

    /// Text for a one-off user notification.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized | ApiError::SessionExpired(_) => {
                "Your session has expired. Please log in again.".to_string()
            }
            ApiError::AccessDenied(msg)
            | ApiError::NotFound(msg)
            | ApiError::Validation(msg)
            | ApiError::Request { message: msg, .. }
                if !msg.is_empty() =>
            {
                msg.clone()
            }
            ApiError::InvalidCredentials => "Incorrect email or password".to_string(),
            ApiError::RateLimited => "Too many requests. Please wait and try again.".to_string(),
            ApiError::ServerError(_) => "The server ran into a problem. Please try again later.".to_string(),
            ApiError::NetworkError(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::NetworkError(_) => {
                "Unable to connect to server. Check your internet connection.".to_string()
            }
            _ => "An unexpected error occurred".to_string(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Storage(format!("{:#}", e))
    }
}
