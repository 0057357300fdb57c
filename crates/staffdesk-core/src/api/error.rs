use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Classification of API failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// No response: connection failure or timeout
    Network,
    /// 400 with a structured body
    Validation,
    /// 401
    Unauthorized,
    /// 404
    NotFound,
    /// Any other non-success status (403, 5xx, ...)
    Server,
    /// Response body could not be decoded
    Parse,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Network => write!(f, "network"),
            ApiErrorKind::Validation => write!(f, "validation"),
            ApiErrorKind::Unauthorized => write!(f, "unauthorized"),
            ApiErrorKind::NotFound => write!(f, "not_found"),
            ApiErrorKind::Server => write!(f, "server"),
            ApiErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// Structured failure from the HTTP pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// HTTP status, absent for network failures
    pub status: Option<u16>,
    /// One-line summary suitable for display
    pub message: String,
    /// Decoded response body, if any
    pub body: Option<Value>,
    /// Set when a 401 survived a failed token refresh
    #[serde(default)]
    pub session_expired: bool,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
            body: None,
            session_expired: false,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Parse, message)
    }

    /// Builds an error from a non-success status and its decoded body.
    pub fn from_status(status: u16, body: Value) -> Self {
        let kind = match status {
            400 => ApiErrorKind::Validation,
            401 => ApiErrorKind::Unauthorized,
            404 => ApiErrorKind::NotFound,
            _ => ApiErrorKind::Server,
        };
        let message = match detail_of(&body) {
            Some(detail) => format!("HTTP {status}: {detail}"),
            None => format!("HTTP {status}"),
        };
        let body = if body.is_null() { None } else { Some(body) };

        Self {
            kind,
            status: Some(status),
            message,
            body,
            session_expired: false,
        }
    }

    /// Marks this failure as the end of a session.
    #[must_use]
    pub fn session_expired(mut self) -> Self {
        self.session_expired = true;
        self
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }

    /// The backend's `detail` string, when it sent one.
    pub fn detail(&self) -> Option<&str> {
        self.body.as_ref().and_then(detail_of)
    }

    /// `detail` if present, otherwise the given fallback.
    pub fn detail_or(&self, fallback: impl Into<String>) -> String {
        self.detail()
            .map_or_else(|| fallback.into(), ToString::to_string)
    }
}

fn detail_of(body: &Value) -> Option<&str> {
    body.get("detail")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.session_expired {
            write!(f, "Session expired: {}", self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::network("Request timed out")
        } else if err.is_decode() {
            ApiError::parse(format!("Failed to decode response: {err}"))
        } else {
            ApiError::network(format!("Request failed: {err}"))
        }
    }
}

/// Result type for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(
            ApiError::from_status(400, json!({"name": ["required"]})).kind,
            ApiErrorKind::Validation
        );
        assert_eq!(
            ApiError::from_status(401, Value::Null).kind,
            ApiErrorKind::Unauthorized
        );
        assert_eq!(
            ApiError::from_status(404, Value::Null).kind,
            ApiErrorKind::NotFound
        );
        assert_eq!(
            ApiError::from_status(403, Value::Null).kind,
            ApiErrorKind::Server
        );
        assert_eq!(
            ApiError::from_status(502, Value::Null).kind,
            ApiErrorKind::Server
        );
    }

    #[test]
    fn test_detail_extraction() {
        let err = ApiError::from_status(403, json!({"detail": "Not allowed."}));
        assert_eq!(err.detail(), Some("Not allowed."));
        assert_eq!(err.message, "HTTP 403: Not allowed.");
        assert_eq!(err.detail_or("fallback"), "Not allowed.");

        let err = ApiError::from_status(500, json!("<html>"));
        assert_eq!(err.detail(), None);
        assert_eq!(err.detail_or("fallback"), "fallback");
    }

    #[test]
    fn test_session_expired_display() {
        let err = ApiError::from_status(401, Value::Null).session_expired();
        assert!(err.session_expired);
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Session expired: HTTP 401");
    }
}
