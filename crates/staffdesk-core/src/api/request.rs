use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;

use super::error::{ApiError, ApiResult};

/// Path of the login endpoint; 401s from it never trigger a refresh.
pub const LOGIN_PATH: &str = "/auth/login/";

/// An outbound call as it travels through the request stages.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: HeaderMap,
    /// True once this call has been resubmitted after a refresh
    pub retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn is_login(&self) -> bool {
        self.path.contains(LOGIN_PATH)
    }

    pub fn has_authorization(&self) -> bool {
        self.headers.contains_key(AUTHORIZATION)
    }

    /// Token carried in the `Authorization: Bearer` header, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
    }

    /// Replaces the `Authorization` header with `Bearer <token>`.
    ///
    /// # Errors
    /// Returns a parse error if the token contains bytes not allowed in a header.
    pub fn set_bearer(&mut self, token: &str) -> ApiResult<()> {
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| ApiError::parse(format!("Access token is not a valid header: {e}")))?;
        self.headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    /// `METHOD path` for log lines.
    pub fn describe(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// A successful response with its decoded body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// JSON body; `Null` when empty, a string when the body was not JSON
    pub body: Value,
}

/// Decodes a raw body: empty becomes `Null`, non-JSON text becomes a string.
pub(crate) fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_login_detection() {
        assert!(ApiRequest::post("/auth/login/", json!({})).is_login());
        assert!(!ApiRequest::post("/auth/token/refresh/", json!({})).is_login());
        assert!(!ApiRequest::get("/companies/").is_login());
    }

    #[test]
    fn test_set_bearer_replaces_header() {
        let mut req = ApiRequest::get("/me/");
        req.set_bearer("old").unwrap();
        req.set_bearer("new").unwrap();
        assert_eq!(req.headers.get_all(AUTHORIZATION).iter().count(), 1);
        assert_eq!(req.headers[AUTHORIZATION], "Bearer new");
        assert_eq!(req.bearer_token(), Some("new"));
    }

    #[test]
    fn test_bearer_token_absent() {
        assert_eq!(ApiRequest::get("/me/").bearer_token(), None);
    }

    #[test]
    fn test_set_bearer_rejects_newlines() {
        let mut req = ApiRequest::get("/me/");
        assert!(req.set_bearer("bad\ntoken").is_err());
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(""), Value::Null);
        assert_eq!(decode_body("{\"a\":1}"), json!({"a": 1}));
        assert_eq!(decode_body("oops"), json!("oops"));
    }
}
