//! HTTP pipeline: client, request/response stages, structured errors.

pub mod client;
pub mod error;
pub mod middleware;
pub mod request;

pub use client::ApiClient;
pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use middleware::{BearerAuth, RefreshOnUnauthorized, RequestStage, ResponseStage};
pub use request::{ApiRequest, ApiResponse};
