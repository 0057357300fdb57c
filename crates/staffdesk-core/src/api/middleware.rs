//! Request and response stages.
//!
//! Request stages run in order before transmission and may rewrite the
//! request. Response stages run in order after transmission and may replace
//! the outcome, including by resubmitting through the client.

use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use super::client::ApiClient;
use super::error::ApiResult;
use super::request::{ApiRequest, ApiResponse};
use crate::auth::refresh::TokenRefresher;
use crate::auth::session::Session;

/// Rewrites a request before it is sent.
pub trait RequestStage: Send + Sync {
    fn name(&self) -> &'static str;

    /// # Errors
    /// Returns an error to abort the call before it is transmitted.
    fn on_request(&self, request: ApiRequest) -> ApiResult<ApiRequest>;
}

/// What a response stage can see besides the outcome.
#[derive(Clone, Copy)]
pub struct ResponseContext<'a> {
    /// The request exactly as it was transmitted
    pub request: &'a ApiRequest,
    /// Client to resubmit through
    pub client: &'a ApiClient,
}

/// Inspects or replaces the outcome of a transmitted request.
pub trait ResponseStage: Send + Sync {
    fn name(&self) -> &'static str;

    fn on_response<'a>(
        &'a self,
        ctx: ResponseContext<'a>,
        outcome: ApiResult<ApiResponse>,
    ) -> BoxFuture<'a, ApiResult<ApiResponse>>;
}

/// Attaches `Authorization: Bearer <access token>` when a token is held.
pub struct BearerAuth {
    session: Arc<Session>,
}

impl BearerAuth {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}

impl RequestStage for BearerAuth {
    fn name(&self) -> &'static str {
        "bearer_auth"
    }

    fn on_request(&self, mut request: ApiRequest) -> ApiResult<ApiRequest> {
        // A resubmission carries the token from the refresh that triggered it.
        if request.retried && request.has_authorization() {
            return Ok(request);
        }
        if let Some(token) = self.session.access_token() {
            request.set_bearer(&token)?;
        }
        Ok(request)
    }
}

/// Recovers from an expired access token: refresh once, resubmit once.
pub struct RefreshOnUnauthorized {
    session: Arc<Session>,
    refresher: TokenRefresher,
}

impl RefreshOnUnauthorized {
    pub fn new(session: Arc<Session>, refresher: TokenRefresher) -> Self {
        Self { session, refresher }
    }

    /// Session token newer than the one `request` was sent with.
    fn newer_token(&self, request: &ApiRequest) -> Option<String> {
        self.session
            .access_token()
            .filter(|current| request.bearer_token() != Some(current.as_str()))
    }
}

impl ResponseStage for RefreshOnUnauthorized {
    fn name(&self) -> &'static str {
        "refresh_on_unauthorized"
    }

    fn on_response<'a>(
        &'a self,
        ctx: ResponseContext<'a>,
        outcome: ApiResult<ApiResponse>,
    ) -> BoxFuture<'a, ApiResult<ApiResponse>> {
        async move {
            let err = match outcome {
                Err(err)
                    if err.is_unauthorized()
                        && !ctx.request.is_login()
                        && !ctx.request.retried =>
                {
                    err
                }
                other => return other,
            };

            tracing::debug!(request = %ctx.request.describe(), "401 received");

            let mut retry = ctx.request.clone();
            retry.retried = true;

            // A refresh already landed after this request went out.
            if let Some(current) = self.newer_token(ctx.request) {
                retry.set_bearer(&current)?;
                tracing::debug!(request = %retry.describe(), "resubmitting with newer token");
                return ctx.client.dispatch(retry).await;
            }

            match self.refresher.refresh().await {
                Ok(token) => {
                    retry.set_bearer(&token)?;
                    tracing::debug!(request = %retry.describe(), "resubmitting after refresh");
                    ctx.client.dispatch(retry).await
                }
                Err(refresh_err) => {
                    tracing::info!(
                        request = %ctx.request.describe(),
                        error = %refresh_err,
                        "token refresh failed, session expired"
                    );
                    Err(err.session_expired())
                }
            }
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::AUTHORIZATION;

    use super::*;
    use crate::storage::MemoryStore;

    fn session_with_token(token: Option<&str>) -> Arc<Session> {
        let session = Arc::new(Session::new(Arc::new(MemoryStore::new())));
        if let Some(token) = token {
            session.update_tokens(token, Some("r")).unwrap();
        }
        session
    }

    #[test]
    fn test_bearer_attaches_token() {
        let stage = BearerAuth::new(session_with_token(Some("abc")));
        let req = stage.on_request(ApiRequest::get("/companies/")).unwrap();
        assert_eq!(req.headers[AUTHORIZATION], "Bearer abc");
    }

    #[test]
    fn test_bearer_without_token_passes_through() {
        let stage = BearerAuth::new(session_with_token(None));
        let req = stage
            .on_request(ApiRequest::post("/auth/login/", serde_json::json!({})))
            .unwrap();
        assert!(!req.has_authorization());
    }

    #[test]
    fn test_bearer_keeps_explicit_header_on_retry() {
        let stage = BearerAuth::new(session_with_token(Some("stale")));
        let mut req = ApiRequest::get("/companies/");
        req.retried = true;
        req.set_bearer("fresh").unwrap();

        let req = stage.on_request(req).unwrap();
        assert_eq!(req.headers[AUTHORIZATION], "Bearer fresh");
    }

    #[test]
    fn test_newer_token_only_when_session_moved_on() {
        let session = session_with_token(Some("fresh"));
        let refresher =
            TokenRefresher::new(Arc::clone(&session), "http://localhost:8000/api", None).unwrap();
        let stage = RefreshOnUnauthorized::new(session, refresher);

        let mut stale = ApiRequest::get("/companies/");
        stale.set_bearer("stale").unwrap();
        assert_eq!(stage.newer_token(&stale).as_deref(), Some("fresh"));

        let mut current = ApiRequest::get("/companies/");
        current.set_bearer("fresh").unwrap();
        assert_eq!(stage.newer_token(&current), None);
    }
}
