use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use super::session::Session;
use crate::api::request::LOGIN_PATH;
use crate::api::{ApiClient, ApiError, ApiErrorKind, ApiRequest, ApiResult};
use crate::entities::UserProfile;

pub const ME_PATH: &str = "/me/";

/// Message shown for any failed login attempt.
pub const LOGIN_FAILED: &str = "Invalid email or password";

#[derive(Deserialize)]
struct LoginResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
    #[serde(default)]
    user: Option<UserProfile>,
}

/// Login, startup hydration, and logout.
pub struct AuthService {
    client: ApiClient,
    session: Arc<Session>,
}

impl AuthService {
    pub fn new(client: ApiClient, session: Arc<Session>) -> Self {
        Self { client, session }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Exchanges credentials for tokens and stores them.
    ///
    /// The profile comes from the login response when present, otherwise
    /// from `/me/`.
    ///
    /// # Errors
    /// Returns the pipeline error when the credentials are refused or the
    /// backend is unreachable.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Option<UserProfile>> {
        let request = ApiRequest::post(
            LOGIN_PATH,
            json!({ "email": email, "password": password }),
        );
        let response: LoginResponse = self.client.fetch(request).await?;

        if let Err(err) = self.session.login(
            response.user.clone(),
            &response.access,
            response.refresh.as_deref(),
        ) {
            tracing::warn!(error = %err, "failed to persist session tokens");
        }

        if response.user.is_some() {
            return Ok(response.user);
        }

        match self.me().await {
            Ok(user) => {
                self.session.set_user(Some(user.clone()));
                Ok(Some(user))
            }
            Err(err) => {
                tracing::warn!(error = %err, "logged in but profile fetch failed");
                Ok(None)
            }
        }
    }

    /// Startup check: hydrate the profile from a persisted token, or log out
    /// if the token no longer works.
    ///
    /// Clears `is_auth_loading` in every case.
    pub async fn check_auth(&self) -> Option<UserProfile> {
        if !self.session.is_authenticated() {
            self.session.set_auth_loading(false);
            return None;
        }

        match self.me().await {
            Ok(user) => {
                self.session.set_user(Some(user.clone()));
                self.session.set_auth_loading(false);
                Some(user)
            }
            Err(err) => {
                tracing::info!(error = %err, "auth check failed, logging out");
                if let Err(err) = self.session.logout() {
                    tracing::warn!(error = %err, "failed to clear session");
                }
                None
            }
        }
    }

    /// # Errors
    /// Returns the pipeline error.
    pub async fn me(&self) -> ApiResult<UserProfile> {
        self.client.fetch(ApiRequest::get(ME_PATH)).await
    }

    /// # Errors
    /// Returns an error if persisted tokens cannot be removed.
    pub fn logout(&self) -> anyhow::Result<()> {
        self.session.logout()
    }

    /// User-facing text for a failed login.
    pub fn login_error_message(err: &ApiError) -> String {
        match err.kind {
            ApiErrorKind::Network => err.message.clone(),
            _ => LOGIN_FAILED.to_string(),
        }
    }
}
