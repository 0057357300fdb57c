//! Access-token refresh, single-flight.
//!
//! Callers that arrive while an exchange is in flight await the same shared
//! outcome, so one flight issues exactly one `POST /auth/token/refresh/`.
//! The exchange uses its own HTTP client and never passes through the
//! request/response stages.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::Result;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use serde::Deserialize;
use serde_json::{Value, json};

use super::session::Session;
use crate::api::client::{http_client, join_url};

pub const REFRESH_PATH: &str = "/auth/token/refresh/";

/// Why a refresh did not produce a new access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    /// No refresh token is held.
    NoRefreshToken,
    /// The backend refused the refresh token.
    Rejected { status: u16, detail: Option<String> },
    /// Transport failure or timeout.
    Network(String),
    /// The backend answered 2xx with an unusable body.
    InvalidResponse(String),
}

impl fmt::Display for RefreshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshError::NoRefreshToken => write!(f, "no refresh token available"),
            RefreshError::Rejected {
                status,
                detail: Some(detail),
            } => write!(f, "refresh token rejected (HTTP {status}): {detail}"),
            RefreshError::Rejected { status, detail: None } => {
                write!(f, "refresh token rejected (HTTP {status})")
            }
            RefreshError::Network(msg) => write!(f, "token refresh failed: {msg}"),
            RefreshError::InvalidResponse(msg) => {
                write!(f, "invalid token refresh response: {msg}")
            }
        }
    }
}

impl std::error::Error for RefreshError {}

type RefreshFuture = Shared<BoxFuture<'static, Result<String, RefreshError>>>;

struct InFlight {
    generation: u64,
    outcome: RefreshFuture,
}

#[derive(Deserialize)]
struct TokenResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

struct RefresherInner {
    http: reqwest::Client,
    url: String,
    session: Arc<Session>,
    flight: Mutex<Option<InFlight>>,
    generations: AtomicU64,
}

/// Exchanges the refresh token for a new access token.
#[derive(Clone)]
pub struct TokenRefresher {
    inner: Arc<RefresherInner>,
}

impl TokenRefresher {
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(session: Arc<Session>, base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self::with_client(
            session,
            http_client(timeout)?,
            join_url(base_url, REFRESH_PATH),
        ))
    }

    pub fn with_client(session: Arc<Session>, http: reqwest::Client, url: String) -> Self {
        Self {
            inner: Arc::new(RefresherInner {
                http,
                url,
                session,
                flight: Mutex::new(None),
                generations: AtomicU64::new(0),
            }),
        }
    }

    /// Returns a fresh access token, joining an in-flight exchange if any.
    ///
    /// On failure the session has already been cleared and `LoginRequired`
    /// emitted.
    ///
    /// # Errors
    /// Returns the reason the exchange failed.
    pub async fn refresh(&self) -> Result<String, RefreshError> {
        let (generation, outcome) = {
            let mut slot = self.inner.slot();
            if let Some(flight) = slot.as_ref() {
                tracing::debug!(generation = flight.generation, "joining in-flight refresh");
                (flight.generation, flight.outcome.clone())
            } else {
                let generation = self.inner.generations.fetch_add(1, Ordering::Relaxed);
                let inner = Arc::clone(&self.inner);
                let outcome = async move { inner.exchange().await }.boxed().shared();
                tracing::debug!(generation, "starting refresh");
                *slot = Some(InFlight {
                    generation,
                    outcome: outcome.clone(),
                });
                (generation, outcome)
            }
        };

        let result = outcome.await;

        let mut slot = self.inner.slot();
        if slot.as_ref().is_some_and(|f| f.generation == generation) {
            *slot = None;
        }
        result
    }
}

impl RefresherInner {
    fn slot(&self) -> MutexGuard<'_, Option<InFlight>> {
        self.flight
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    async fn exchange(&self) -> Result<String, RefreshError> {
        let Some(refresh) = self.session.refresh_token() else {
            self.session.expire();
            return Err(RefreshError::NoRefreshToken);
        };

        self.session.set_refreshing(true);
        match self.request_tokens(&refresh).await {
            Ok(tokens) => {
                if let Err(err) = self
                    .session
                    .update_tokens(&tokens.access, tokens.refresh.as_deref())
                {
                    tracing::warn!(error = %err, "failed to persist refreshed tokens");
                }
                tracing::info!(rotated = tokens.refresh.is_some(), "access token refreshed");
                Ok(tokens.access)
            }
            Err(err) => {
                tracing::warn!(error = %err, "token refresh failed");
                self.session.expire();
                Err(err)
            }
        }
    }

    async fn request_tokens(&self, refresh: &str) -> Result<TokenResponse, RefreshError> {
        let response = self
            .http
            .post(&self.url)
            .json(&json!({ "refresh": refresh }))
            .send()
            .await
            .map_err(|e| RefreshError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RefreshError::Network(e.to_string()))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("detail").and_then(Value::as_str).map(String::from));
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let tokens: TokenResponse = serde_json::from_str(&text)
            .map_err(|e| RefreshError::InvalidResponse(e.to_string()))?;
        if tokens.access.trim().is_empty() {
            return Err(RefreshError::InvalidResponse(
                "empty access token".to_string(),
            ));
        }
        Ok(tokens)
    }
}
