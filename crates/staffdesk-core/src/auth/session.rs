//! Session state: tokens, user profile, and auth flags.
//!
//! Memory is updated first, then tokens are persisted to the `session`
//! namespace. Tokens are never logged in full.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Result;
use tokio::sync::broadcast;

use crate::entities::UserProfile;
use crate::storage::KeyValueStore;

pub const SESSION_NAMESPACE: &str = "session";
pub const ACCESS_KEY: &str = "token";
pub const REFRESH_KEY: &str = "refresh";

const EVENT_CAPACITY: usize = 32;

/// Point-in-time view of the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserProfile>,
    pub is_refreshing: bool,
    pub is_auth_loading: bool,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Transitions observers may react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn,
    Refreshed,
    LoggedOut,
    /// Refresh failed irrecoverably; the user must log in again.
    LoginRequired,
}

/// The single session shared by the client, refresher, and services.
pub struct Session {
    state: RwLock<SessionState>,
    store: Arc<dyn KeyValueStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    /// Empty session backed by `store`. Nothing is read yet.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: RwLock::new(SessionState::default()),
            store,
            events,
        }
    }

    /// Session restored from persisted tokens, flagged as awaiting the
    /// startup auth check.
    ///
    /// # Errors
    /// Returns an error if the persisted tokens cannot be read.
    pub fn init(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let access_token = store.get(SESSION_NAMESPACE, ACCESS_KEY)?;
        let refresh_token = store.get(SESSION_NAMESPACE, REFRESH_KEY)?;
        tracing::debug!(
            has_access = access_token.is_some(),
            has_refresh = refresh_token.is_some(),
            "session restored"
        );

        let session = Self::new(store);
        {
            let mut state = session.write();
            state.access_token = access_token;
            state.refresh_token = refresh_token;
            state.is_auth_loading = true;
        }
        Ok(session)
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn emit(&self, event: SessionEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> SessionState {
        self.read().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    /// Stores a fresh login.
    ///
    /// # Errors
    /// Returns an error if the tokens cannot be persisted.
    pub fn login(
        &self,
        user: Option<UserProfile>,
        access: &str,
        refresh: Option<&str>,
    ) -> Result<()> {
        {
            let mut state = self.write();
            state.access_token = Some(access.to_string());
            state.refresh_token = refresh.map(ToString::to_string);
            state.user = user;
            state.is_refreshing = false;
            state.is_auth_loading = false;
        }
        self.persist_tokens(access, refresh)?;
        tracing::info!("logged in");
        self.emit(SessionEvent::LoggedIn);
        Ok(())
    }

    /// Replaces the access token, and the refresh token when rotated.
    ///
    /// # Errors
    /// Returns an error if the tokens cannot be persisted.
    pub fn update_tokens(&self, access: &str, refresh: Option<&str>) -> Result<()> {
        {
            let mut state = self.write();
            state.access_token = Some(access.to_string());
            if let Some(refresh) = refresh {
                state.refresh_token = Some(refresh.to_string());
            }
            state.is_refreshing = false;
        }
        self.store.set(SESSION_NAMESPACE, ACCESS_KEY, access)?;
        if let Some(refresh) = refresh {
            self.store.set(SESSION_NAMESPACE, REFRESH_KEY, refresh)?;
        }
        self.emit(SessionEvent::Refreshed);
        Ok(())
    }

    pub fn set_refreshing(&self, refreshing: bool) {
        self.write().is_refreshing = refreshing;
    }

    pub fn set_auth_loading(&self, loading: bool) {
        self.write().is_auth_loading = loading;
    }

    pub fn set_user(&self, user: Option<UserProfile>) {
        self.write().user = user;
    }

    /// Clears everything in memory and on disk.
    ///
    /// # Errors
    /// Returns an error if persisted tokens cannot be removed. Memory is
    /// cleared regardless.
    pub fn logout(&self) -> Result<()> {
        self.clear()?;
        tracing::info!("logged out");
        self.emit(SessionEvent::LoggedOut);
        Ok(())
    }

    /// Clears the session after an irrecoverable refresh failure.
    pub fn expire(&self) {
        if let Err(err) = self.clear() {
            tracing::warn!(error = %err, "failed to remove persisted tokens");
        }
        tracing::info!("session expired, login required");
        self.emit(SessionEvent::LoginRequired);
    }

    fn clear(&self) -> Result<()> {
        {
            let mut state = self.write();
            *state = SessionState::default();
        }
        self.store.remove(SESSION_NAMESPACE, ACCESS_KEY)?;
        self.store.remove(SESSION_NAMESPACE, REFRESH_KEY)?;
        Ok(())
    }

    fn persist_tokens(&self, access: &str, refresh: Option<&str>) -> Result<()> {
        self.store.set(SESSION_NAMESPACE, ACCESS_KEY, access)?;
        match refresh {
            Some(refresh) => self.store.set(SESSION_NAMESPACE, REFRESH_KEY, refresh),
            None => self.store.remove(SESSION_NAMESPACE, REFRESH_KEY),
        }
    }
}
