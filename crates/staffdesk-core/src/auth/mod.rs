//! Session, token refresh, and login flows.

pub mod refresh;
pub mod service;
pub mod session;

pub use refresh::{RefreshError, TokenRefresher};
pub use service::AuthService;
pub use session::{Session, SessionEvent, SessionState};
