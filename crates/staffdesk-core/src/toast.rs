//! Transient success/error notifications.
//!
//! Toasts are kept in memory only and expire after the configured display
//! duration or on manual dismissal.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: String,
    pub message: String,
    pub kind: ToastKind,
    pub created_at: Instant,
}

/// Shared notification queue.
pub struct ToastBus {
    toasts: Mutex<Vec<Toast>>,
    duration: Duration,
    events: broadcast::Sender<Toast>,
}

impl ToastBus {
    pub fn new(duration: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            toasts: Mutex::new(Vec::new()),
            duration,
            events,
        }
    }

    fn with_toasts<R>(&self, f: impl FnOnce(&mut Vec<Toast>) -> R) -> R {
        let mut toasts = self
            .toasts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut toasts)
    }

    /// Appends a toast and returns its id.
    pub fn push(&self, kind: ToastKind, message: impl Into<String>) -> String {
        let toast = Toast {
            id: uuid::Uuid::new_v4().to_string(),
            message: message.into(),
            kind,
            created_at: Instant::now(),
        };
        let id = toast.id.clone();
        tracing::debug!(kind = ?toast.kind, message = %toast.message, "toast");
        let duration = self.duration;
        self.with_toasts(|toasts| {
            prune(toasts, toast.created_at, duration);
            toasts.push(toast.clone());
        });
        let _ = self.events.send(toast);
        id
    }

    pub fn success(&self, message: impl Into<String>) -> String {
        self.push(ToastKind::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> String {
        self.push(ToastKind::Error, message)
    }

    pub fn dismiss(&self, id: &str) {
        self.with_toasts(|toasts| toasts.retain(|t| t.id != id));
    }

    /// Toasts still within their display window, oldest first.
    pub fn active(&self) -> Vec<Toast> {
        self.active_at(Instant::now())
    }

    fn active_at(&self, now: Instant) -> Vec<Toast> {
        let duration = self.duration;
        self.with_toasts(|toasts| {
            prune(toasts, now, duration);
            toasts.clone()
        })
    }

    /// Receives every toast as it is pushed.
    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.events.subscribe()
    }
}

fn prune(toasts: &mut Vec<Toast>, now: Instant, duration: Duration) {
    toasts.retain(|t| now.saturating_duration_since(t.created_at) < duration);
}
