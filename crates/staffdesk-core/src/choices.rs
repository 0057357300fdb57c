//! Employee status choices served by the backend.

use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ApiRequest};

pub const STATUS_CHOICES_PATH: &str = "/employee-status-choices/";
const LOAD_FAILED: &str = "Failed to load status choices";

/// One selectable status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ChoiceWire")]
pub struct StatusChoice {
    pub value: String,
    pub label: String,
}

/// Accepts `{"value", "label"}` objects or `[value, label]` pairs.
#[derive(Deserialize)]
#[serde(untagged)]
enum ChoiceWire {
    Object { value: String, label: String },
    Pair(String, String),
}

impl From<ChoiceWire> for StatusChoice {
    fn from(wire: ChoiceWire) -> Self {
        match wire {
            ChoiceWire::Object { value, label } | ChoiceWire::Pair(value, label) => {
                StatusChoice { value, label }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoicesState {
    pub status_choices: Vec<StatusChoice>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct ChoicesStore {
    client: ApiClient,
    state: Mutex<ChoicesState>,
}

impl ChoicesStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: Mutex::new(ChoicesState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChoicesState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> ChoicesState {
        self.lock().clone()
    }

    pub async fn fetch_status_choices(&self) {
        {
            let mut state = self.lock();
            state.loading = true;
            state.error = None;
        }

        let result = self
            .client
            .fetch::<Vec<StatusChoice>>(ApiRequest::get(STATUS_CHOICES_PATH))
            .await;

        let mut state = self.lock();
        state.loading = false;
        match result {
            Ok(choices) => state.status_choices = choices,
            Err(err) => {
                tracing::warn!(error = %err, "status choices fetch failed");
                state.error = Some(LOAD_FAILED.to_string());
            }
        }
    }
}
