//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Value, json};
use staffdesk_core::app::AppContext;
use staffdesk_core::auth::session::{ACCESS_KEY, REFRESH_KEY, SESSION_NAMESPACE};
use staffdesk_core::config::Config;
use staffdesk_core::storage::{KeyValueStore, MemoryStore};
use wiremock::MockServer;

/// Context pointed at `server` with optional pre-persisted tokens.
pub fn context(server: &MockServer, tokens: Option<(&str, &str)>) -> AppContext {
    context_with_config(server, tokens, Config::default())
}

pub fn context_with_config(
    server: &MockServer,
    tokens: Option<(&str, &str)>,
    config: Config,
) -> AppContext {
    let store = Arc::new(MemoryStore::new());
    if let Some((access, refresh)) = tokens {
        store.set(SESSION_NAMESPACE, ACCESS_KEY, access).unwrap();
        store.set(SESSION_NAMESPACE, REFRESH_KEY, refresh).unwrap();
    }
    AppContext::with_store(config, &server.uri(), store).unwrap()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub fn company(id: i64) -> Value {
    json!({
        "id": id,
        "name": format!("Company {id}"),
        "num_departments": 0,
        "num_employees": 0
    })
}

/// A page envelope of companies `first..=last` with the given total.
pub fn company_page(first: i64, last: i64, count: usize) -> Value {
    let results: Vec<Value> = (first..=last).map(company).collect();
    json!({ "count": count, "results": results })
}

pub fn employee(id: i64) -> Value {
    json!({
        "id": id,
        "company": 1,
        "department": 1,
        "company_name": "Company 1",
        "department_name": "Ops",
        "status": "HIRED",
        "name": format!("Employee {id}"),
        "email": format!("e{id}@example.com"),
        "mobile": "555-0100",
        "address": "",
        "designation": "Analyst",
        "hired_on": "2024-01-15",
        "days_employed": 30
    })
}
