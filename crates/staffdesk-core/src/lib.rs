//! Core staffdesk library (session, HTTP pipeline, entity sync, config).

pub mod api;
pub mod app;
pub mod auth;
pub mod choices;
pub mod config;
pub mod crud;
pub mod dashboard;
pub mod entities;
pub mod list;
pub mod logging;
pub mod storage;
pub mod theme;
pub mod toast;
