//! CLI command handlers.

pub mod auth;
pub mod config;
pub mod entities;
pub mod reference;
pub mod theme;

use staffdesk_core::app::AppContext;
use staffdesk_core::toast::ToastKind;

/// Prints notifications raised during the command.
fn print_toasts(app: &AppContext) {
    for toast in app.toasts.active() {
        match toast.kind {
            ToastKind::Success => println!("{}", toast.message),
            ToastKind::Error => println!("error: {}", toast.message),
        }
    }
}
