//! API module for all HTTP handlers

pub mod stats;
pub mod webhook;

use axum::{Router, routing};

use crate::SharedState;

// Re-export handlers
pub use stats::status;
pub use webhook::handle_webhook;

/// Routes served by the `gitlab-push` binary
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", routing::post(handle_webhook))
        .route("/webhook", routing::post(handle_webhook))
        .route("/status", routing::get(status))
        .with_state(state)
}
