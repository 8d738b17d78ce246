//! Webhook handler for GitLab push events

use axum::{
    body::Bytes,
    extract::State as AxumState,
    http::{HeaderMap, StatusCode},
};
use tracing::debug;

use crate::SharedState;

/// Header GitLab uses to name the event that fired
pub const GITLAB_EVENT_HEADER: &str = "X-Gitlab-Event";

/// Handles the GitLab webhook POST request.
/// The forwarder's summary is always returned with 200 OK.
pub async fn handle_webhook(
    AxumState(state): AxumState<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let event_hint = headers
        .get(GITLAB_EVENT_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    debug!("Received {:?} event ({} bytes)", event_hint, body.len());

    let summary = state.forwarder.handle(&body, event_hint).await;
    (StatusCode::OK, summary)
}
