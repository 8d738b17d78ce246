//! Status API endpoint

use axum::{Json, extract::State as AxumState};
use serde::Serialize;

use crate::SharedState;

/// Server statistics
#[derive(Debug, Serialize)]
pub struct ServerStats {
    pub name: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub started_at: String,
}

/// Non-secret view of the forwarder configuration
#[derive(Debug, Serialize)]
pub struct ForwarderStats {
    pub gateway_configured: bool,
    pub report_status: bool,
    pub status_function: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub server: ServerStats,
    pub forwarder: ForwarderStats,
}

/// GET /status - Server info and forwarder settings
pub async fn status(AxumState(state): AxumState<SharedState>) -> Json<StatusResponse> {
    let config = state.forwarder.config();

    Json(StatusResponse {
        server: ServerStats {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.start_time.elapsed().as_secs(),
            started_at: state.started_at.to_rfc3339(),
        },
        forwarder: ForwarderStats {
            gateway_configured: config.has_gateway(),
            report_status: config.report_status,
            status_function: config.status_function.clone(),
        },
    })
}
