//! Health check endpoint handler.
//!
//! The exporter is healthy as long as it serves requests; an unreadable
//! statistics file is reported but does not change the status code.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::state::SharedState;

/// JSON body of the /health endpoint.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub source: String,
    pub source_readable: bool,
    pub uptime_seconds: u64,
    pub version: &'static str,
}

/// Handler for the /health endpoint.
#[instrument(skip(state))]
pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /health request");

    let source_readable = tokio::fs::File::open(&state.hindsight_path).await.is_ok();

    Json(HealthResponse {
        status: if source_readable { "ok" } else { "degraded" },
        source: state.hindsight_path.display().to_string(),
        source_readable,
        uptime_seconds: state.start_time.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
