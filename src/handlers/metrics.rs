//! Metrics endpoint handler for Prometheus scraping.
//!
//! Gathering the registry runs the hindsight collector, which re-reads the
//! statistics file. Source file problems show up as missing series and in
//! `hindsight_exporter_source_up`, never as an HTTP error.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::time::Instant;
use tracing::{debug, error, instrument};

use crate::state::SharedState;

/// Error type for metrics endpoint failures.
#[derive(Debug)]
pub enum MetricsError {
    EncodingFailed,
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to encode metrics",
        )
            .into_response()
    }
}

/// Handler for the metrics endpoint.
#[instrument(skip(state))]
pub async fn metrics_handler(State(state): State<SharedState>) -> Result<String, MetricsError> {
    let start = Instant::now();
    debug!("Processing metrics request");

    // File reads block, keep them off the async workers.
    let state_clone = state.clone();
    let encoded = tokio::task::spawn_blocking(move || {
        hindsight_exporter::encode_text(&state_clone.registry)
    })
    .await;

    match encoded {
        Ok(Ok(body)) => {
            debug!(
                "Metrics request completed: {} bytes, {:.3}ms",
                body.len(),
                start.elapsed().as_secs_f64() * 1000.0
            );
            Ok(body)
        }
        Ok(Err(e)) => {
            error!("Failed to encode Prometheus metrics: {}", e);
            Err(MetricsError::EncodingFailed)
        }
        Err(e) => {
            error!("Metrics task failed: {}", e);
            Err(MetricsError::EncodingFailed)
        }
    }
}
