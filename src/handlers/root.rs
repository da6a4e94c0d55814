//! Root endpoint handler for the landing page.

use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use tracing::{debug, instrument};

use crate::state::SharedState;

/// Handler for the root `/` endpoint.
#[instrument(skip(state))]
pub async fn root_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing / request");

    let uptime_secs = state.start_time.elapsed().as_secs();
    let uptime_str = format!(
        "{}h {}m {}s",
        uptime_secs / 3600,
        (uptime_secs % 3600) / 60,
        uptime_secs % 60
    );

    let health_link = if state.config.enable_health.unwrap_or(true) {
        r#"<li><a href="/health">/health</a> - exporter health (JSON)</li>"#
    } else {
        ""
    };

    Html(render_index(
        state.config.telemetry_path(),
        &state.hindsight_path.display().to_string(),
        &uptime_str,
        health_link,
    ))
}

fn render_index(metrics_path: &str, source: &str, uptime: &str, health_link: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Hindsight Exporter</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 20px; }}
        code {{ background: #e9ecef; padding: 2px 6px; border-radius: 3px; }}
    </style>
</head>
<body>
    <h1>Hindsight Exporter</h1>
    <p>Version {version}, up {uptime}, reading <code>{source}</code></p>
    <ul>
        <li><a href="{metrics_path}">Metrics</a> - Prometheus text exposition</li>
        {health_link}
    </ul>
</body>
</html>"#,
        version = env!("CARGO_PKG_VERSION"),
        uptime = uptime,
        source = source,
        metrics_path = metrics_path,
        health_link = health_link,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_links_metrics_path() {
        let html = render_index("/stats", "/hindsight.tsv", "0h 0m 1s", "");
        assert!(html.contains(r#"<a href="/stats">Metrics</a>"#));
        assert!(html.contains("<code>/hindsight.tsv</code>"));
        assert!(!html.contains("/health"));
    }
}
