//! Application state shared by the HTTP handlers.

use prometheus::Registry;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// State handed to every request. Holds no scrape data: the registry's
/// hindsight collector re-reads the statistics file on each gather.
pub struct AppState {
    pub registry: Registry,
    pub config: Arc<Config>,
    pub hindsight_path: PathBuf,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}
