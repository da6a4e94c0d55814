//! Hindsight Exporter Library
//!
//! Exposes the per-plugin counters that the hindsight daemon writes to its
//! `hindsight.tsv` statistics file as Prometheus metrics. The file is re-read
//! on every scrape; nothing is cached between scrapes.
//!
//! # Components
//!
//! - **Catalog**: fixed mapping from metric name to help text, label name and
//!   source column
//! - **Scrape engine**: opens the file, skips the header and yields one
//!   observation per (row, catalog entry)
//! - **Collector**: `prometheus::core::Collector` adapter for a `Registry`
//!
//! # Usage
//!
//! ```rust
//! use hindsight_exporter::{Catalog, HindsightCollector};
//! use prometheus::Registry;
//!
//! let registry = Registry::new();
//! let collector = HindsightCollector::new("/hindsight.tsv", Catalog::hindsight(), true)
//!     .expect("valid catalog");
//! registry.register(Box::new(collector)).expect("unique metric names");
//!
//! // Every gather re-reads the statistics file.
//! let text = hindsight_exporter::encode_text(&registry).expect("encodable");
//! println!("{}", text);
//! ```

pub mod catalog;
pub mod collector;
pub mod error;
pub mod scrape;

// Re-export main types for convenience
pub use catalog::{Catalog, MetricDefinition, MetricDescriptor, ValueKind, PLUGIN_LABEL, TELEMETRY_PREFIX};
pub use collector::{encode_text, HindsightCollector};
pub use error::{CatalogError, ScrapeError};
pub use scrape::{Observation, Observations, Row, ScrapeEngine, ScrapeStats};
