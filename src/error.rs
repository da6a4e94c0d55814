//! Error types for catalog construction and scraping.
//!
//! Scrape errors never abort a scrape. They are logged as diagnostics and the
//! affected observations degrade (zero value or skipped series).

use std::num::ParseFloatError;
use std::path::PathBuf;

/// Problems encountered while translating the statistics file.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Cannot output {} hindsight statistics: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse {raw:?} for {metric} (plugin {label}), using 0")]
    FieldParse {
        metric: String,
        label: String,
        raw: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("Line {line}: {metric} reads column {column} but the row has only {fields} fields")]
    MalformedRow {
        line: usize,
        metric: String,
        column: usize,
        fields: usize,
    },
}

/// Rejected catalog definitions.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Metric {0} is defined more than once")]
    DuplicateName(String),

    #[error("Metric {0} reads column 0, which holds the label")]
    LabelColumn(String),

    #[error("Metric {0} uses the reserved hindsight_exporter_ prefix")]
    ReservedName(String),

    #[error("Metric name must not be empty")]
    EmptyName,
}
