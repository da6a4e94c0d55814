//! Scrape engine: translates one read of `hindsight.tsv` into observations.
//!
//! Every call to [`ScrapeEngine::collect`] re-opens the statistics file, so the
//! engine keeps no state between scrapes apart from the path and the catalog.
//! The file handle is dropped before `collect` returns; rows are split and
//! values parsed lazily while the caller drains the returned iterator.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::catalog::{Catalog, MetricDefinition};
use crate::error::ScrapeError;

/// One emitted data point.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation<'a> {
    pub definition: &'a MetricDefinition,
    pub value: f64,
    pub label: String,
}

impl Observation<'_> {
    pub fn metric_name(&self) -> &str {
        self.definition.name()
    }
}

/// Whitespace-split fields of one data line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based line number in the source file.
    pub line: usize,
    pub fields: Vec<String>,
}

impl Row {
    /// Splits a data line. Blank lines have no label and yield `None`.
    pub fn parse(line: usize, text: &str) -> Option<Self> {
        let fields: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
        if fields.is_empty() {
            return None;
        }
        Some(Self { line, fields })
    }

    pub fn label(&self) -> &str {
        &self.fields[0]
    }

    pub fn field(&self, column: usize) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }
}

/// Diagnostic counts for a single scrape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeStats {
    pub source_available: bool,
    pub rows: usize,
    pub parse_failures: usize,
    pub missing_fields: usize,
}

/// Reads the statistics file on demand.
#[derive(Debug, Clone)]
pub struct ScrapeEngine {
    path: PathBuf,
    catalog: Arc<Catalog>,
}

impl ScrapeEngine {
    /// Stores the path; the file is not touched until the first scrape.
    pub fn new(path: impl Into<PathBuf>, catalog: Catalog) -> Self {
        Self {
            path: path.into(),
            catalog: Arc::new(catalog),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Runs one scrape.
    ///
    /// An unreadable file yields an empty iterator and a `warn!` diagnostic.
    /// The first line is always dropped as a header, even if it looks like data.
    pub fn collect(&self) -> Observations<'_> {
        let definitions: Vec<&MetricDefinition> = self.catalog.definitions().collect();

        match read_data_lines(&self.path) {
            Ok(lines) => {
                debug!(
                    "Read {} data lines from {}",
                    lines.len(),
                    self.path.display()
                );
                Observations::new(definitions, lines)
            }
            Err(e) => {
                warn!("{}", e);
                Observations::unavailable(definitions)
            }
        }
    }
}

/// Reads every line after the header. The file is closed when this returns.
///
/// Invalid UTF-8 is replaced rather than rejected, so one garbled row does not
/// hide the rows after it.
fn read_data_lines(path: &Path) -> Result<Vec<(usize, String)>, ScrapeError> {
    let file = File::open(path).map_err(|source| ScrapeError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);

    let mut lines = Vec::new();
    let mut buf = Vec::new();
    let mut line_no = 0usize;
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                line_no += 1;
                if line_no == 1 {
                    continue;
                }
                let text = match String::from_utf8_lossy(&buf) {
                    Cow::Borrowed(text) => text.to_owned(),
                    Cow::Owned(text) => {
                        warn!(
                            "Line {} of {} is not valid UTF-8, replacing invalid bytes",
                            line_no,
                            path.display()
                        );
                        text
                    }
                };
                lines.push((line_no, text.trim_end_matches(['\n', '\r']).to_string()));
            }
            Err(e) => {
                // Keep what was read so far, the next scrape starts over anyway.
                warn!(
                    "Stopped reading {} after line {}: {}",
                    path.display(),
                    line_no,
                    e
                );
                break;
            }
        }
    }
    Ok(lines)
}

/// Parses a value column, degrading to 0.0 on garbage.
fn parse_value(definition: &MetricDefinition, label: &str, raw: &str) -> Result<f64, ScrapeError> {
    raw.parse::<f64>().map_err(|source| ScrapeError::FieldParse {
        metric: definition.name().to_string(),
        label: label.to_string(),
        raw: raw.to_string(),
        source,
    })
}

struct RowCursor {
    row: Row,
    next_definition: usize,
}

/// Lazy sequence of observations produced by one scrape.
///
/// Yields one observation per (row, catalog entry) pair, rows in file order
/// and entries in catalog order. Not restartable: call
/// [`ScrapeEngine::collect`] again for a fresh read.
pub struct Observations<'a> {
    definitions: Vec<&'a MetricDefinition>,
    lines: std::vec::IntoIter<(usize, String)>,
    current: Option<RowCursor>,
    stats: ScrapeStats,
}

impl<'a> Observations<'a> {
    fn new(definitions: Vec<&'a MetricDefinition>, lines: Vec<(usize, String)>) -> Self {
        Self {
            definitions,
            lines: lines.into_iter(),
            current: None,
            stats: ScrapeStats {
                source_available: true,
                ..ScrapeStats::default()
            },
        }
    }

    fn unavailable(definitions: Vec<&'a MetricDefinition>) -> Self {
        Self {
            definitions,
            lines: Vec::new().into_iter(),
            current: None,
            stats: ScrapeStats::default(),
        }
    }

    /// Counts gathered so far; final once the iterator is exhausted.
    pub fn stats(&self) -> ScrapeStats {
        self.stats
    }
}

impl<'a> Iterator for Observations<'a> {
    type Item = Observation<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(cursor) = &mut self.current {
                while cursor.next_definition < self.definitions.len() {
                    let definition = self.definitions[cursor.next_definition];
                    cursor.next_definition += 1;

                    let Some(raw) = cursor.row.field(definition.column) else {
                        self.stats.missing_fields += 1;
                        warn!(
                            "{}",
                            ScrapeError::MalformedRow {
                                line: cursor.row.line,
                                metric: definition.name().to_string(),
                                column: definition.column,
                                fields: cursor.row.fields.len(),
                            }
                        );
                        continue;
                    };

                    let label = cursor.row.label();
                    let value = parse_value(definition, label, raw).unwrap_or_else(|e| {
                        self.stats.parse_failures += 1;
                        warn!("{}", e);
                        0.0
                    });

                    return Some(Observation {
                        definition,
                        value,
                        label: label.to_string(),
                    });
                }
                self.current = None;
            }

            let (line, text) = self.lines.next()?;
            match Row::parse(line, &text) {
                Some(row) => {
                    self.stats.rows += 1;
                    self.current = Some(RowCursor {
                        row,
                        next_definition: 0,
                    });
                }
                None => debug!("Skipping blank line {}", line),
            }
        }
    }
}
