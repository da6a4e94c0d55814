//! Integration tests for scrape diagnostics.
//!
//! Installs a capturing tracing subscriber and checks that degraded input is
//! reported in the log, separate from the observation data.

use hindsight_exporter::{Catalog, ScrapeEngine};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::{NamedTempFile, TempDir};

/// In-memory log sink for the fmt subscriber.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with warnings captured into the returned buffer.
fn capture_warnings<F: FnOnce()>(f: F) -> String {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();

    tracing::subscriber::with_default(subscriber, f);
    buffer.contents()
}

#[test]
fn test_scrape_diagnostics_are_logged() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(b"header\npluginA N/A 20 5\nplug\xffB 1 2 3 4\n")
        .expect("Failed to write temp file");
    let dir = TempDir::new().expect("Failed to create temp dir");
    let missing = dir.path().join("hindsight.tsv");

    let logs = capture_warnings(|| {
        let engine = ScrapeEngine::new(file.path(), Catalog::hindsight());
        let mut iter = engine.collect();
        assert_eq!(iter.by_ref().count(), 7);
        assert_eq!(iter.stats().parse_failures, 1);
        assert_eq!(iter.stats().missing_fields, 1);

        let engine = ScrapeEngine::new(&missing, Catalog::hindsight());
        assert_eq!(engine.collect().count(), 0);
    });

    // Parse failure names the raw text and the metric.
    assert!(logs.contains("\"N/A\""), "logs: {}", logs);
    assert!(logs.contains("hindsight_injected_message_count"), "logs: {}", logs);
    // Short row names the missing column.
    assert!(logs.contains("reads column 4"), "logs: {}", logs);
    assert!(logs.contains("not valid UTF-8"), "logs: {}", logs);
    assert!(logs.contains("Cannot output"), "logs: {}", logs);
    assert!(logs.contains("WARN"), "logs: {}", logs);
}
