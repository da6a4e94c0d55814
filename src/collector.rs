//! Prometheus `Collector` implementation backed by the scrape engine.
//!
//! The collector is registered on an explicit [`Registry`] and runs one full
//! scrape of the statistics file every time the registry is gathered.

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error};

use crate::catalog::{Catalog, MetricDescriptor, ValueKind};
use crate::scrape::{ScrapeEngine, ScrapeStats};

const SOURCE_UP: (&str, &str) = (
    "hindsight_exporter_source_up",
    "Whether the hindsight statistics file could be read (1) or not (0)",
);
const ROWS: (&str, &str) = (
    "hindsight_exporter_rows",
    "Number of plugin rows found in the hindsight statistics file",
);
const PARSE_FAILURES: (&str, &str) = (
    "hindsight_exporter_parse_failures",
    "Number of values that were not valid numbers and were exported as 0",
);
const MISSING_FIELDS: (&str, &str) = (
    "hindsight_exporter_missing_fields",
    "Number of values skipped because their row was too short",
);
const SCRAPE_DURATION: (&str, &str) = (
    "hindsight_exporter_scrape_duration_seconds",
    "Time spent reading and translating the hindsight statistics file",
);

const TELEMETRY: [(&str, &str); 5] = [
    SOURCE_UP,
    ROWS,
    PARSE_FAILURES,
    MISSING_FIELDS,
    SCRAPE_DURATION,
];

/// Exposes the hindsight statistics file through the collection protocol.
pub struct HindsightCollector {
    engine: ScrapeEngine,
    descs: Vec<Desc>,
    telemetry: bool,
}

impl HindsightCollector {
    /// Builds descriptors for every catalog entry. No file I/O happens here.
    pub fn new(
        path: impl Into<PathBuf>,
        catalog: Catalog,
        telemetry: bool,
    ) -> prometheus::Result<Self> {
        let mut descs = catalog
            .describe()
            .map(descriptor_desc)
            .collect::<prometheus::Result<Vec<_>>>()?;

        if telemetry {
            for (name, help) in TELEMETRY {
                descs.push(Desc::new(
                    name.to_string(),
                    help.to_string(),
                    Vec::new(),
                    HashMap::new(),
                )?);
            }
        }

        Ok(Self {
            engine: ScrapeEngine::new(path, catalog),
            descs,
            telemetry,
        })
    }

    pub fn engine(&self) -> &ScrapeEngine {
        &self.engine
    }

    /// Runs one scrape and returns the families plus its diagnostic counts.
    pub fn scrape(&self) -> (Vec<MetricFamily>, ScrapeStats) {
        let start = Instant::now();
        let catalog = self.engine.catalog();

        let mut vectors = BTreeMap::new();
        for definition in catalog.definitions() {
            let d = &definition.descriptor;
            let vector = match definition.kind {
                ValueKind::Gauge => {
                    GaugeVec::new(Opts::new(d.name.as_str(), d.help.as_str()), &[d.label_name.as_str()])
                }
            };
            match vector {
                Ok(v) => {
                    vectors.insert(d.name.as_str(), v);
                }
                Err(e) => error!("Failed to create gauge {}: {}", d.name, e),
            }
        }

        let mut observations = self.engine.collect();
        for observation in observations.by_ref() {
            // Duplicate labels overwrite, the last row in the file wins.
            if let Some(vector) = vectors.get(observation.metric_name()) {
                vector
                    .with_label_values(&[observation.label.as_str()])
                    .set(observation.value);
            }
        }
        let stats = observations.stats();

        let mut families: Vec<MetricFamily> =
            vectors.values().flat_map(|v| v.collect()).collect();

        if self.telemetry {
            let up = if stats.source_available { 1.0 } else { 0.0 };
            families.extend(gauge_family(SOURCE_UP, up));
            families.extend(gauge_family(ROWS, stats.rows as f64));
            families.extend(gauge_family(PARSE_FAILURES, stats.parse_failures as f64));
            families.extend(gauge_family(MISSING_FIELDS, stats.missing_fields as f64));
            families.extend(gauge_family(
                SCRAPE_DURATION,
                start.elapsed().as_secs_f64(),
            ));
        }

        debug!(
            "Scraped {}: {} rows, {} parse failures, {} missing fields in {:.3}ms",
            self.engine.path().display(),
            stats.rows,
            stats.parse_failures,
            stats.missing_fields,
            start.elapsed().as_secs_f64() * 1000.0
        );

        (families, stats)
    }
}

impl Collector for HindsightCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        self.scrape().0
    }
}

fn descriptor_desc(d: &MetricDescriptor) -> prometheus::Result<Desc> {
    Desc::new(
        d.name.clone(),
        d.help.clone(),
        vec![d.label_name.clone()],
        HashMap::new(),
    )
}

fn gauge_family((name, help): (&str, &str), value: f64) -> Option<MetricFamily> {
    match Gauge::new(name, help) {
        Ok(gauge) => {
            gauge.set(value);
            gauge.collect().pop()
        }
        Err(e) => {
            error!("Failed to create gauge {}: {}", name, e);
            None
        }
    }
}

/// Gathers the registry and renders the text exposition format.
pub fn encode_text(registry: &Registry) -> prometheus::Result<String> {
    let families = registry.gather();
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
