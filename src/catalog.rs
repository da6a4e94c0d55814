//! Metric catalog for the hindsight statistics file.
//!
//! The catalog maps every exported metric name to its description and the
//! column of `hindsight.tsv` that holds its value. It is built once and only
//! read afterwards, so it can be shared between concurrent scrapes without
//! synchronization.

use std::collections::BTreeMap;

use crate::error::CatalogError;

/// Label name used for the plugin column of `hindsight.tsv`.
pub const PLUGIN_LABEL: &str = "plugin";

/// Prefix of the exporter's own scrape metrics; catalog entries may not use it.
pub const TELEMETRY_PREFIX: &str = "hindsight_exporter_";

/// Kind of the exported value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Gauge,
}

/// What the collection system needs to register a metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub name: String,
    pub help: String,
    pub label_name: String,
}

/// A catalog entry: descriptor plus where the value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDefinition {
    pub descriptor: MetricDescriptor,
    pub kind: ValueKind,
    /// Index into the whitespace-split row. Column 0 is the label.
    pub column: usize,
}

impl MetricDefinition {
    pub fn gauge(name: &str, help: &str, label_name: &str, column: usize) -> Self {
        Self {
            descriptor: MetricDescriptor {
                name: name.to_string(),
                help: help.to_string(),
                label_name: label_name.to_string(),
            },
            kind: ValueKind::Gauge,
            column,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

/// Fixed set of metric definitions keyed by metric name.
#[derive(Debug, Clone)]
pub struct Catalog {
    definitions: BTreeMap<String, MetricDefinition>,
}

impl Catalog {
    /// The four per-plugin counters hindsight writes to `hindsight.tsv`.
    pub fn hindsight() -> Self {
        let definitions = [
            MetricDefinition::gauge(
                "hindsight_injected_message_count",
                "Number of injected messages",
                PLUGIN_LABEL,
                1,
            ),
            MetricDefinition::gauge(
                "hindsight_injected_message_bytes",
                "Number of injected bytes",
                PLUGIN_LABEL,
                2,
            ),
            MetricDefinition::gauge(
                "hindsight_process_message_count",
                "Number of processed messages",
                PLUGIN_LABEL,
                3,
            ),
            MetricDefinition::gauge(
                "hindsight_process_message_failures",
                "Number of processed failure messages",
                PLUGIN_LABEL,
                4,
            ),
        ];

        Self {
            definitions: definitions
                .into_iter()
                .map(|d| (d.descriptor.name.clone(), d))
                .collect(),
        }
    }

    /// Builds a catalog from arbitrary definitions.
    pub fn from_definitions<I>(definitions: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = MetricDefinition>,
    {
        let mut map = BTreeMap::new();
        for def in definitions {
            if def.descriptor.name.is_empty() {
                return Err(CatalogError::EmptyName);
            }
            if def.descriptor.name.starts_with(TELEMETRY_PREFIX) {
                return Err(CatalogError::ReservedName(def.descriptor.name));
            }
            if def.column == 0 {
                return Err(CatalogError::LabelColumn(def.descriptor.name));
            }
            if map.contains_key(&def.descriptor.name) {
                return Err(CatalogError::DuplicateName(def.descriptor.name));
            }
            map.insert(def.descriptor.name.clone(), def);
        }
        Ok(Self { definitions: map })
    }

    /// Descriptors of every entry, sorted by name.
    pub fn describe(&self) -> impl Iterator<Item = &MetricDescriptor> + '_ {
        self.definitions.values().map(|d| &d.descriptor)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &MetricDefinition> + '_ {
        self.definitions.values()
    }

    pub fn get(&self, name: &str) -> Option<&MetricDefinition> {
        self.definitions.get(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Highest column any entry reads, 0 for an empty catalog.
    pub fn max_column(&self) -> usize {
        self.definitions.values().map(|d| d.column).max().unwrap_or(0)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::hindsight()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hindsight_catalog_columns() {
        let catalog = Catalog::hindsight();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.max_column(), 4);

        let count = catalog.get("hindsight_injected_message_count").unwrap();
        assert_eq!(count.column, 1);
        assert_eq!(count.kind, ValueKind::Gauge);
        assert_eq!(count.descriptor.label_name, "plugin");

        let failures = catalog.get("hindsight_process_message_failures").unwrap();
        assert_eq!(failures.column, 4);
        assert_eq!(failures.descriptor.help, "Number of processed failure messages");
    }

    #[test]
    fn test_describe_is_stable() {
        let catalog = Catalog::hindsight();
        let first: Vec<_> = catalog.describe().cloned().collect();
        let second: Vec<_> = catalog.describe().cloned().collect();
        assert_eq!(first, second);

        let names: Vec<_> = first.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "hindsight_injected_message_bytes",
                "hindsight_injected_message_count",
                "hindsight_process_message_count",
                "hindsight_process_message_failures",
            ]
        );
    }

    #[test]
    fn test_from_definitions_rejects_duplicates() {
        let result = Catalog::from_definitions([
            MetricDefinition::gauge("a", "first", "plugin", 1),
            MetricDefinition::gauge("a", "second", "plugin", 2),
        ]);
        assert!(matches!(result, Err(CatalogError::DuplicateName(name)) if name == "a"));
    }

    #[test]
    fn test_from_definitions_rejects_label_column() {
        let result = Catalog::from_definitions([MetricDefinition::gauge("a", "x", "plugin", 0)]);
        assert!(matches!(result, Err(CatalogError::LabelColumn(_))));

        let result = Catalog::from_definitions([MetricDefinition::gauge("", "x", "plugin", 1)]);
        assert!(matches!(result, Err(CatalogError::EmptyName)));
    }

    #[test]
    fn test_from_definitions_rejects_telemetry_names() {
        let result = Catalog::from_definitions([MetricDefinition::gauge(
            "hindsight_exporter_source_up",
            "clashes with scrape telemetry",
            "plugin",
            1,
        )]);
        assert!(
            matches!(result, Err(CatalogError::ReservedName(name)) if name == "hindsight_exporter_source_up")
        );
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::from_definitions(Vec::new()).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.max_column(), 0);
    }
}
