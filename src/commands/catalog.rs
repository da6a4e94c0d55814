//! Catalog command implementation.
//!
//! Lists every exported metric with its source column.

use hindsight_exporter::Catalog;

/// Prints the metric catalog.
pub fn command_catalog() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::hindsight();

    println!("📋 Hindsight Exporter - Metric Catalog");
    println!("======================================");
    println!("Column 0 of every data row is the '{}' label.\n", hindsight_exporter::PLUGIN_LABEL);

    for definition in catalog.definitions() {
        let d = &definition.descriptor;
        println!("   ├─ {} ({:?})", d.name, definition.kind);
        println!("   │  ├─ Column: {}", definition.column);
        println!("   │  ├─ Label: {}", d.label_name);
        println!("   │  └─ Help: {}", d.help);
    }

    println!("\n{} metrics", catalog.len());
    Ok(())
}
