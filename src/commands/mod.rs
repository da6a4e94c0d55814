//! CLI command implementations for hindsight-exporter.
//!
//! This module provides implementations for all CLI subcommands:
//! - `test`: One-off scrapes of the statistics file
//! - `catalog`: Exported metric listing
//! - `config`: Configuration file generation

pub mod catalog;
pub mod config;

// Re-export command functions
pub use catalog::command_catalog;
pub use config::command_config;
pub use test::command_test;
