//! Output formatting and persistence for analysis results.
//!
//! Supports pretty-printing, JSON file output, and CSV append of run
//! summaries.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::types::GiroReport;
use crate::stats::ReportStats;
use csv::WriterBuilder;
use std::fs::{self, OpenOptions};
use std::path::Path;

/// Logs a per-route overview using Rust's debug pretty-print format.
pub fn print_pretty(report: &GiroReport) {
    for route in &report.statistics.per_route {
        debug!("{:#?}", route);
    }
}

/// Logs any serializable value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes a value as pretty-printed JSON, creating parent directories.
pub fn write_json(path: &str, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
    }

    let body = serde_json::to_vec_pretty(value)?;
    fs::write(path, body).with_context(|| format!("writing {path}"))?;
    debug!(path, "JSON written");
    Ok(())
}

/// Appends a [`ReportStats`] record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, stats: &ReportStats) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("opening {path}"))?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // header only on first write
        .from_writer(file);

    writer.serialize(stats)?;
    writer.flush()?;

    Ok(())
}
