//! JSON files written at the end of a crawl

use super::{CrawlReport, CrawlResult};
use crate::AisleError;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Writes the flat `{ "<domain>": ["<url>", ...] }` result
///
/// # Arguments
///
/// * `result` - Domain to product URLs
/// * `path` - Destination file; parent directories are created as needed
pub fn write_results_json(result: &CrawlResult, path: &Path) -> Result<(), AisleError> {
    write_pretty(result, path)?;
    tracing::info!("Wrote results for {} domains to {}", result.len(), path.display());
    Ok(())
}

/// Writes the detailed report with per-domain status, timings and stats
pub fn write_report_json(report: &CrawlReport, path: &Path) -> Result<(), AisleError> {
    write_pretty(report, path)?;
    tracing::info!("Wrote crawl report to {}", path.display());
    Ok(())
}

fn write_pretty<T: Serialize>(value: &T, path: &Path) -> Result<(), AisleError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut body = serde_json::to_string_pretty(value)?;
    body.push('\n');
    fs::write(path, body)?;
    Ok(())
}
