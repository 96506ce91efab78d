//! Persisted run documents and the end-of-run report
//!
//! One crawl run produces two JSON documents: the intermediate listing
//! snapshot (feeds enrichment-only runs) and the final enriched results.
//! Both are written atomically so a crash never leaves a partial file.

use crate::model::{DetailRecord, ItemReference};
use crate::pipeline::RunReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Final document for one crawl run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlOutput {
    pub scope: String,
    pub crawled_at: DateTime<Utc>,
    pub total_items: usize,
    pub items: Vec<DetailRecord>,
}

/// Intermediate document written after the listing phase
///
/// Re-read by enrichment-only runs so enrichment can be repeated without
/// re-crawling the full listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSnapshot {
    pub scope: String,
    pub total: usize,
    pub items: Vec<ItemReference>,
}

/// Writes a value as pretty JSON, atomically
///
/// The document is first written to a sibling `.tmp` file and then renamed
/// into place.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> crate::Result<()> {
    let json = serde_json::to_vec_pretty(value)?;

    let tmp = tmp_path(path);
    fs::write(&tmp, &json)?;
    fs::rename(&tmp, path)?;

    tracing::debug!("Wrote {} bytes to {}", json.len(), path.display());
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "output".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Reads a listing snapshot back for an enrichment-only run
pub fn read_listing_snapshot(path: &Path) -> crate::Result<ListingSnapshot> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Prints the end-of-run report
pub fn print_run_report(report: &RunReport) {
    println!("=== Crawl Report: {} ===", report.scope);
    println!("  Discovered items:  {}", report.discovered);
    println!("  Enriched records:  {}", report.enriched);
    println!("  Dropped items:     {}", report.dropped);

    if !report.unresolved.is_empty() {
        println!("  Unresolved labels:");
        for (dimension, count) in &report.unresolved {
            println!("    {}: {}", dimension, count);
        }
    }
}
