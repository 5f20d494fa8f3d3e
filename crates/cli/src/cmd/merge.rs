//! Merge newly computed per-file records into the stored document

use crate::config::Roots;
use crate::util;
use anyhow::{Context, Result};
use chrono::Utc;
use owo_colors::OwoColorize;
use plinth_techmd::{merge, DocumentStore, MemoryCache};
use std::path::Path;

pub fn run(druid: &str, records_path: &Path, diff_path: &Path, roots: &Roots) -> Result<()> {
    // 1. Parse inputs
    let druid = util::parse_druid(druid)?;
    let records = util::read_records(records_path)?;
    let diff = util::read_diff(diff_path)?;

    // 2. Load the previous document, if one was ever persisted
    let store = DocumentStore::new(roots.metadata.clone(), MemoryCache::new());
    let previous = store
        .load(&druid)
        .with_context(|| format!("Failed to load stored document for {}", druid))?;

    // 3. Merge the declared deltas and persist atomically
    let merged = merge(previous.as_deref(), &records, &diff, druid.id(), Utc::now());
    let file_count = merged.files.len();

    store
        .save(&druid, merged)
        .with_context(|| format!("Failed to save merged document for {}", druid))?;

    println!(
        "{} {} ({} file records)",
        "Merged".green().bold(),
        druid,
        file_count
    );
    Ok(())
}
