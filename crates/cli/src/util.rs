//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use plinth_core::diff::ContentDiff;
use plinth_core::druid::Druid;
use plinth_core::milestone::Milestone;
use plinth_techmd::FileRecord;
use std::path::Path;

/// Parse a druid argument, with or without the `druid:` prefix
pub fn parse_druid(input: &str) -> Result<Druid> {
    Druid::parse(input).with_context(|| format!("Invalid druid: {}", input))
}

/// Read and validate a content diff JSON file
pub fn read_diff(path: &Path) -> Result<ContentDiff> {
    let raw = fs_read(path, "diff")?;
    let diff: ContentDiff = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse diff at {}", path.display()))?;
    diff.validate()
        .with_context(|| format!("Diff at {} failed validation", path.display()))?;
    Ok(diff)
}

/// Read a milestone feed JSON file
pub fn read_milestones(path: &Path) -> Result<Vec<Milestone>> {
    let raw = fs_read(path, "milestone feed")?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse milestone feed at {}", path.display()))
}

/// Read a newly-computed file records JSON file
pub fn read_records(path: &Path) -> Result<Vec<FileRecord>> {
    let raw = fs_read(path, "file records")?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse file records at {}", path.display()))
}

fn fs_read(path: &Path, what: &str) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} at {}", what, path.display()))
}
