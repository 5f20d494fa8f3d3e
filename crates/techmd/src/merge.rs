//! Incremental merge of per-file metadata records across versions
//!
//! The merge only rewrites what the diff declares changed; every other
//! record carries forward from the previous version untouched. Records are
//! never recomputed wholesale.

use crate::document::{FileRecord, TechDocument};
use ahash::AHashMap;
use chrono::{DateTime, Utc};
use plinth_core::diff::ContentDiff;

/// Merge previous-version records with newly computed ones
///
/// `newly_computed` holds records for the paths in `added` ∪ `modified`
/// (and copy targets when no basis record survived). With no previous
/// document the merge degenerates to "new records only".
pub fn merge(
    previous: Option<&TechDocument>,
    newly_computed: &[FileRecord],
    diff: &ContentDiff,
    object_id: &str,
    datetime: DateTime<Utc>,
) -> TechDocument {
    let new_by_path: AHashMap<&str, &FileRecord> = newly_computed
        .iter()
        .map(|r| (r.path.as_str(), r))
        .collect();

    // Carry everything forward, then rewrite the declared deltas
    let mut merged: AHashMap<String, FileRecord> = previous
        .map(|doc| {
            doc.files
                .iter()
                .map(|r| (r.path.clone(), r.clone()))
                .collect()
        })
        .unwrap_or_default();

    for deleted in &diff.deleted {
        merged.remove(&deleted.path);
    }

    for rename in &diff.renamed {
        if let Some(record) = merged.remove(&rename.from) {
            merged.insert(rename.to.clone(), record.cloned_as(&rename.to));
        } else if let Some(record) = new_by_path.get(rename.to.as_str()) {
            merged.insert(rename.to.clone(), (*record).clone());
        } else {
            tracing::warn!("No record to carry across rename {} -> {}", rename.from, rename.to);
        }
    }

    for path in diff
        .added
        .iter()
        .map(|a| a.path.as_str())
        .chain(diff.modified.iter().map(|m| m.path.as_str()))
    {
        match new_by_path.get(path) {
            Some(record) => {
                merged.insert(path.to_string(), (*record).clone());
            }
            None => tracing::warn!("No newly computed record for changed path {}", path),
        }
    }

    for copy in &diff.copied {
        // Prefer the basis record from the previous version; fall back to a
        // freshly computed record for one of the targets
        let source = previous
            .and_then(|doc| doc.record_for(&copy.basis))
            .cloned()
            .or_else(|| {
                copy.targets
                    .iter()
                    .find_map(|t| new_by_path.get(t.as_str()))
                    .map(|r| (*r).clone())
            });

        match source {
            Some(source) => {
                for target in &copy.targets {
                    merged.insert(target.clone(), source.cloned_as(target));
                }
            }
            None => tracing::warn!("No record available to clone for copy of {}", copy.basis),
        }
    }

    TechDocument::new(object_id, datetime, merged.into_values().collect())
}
