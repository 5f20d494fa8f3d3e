//! Deletion of retired trees, export artifacts, and empty ancestors
//!
//! All pruning is idempotent and absence-tolerant: a missing artifact is a
//! normal steady state, not an error.

use crate::archive::retired_tree_path;
use crate::Result;
use plinth_core::druid::Druid;
use std::fs;
use std::io;
use std::path::Path;

/// Counters for a pruning pass
#[derive(Debug, Clone, Copy, Default)]
pub struct PruneMetrics {
    pub trees_deleted: usize,
    pub bags_deleted: usize,
    pub tars_deleted: usize,
    pub ancestors_deleted: usize,
}

impl PruneMetrics {
    pub fn is_empty(&self) -> bool {
        self.trees_deleted == 0
            && self.bags_deleted == 0
            && self.tars_deleted == 0
            && self.ancestors_deleted == 0
    }

    /// Fold another pass's counters into this one
    pub fn absorb(&mut self, other: PruneMetrics) {
        self.trees_deleted += other.trees_deleted;
        self.bags_deleted += other.bags_deleted;
        self.tars_deleted += other.tars_deleted;
        self.ancestors_deleted += other.ancestors_deleted;
    }
}

/// Highest version whose retired tree may be pruned
///
/// While the current version is still mid-accessioning its own retired tree
/// must survive, so the limit stays one behind.
pub fn prune_limit(current_version: u32, accessioned: bool) -> u32 {
    if accessioned {
        current_version
    } else {
        current_version.saturating_sub(1)
    }
}

/// Delete retired version trees `_v1 ..= _v<upto>`, then prune empty
/// ancestors up to the workspace root
///
/// Missing trees are skipped silently. The live (unsuffixed) tree is never
/// enumerated or touched.
pub fn prune_version_trees(druid: &Druid, upto_version: u32, root: &Path) -> Result<PruneMetrics> {
    let mut metrics = PruneMetrics::default();

    for version in 1..=upto_version {
        let retired = retired_tree_path(druid, version, root);
        if retired.exists() {
            fs::remove_dir_all(&retired)?;
            metrics.trees_deleted += 1;
        }
    }

    metrics.ancestors_deleted = prune_empty_ancestors(&druid.tree_path(root), root)?;
    Ok(metrics)
}

/// Delete export bag directories `_v1 ..= _v<upto>` and their `.tar` siblings
///
/// Export artifacts are keyed by the bare id, not the tree path:
/// `<export_root>/<id>_v<N>/` and `<export_root>/<id>_v<N>.tar`.
pub fn prune_export_artifacts(
    druid: &Druid,
    upto_version: u32,
    export_root: &Path,
) -> Result<PruneMetrics> {
    let mut metrics = PruneMetrics::default();

    for version in 1..=upto_version {
        let bag = export_root.join(format!("{}_v{}", druid.id(), version));
        if bag.exists() {
            fs::remove_dir_all(&bag)?;
            metrics.bags_deleted += 1;
        }

        let tar = export_root.join(format!("{}_v{}.tar", druid.id(), version));
        if tar.exists() {
            fs::remove_file(&tar)?;
            metrics.tars_deleted += 1;
        }
    }

    Ok(metrics)
}

/// Walk upward from `leaf`'s parent deleting directories while they are empty
///
/// Stops at (and never deletes) `stop_at`; a leaf outside `stop_at` prunes
/// nothing. `remove_dir` doubles as the emptiness check: a directory that
/// gains a child between calls fails with `DirectoryNotEmpty`, which is
/// success-by-abandonment here. Every other I/O failure propagates.
pub fn prune_empty_ancestors(leaf: &Path, stop_at: &Path) -> Result<usize> {
    let mut deleted = 0;

    let mut current = match leaf.parent() {
        Some(parent) => parent,
        None => return Ok(deleted),
    };

    while current != stop_at && current.starts_with(stop_at) {
        match fs::remove_dir(current) {
            Ok(()) => deleted += 1,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) if directory_not_empty(&e) => {
                tracing::debug!("Abandoning ancestor prune at {}", current.display());
                break;
            }
            Err(e) => return Err(e.into()),
        }

        current = match current.parent() {
            Some(parent) => parent,
            None => break,
        };
    }

    Ok(deleted)
}

// ENOTEMPTY is 39 on Linux, 66 on the BSDs
fn directory_not_empty(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::DirectoryNotEmpty
        || matches!(err.raw_os_error(), Some(39) | Some(66))
}

/// Remove every on-disk artifact of a decommissioned object
///
/// Live tree, retired trees of every version, export bags and tars, then
/// empty ancestors. Idempotent; a second call finds nothing and succeeds.
pub fn cleanup_object(
    druid: &Druid,
    workspace_root: &Path,
    export_root: &Path,
) -> Result<PruneMetrics> {
    let tree = druid.tree_path(workspace_root);
    let mut metrics = PruneMetrics::default();

    if tree.exists() {
        fs::remove_dir_all(&tree)?;
        metrics.trees_deleted += 1;
    }

    // Retired siblings live next to the leaf as <leaf>_v<N>
    if let Some(parent) = tree.parent() {
        if parent.exists() {
            let prefix = format!("{}_v", druid.id());
            for entry in fs::read_dir(parent)? {
                let entry = entry?;
                let name = entry.file_name().to_string_lossy().to_string();
                if let Some(rest) = name.strip_prefix(&prefix) {
                    if is_version_number(rest) {
                        fs::remove_dir_all(entry.path())?;
                        metrics.trees_deleted += 1;
                    }
                }
            }
        }
    }

    metrics.absorb(cleanup_export_artifacts(druid, export_root)?);

    metrics.ancestors_deleted = prune_empty_ancestors(&tree, workspace_root)?;
    Ok(metrics)
}

fn cleanup_export_artifacts(druid: &Druid, export_root: &Path) -> Result<PruneMetrics> {
    let mut metrics = PruneMetrics::default();
    if !export_root.exists() {
        return Ok(metrics);
    }

    let prefix = format!("{}_v", druid.id());
    for entry in fs::read_dir(export_root)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        let rest = match name.strip_prefix(&prefix) {
            Some(rest) => rest,
            None => continue,
        };

        let path = entry.path();
        if path.is_dir() && is_version_number(rest) {
            fs::remove_dir_all(&path)?;
            metrics.bags_deleted += 1;
        } else if let Some(num) = rest.strip_suffix(".tar") {
            if is_version_number(num) {
                fs::remove_file(&path)?;
                metrics.tars_deleted += 1;
            }
        }
    }

    Ok(metrics)
}

fn is_version_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
