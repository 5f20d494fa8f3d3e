//! Workspace tree lifecycle for versioned digital objects
//!
//! This crate provides:
//! - Archival of a druid's workspace tree to a version-suffixed sibling
//! - The inverse reset used to roll back an erroneous version close
//! - Pruning of retired trees, export artifacts, and empty ancestors

pub mod archive;
pub mod prune;

// Re-exports
pub use archive::{archive, reset, retired_tree_path, ArchiveOutcome};
pub use prune::{
    cleanup_object, prune_empty_ancestors, prune_export_artifacts, prune_limit,
    prune_version_trees, PruneMetrics,
};

use std::path::PathBuf;

/// Errors from workspace tree operations
///
/// Rename collisions are fatal preconditions the operator must investigate;
/// they are never retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    /// The retired destination for this version already exists
    #[error("archived tree already exists: {0}")]
    AlreadyArchived(PathBuf),

    /// The live workspace tree already exists; refusing to reset onto it
    #[error("workspace tree already exists: {0}")]
    WorkspaceExists(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for workspace operations
pub type Result<T> = std::result::Result<T, WorkspaceError>;
