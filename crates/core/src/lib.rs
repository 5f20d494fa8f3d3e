//! Plinth Core - primitives for versioned digital-object lifecycle management
//!
//! This crate provides the foundational value types:
//! - Druid identifiers and their on-disk tree paths
//! - BLAKE3 content signatures
//! - Content diffs between recorded versions
//! - Lifecycle milestones and status resolution
//! - Shared filesystem helpers (atomic write, path normalization)

pub mod diff;
pub mod druid;
pub mod fsops;
pub mod milestone;
pub mod signature;
pub mod status;

// Re-export main types for convenience
pub use diff::{AddedFile, ContentDiff, CopiedFile, DeletedFile, ModifiedFile, RenamedFile};
pub use druid::{Druid, DruidError};
pub use milestone::{accessioned, milestone_rank, Milestone};
pub use signature::{signature_of_bytes, signature_of_file, Signature};
pub use status::{resolve_status, Status};

/// Common result type used throughout plinth-core
pub type Result<T> = anyhow::Result<T>;
