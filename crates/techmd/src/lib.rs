//! Technical metadata for versioned digital objects
//!
//! This crate provides:
//! - The per-file record document (`objectId` + `datetime` root, records
//!   sorted by path)
//! - Detection and injected upgrade of transitional legacy documents
//! - The incremental merge: only paths named in a diff are rewritten
//! - An on-disk document store memoized through an injected cache

pub mod document;
pub mod merge;
pub mod store;

// Re-exports
pub use document::{
    detect_variant, read_document, DocumentVariant, FileRecord, LegacyUpgrade, TechDocument,
    TECHMD_VERSION,
};
pub use merge::merge;
pub use store::{DocumentCache, DocumentStore, MemoryCache};

/// Errors from technical-metadata handling
#[derive(Debug, thiserror::Error)]
pub enum TechmdError {
    /// A transitional legacy document reached the merge without upgrade
    #[error("transitional document must be upgraded before merging")]
    TransitionalDocument,

    /// The injected legacy upgrade collaborator failed
    #[error("legacy upgrade failed: {0}")]
    Upgrade(#[source] anyhow::Error),

    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Atomic document rewrite failed
    #[error("document write failed: {0}")]
    Write(#[source] anyhow::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for technical-metadata operations
pub type Result<T> = std::result::Result<T, TechmdError>;
