//! Signature-gated shelving of content diffs into a stacks tree
//!
//! This crate provides:
//! - The three-phase (delete, rename, copy) diff application
//! - Per-file failure aggregation: one bad file never aborts the diff
//! - Idempotent steps, so an interrupted pass resumes by re-running
//!
//! The destination is a locally mounted stacks tree; moving bytes to a
//! remote host is the transport collaborator's concern, not this crate's.

pub mod shelver;

// Re-exports
pub use shelver::{FileAction, ShelveReport, Shelver};

use plinth_core::signature::Signature;
use std::path::PathBuf;

/// Why an individual file step failed
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// On-disk signature differs from the recorded basis; the file is left
    /// untouched for the operator to investigate
    #[error("unexpected file state: expected {expected}, found {found}")]
    UnexpectedFileState {
        expected: Signature,
        found: Signature,
    },

    /// Copied bytes did not land with the expected signature
    #[error("copy verification failed: expected {expected}, landed {landed}")]
    VerifyFailed {
        expected: Signature,
        landed: Signature,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<anyhow::Error> for StepError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<std::io::Error>() {
            Ok(io) => StepError::Io(io),
            Err(other) => {
                StepError::Io(std::io::Error::new(std::io::ErrorKind::Other, other))
            }
        }
    }
}

/// A single file step that failed during a shelve pass
#[derive(Debug)]
pub struct FileFailure {
    /// Destination path the step was acting on
    pub path: PathBuf,
    pub error: StepError,
}

/// Errors from a shelve pass
#[derive(Debug, thiserror::Error)]
pub enum ShelveError {
    /// The diff itself is malformed (bad paths, inconsistent entries);
    /// nothing was touched
    #[error("invalid diff: {0}")]
    InvalidDiff(#[from] anyhow::Error),

    /// Some per-file steps failed; completed files are not rolled back and
    /// the same diff is safe to re-run after the cause is fixed
    #[error("{} file(s) failed to shelve", .failures.len())]
    Partial {
        failures: Vec<FileFailure>,
        /// Actions that did complete
        report: ShelveReport,
    },
}
