//! Three-phase application of a content diff: delete, rename, copy
//!
//! Every file step re-verifies the signature of the file it is about to
//! touch and treats already-correct state as success, so a pass interrupted
//! at any point is resumed by re-running the same diff.

use crate::{FileFailure, ShelveError, StepError};
use plinth_core::diff::{ContentDiff, RenamedFile};
use plinth_core::signature::{signature_of_bytes, signature_of_file, Signature};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What happened to one file during a shelve pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileAction {
    Deleted(PathBuf),
    Renamed { from: PathBuf, to: PathBuf },
    Shelved(PathBuf),
    /// Destination already matched the expected signature
    Skipped(PathBuf),
    /// Destination existed with different content and was replaced
    Overwrote(PathBuf),
}

/// Record of the steps a shelve pass completed
#[derive(Debug, Default)]
pub struct ShelveReport {
    pub actions: Vec<FileAction>,
}

impl ShelveReport {
    /// Number of steps that mutated the destination tree
    pub fn mutations(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| !matches!(a, FileAction::Skipped(_)))
            .count()
    }
}

/// Applies one content group's diff to a stacks tree
///
/// `content_dir` is the workspace content directory new bytes are copied
/// from; `stacks_dir` is the object's directory in the public stacks tree.
pub struct Shelver {
    content_dir: PathBuf,
    stacks_dir: PathBuf,
}

/// Result of a gated delete
enum DeleteOutcome {
    Deleted,
    Absent,
    /// Destination already holds the expected post-state content
    AlreadyCorrect,
}

impl Shelver {
    pub fn new(content_dir: PathBuf, stacks_dir: PathBuf) -> Self {
        Self {
            content_dir,
            stacks_dir,
        }
    }

    /// Apply a diff: delete phase, rename phase, copy phase
    ///
    /// Per-file failures never abort the whole diff; all independent steps
    /// run and failures aggregate into [`ShelveError::Partial`]. A file
    /// refused in an earlier phase is skipped by its later phases.
    pub fn apply(&self, diff: &ContentDiff) -> Result<ShelveReport, ShelveError> {
        diff.validate()?;

        let mut report = ShelveReport::default();
        let mut failures: Vec<FileFailure> = Vec::new();
        let mut poisoned: HashSet<&str> = HashSet::new();

        if let Err(e) = fs::create_dir_all(&self.stacks_dir) {
            failures.push(FileFailure {
                path: self.stacks_dir.clone(),
                error: e.into(),
            });
            return Err(ShelveError::Partial { failures, report });
        }

        // 1. Delete phase
        for deleted in &diff.deleted {
            let dest = self.stacks_dir.join(&deleted.path);
            match gated_delete(&dest, deleted.basis_signature, None) {
                Ok(DeleteOutcome::Deleted) => report.actions.push(FileAction::Deleted(dest)),
                Ok(_) => {} // already absent
                Err(error) => failures.push(FileFailure { path: dest, error }),
            }
        }

        // Modified files are removed before re-copy, gated on the recorded
        // basis; a destination already holding the new content is left alone
        for modified in &diff.modified {
            let dest = self.stacks_dir.join(&modified.path);
            match gated_delete(&dest, modified.basis_signature, Some(modified.signature)) {
                Ok(_) => {}
                Err(error) => {
                    poisoned.insert(modified.path.as_str());
                    failures.push(FileFailure { path: dest, error });
                }
            }
        }

        // 2. Rename phase: every old -> temp, then every temp -> new, so a
        // rename graph containing swaps cannot collide
        for rename in &diff.renamed {
            if let Err(error) = self.rename_to_temp(rename) {
                poisoned.insert(rename.to.as_str());
                failures.push(FileFailure {
                    path: self.stacks_dir.join(&rename.from),
                    error,
                });
            }
        }
        for rename in &diff.renamed {
            if poisoned.contains(rename.to.as_str()) {
                continue;
            }
            let to = self.stacks_dir.join(&rename.to);
            match self.rename_from_temp(rename) {
                Ok(true) => report.actions.push(FileAction::Renamed {
                    from: self.stacks_dir.join(&rename.from),
                    to,
                }),
                Ok(false) => report.actions.push(FileAction::Skipped(to)),
                Err(error) => failures.push(FileFailure { path: to, error }),
            }
        }

        // 3. Copy phase: added files, copy targets, then modified files
        let mut to_copy: Vec<(&str, Signature)> = Vec::new();
        to_copy.extend(diff.added.iter().map(|a| (a.path.as_str(), a.signature)));
        for copy in &diff.copied {
            to_copy.extend(copy.targets.iter().map(|t| (t.as_str(), copy.signature)));
        }
        to_copy.extend(
            diff.modified
                .iter()
                .map(|m| (m.path.as_str(), m.signature)),
        );

        for (path, expected) in to_copy {
            if poisoned.contains(path) {
                continue;
            }
            match self.copy_into_stacks(path, expected) {
                Ok(action) => report.actions.push(action),
                Err(error) => failures.push(FileFailure {
                    path: self.stacks_dir.join(path),
                    error,
                }),
            }
        }

        if failures.is_empty() {
            Ok(report)
        } else {
            Err(ShelveError::Partial { failures, report })
        }
    }

    /// Temp path for the two-step rename shuffle
    ///
    /// Keyed by content signature and destination path: two renames carrying
    /// identical bytes get distinct temps, and the name is deterministic so
    /// an interrupted shuffle resumes from the same diff.
    fn rename_temp_path(&self, rename: &RenamedFile) -> PathBuf {
        let key =
            signature_of_bytes(format!("{}:{}", rename.signature.to_hex(), rename.to).as_bytes());
        self.stacks_dir
            .join(format!(".shelve-{}", &key.to_hex()[..16]))
    }

    /// First half-step: move the old path aside to its temp name
    fn rename_to_temp(&self, rename: &RenamedFile) -> Result<(), StepError> {
        let temp = self.rename_temp_path(rename);
        if temp.exists() && signature_of_file(&temp)? == rename.signature {
            return Ok(());
        }

        let to = self.stacks_dir.join(&rename.to);
        if to.exists() && signature_of_file(&to)? == rename.signature {
            // Whole rename already landed on a previous pass
            return Ok(());
        }

        let from = self.stacks_dir.join(&rename.from);
        if !from.exists() {
            return Err(StepError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("rename source missing: {}", from.display()),
            )));
        }

        let found = signature_of_file(&from)?;
        if found != rename.signature {
            return Err(StepError::UnexpectedFileState {
                expected: rename.signature,
                found,
            });
        }

        fs::rename(&from, &temp)?;
        Ok(())
    }

    /// Second half-step: land the temp on its destination
    ///
    /// Returns false when the destination was already correct.
    fn rename_from_temp(&self, rename: &RenamedFile) -> Result<bool, StepError> {
        let to = self.stacks_dir.join(&rename.to);
        let temp = self.rename_temp_path(rename);

        if to.exists() && signature_of_file(&to)? == rename.signature {
            // Clear a leftover temp from an interrupted earlier pass
            if temp.exists() && signature_of_file(&temp)? == rename.signature {
                fs::remove_file(&temp)?;
            }
            return Ok(false);
        }

        if !temp.exists() {
            return Err(StepError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("rename temp missing: {}", temp.display()),
            )));
        }

        let found = signature_of_file(&temp)?;
        if found != rename.signature {
            return Err(StepError::UnexpectedFileState {
                expected: rename.signature,
                found,
            });
        }

        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&temp, &to)?;
        Ok(true)
    }

    /// Copy one file from the workspace content dir into stacks
    ///
    /// Bytes land on a temp file, are verified against the expected
    /// signature, then renamed into place, so the destination never exposes
    /// partially written or wrong content.
    fn copy_into_stacks(&self, path: &str, expected: Signature) -> Result<FileAction, StepError> {
        let dest = self.stacks_dir.join(path);

        let mut replaced = false;
        if dest.exists() {
            let found = signature_of_file(&dest)?;
            if found == expected {
                return Ok(FileAction::Skipped(dest));
            }
            tracing::warn!(
                "Replacing {} whose signature {} was not the recorded state",
                dest.display(),
                found
            );
            replaced = true;
        }

        let src = self.content_dir.join(path);
        let temp = self
            .stacks_dir
            .join(format!(".copy-{}", uuid::Uuid::new_v4()));

        fs::copy(&src, &temp)?;

        let landed = signature_of_file(&temp)?;
        if landed != expected {
            let _ = fs::remove_file(&temp);
            return Err(StepError::VerifyFailed { expected, landed });
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&temp, &dest)?;

        Ok(if replaced {
            FileAction::Overwrote(dest)
        } else {
            FileAction::Shelved(dest)
        })
    }
}

/// Delete `dest` only if its current signature matches `basis`
///
/// Absence is success. A destination already matching `post` (the expected
/// post-state for a modified file) is left alone. Any other signature is an
/// `UnexpectedFileState` refusal.
fn gated_delete(
    dest: &Path,
    basis: Signature,
    post: Option<Signature>,
) -> Result<DeleteOutcome, StepError> {
    if !dest.exists() {
        return Ok(DeleteOutcome::Absent);
    }

    let found = signature_of_file(dest)?;
    if Some(found) == post {
        return Ok(DeleteOutcome::AlreadyCorrect);
    }
    if found != basis {
        return Err(StepError::UnexpectedFileState {
            expected: basis,
            found,
        });
    }

    fs::remove_file(dest)?;
    Ok(DeleteOutcome::Deleted)
}
