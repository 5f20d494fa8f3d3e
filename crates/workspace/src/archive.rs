//! Retire and restore versioned workspace trees

use crate::{Result, WorkspaceError};
use plinth_core::druid::Druid;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of an archive or reset call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// The tree was renamed
    Renamed,
    /// No source tree existed; nothing to do
    NoWorkspace,
}

/// Path of the retired tree for a version: the leaf directory with `_v<N>`
/// appended
pub fn retired_tree_path(druid: &Druid, version: u32, root: &Path) -> PathBuf {
    versioned_sibling(&druid.tree_path(root), version)
}

fn versioned_sibling(tree: &Path, version: u32) -> PathBuf {
    let mut name = tree.file_name().unwrap_or_default().to_os_string();
    name.push(format!("_v{}", version));
    tree.with_file_name(name)
}

/// Retire a druid's workspace tree to its version-suffixed sibling
///
/// The rename is a single syscall, so a crash cannot leave a partial state.
/// A retired path for a given version is created at most once; a pre-existing
/// destination is a fatal precondition violation. A missing source tree is a
/// silent no-op: truncated objects legitimately have no workspace content.
pub fn archive(druid: &Druid, version: u32, root: &Path) -> Result<ArchiveOutcome> {
    let tree = druid.tree_path(root);
    let retired = versioned_sibling(&tree, version);

    if retired.exists() {
        return Err(WorkspaceError::AlreadyArchived(retired));
    }
    if !tree.exists() {
        return Ok(ArchiveOutcome::NoWorkspace);
    }

    fs::rename(&tree, &retired)?;
    tracing::debug!("Archived {} to {}", tree.display(), retired.display());
    Ok(ArchiveOutcome::Renamed)
}

/// Restore a retired tree back to the live workspace path
///
/// Inverse of [`archive`] with the same collision and no-op rules; used to
/// roll back an erroneous version close.
pub fn reset(druid: &Druid, version: u32, root: &Path) -> Result<ArchiveOutcome> {
    let tree = druid.tree_path(root);
    let retired = versioned_sibling(&tree, version);

    if tree.exists() {
        return Err(WorkspaceError::WorkspaceExists(tree));
    }
    if !retired.exists() {
        return Ok(ArchiveOutcome::NoWorkspace);
    }

    fs::rename(&retired, &tree)?;
    tracing::debug!("Reset {} to {}", retired.display(), tree.display());
    Ok(ArchiveOutcome::Renamed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn druid() -> Druid {
        Druid::parse("ab123cd4567").unwrap()
    }

    fn make_tree(root: &Path) -> Result<PathBuf> {
        let tree = druid().tree_path(root);
        fs::create_dir_all(tree.join("content"))?;
        fs::write(tree.join("content/page-1.jpg"), b"page one")?;
        Ok(tree)
    }

    #[test]
    fn test_archive_renames_tree() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        let tree = make_tree(root)?;

        let outcome = archive(&druid(), 2, root)?;
        assert_eq!(outcome, ArchiveOutcome::Renamed);

        assert!(!tree.exists());
        let retired = retired_tree_path(&druid(), 2, root);
        assert!(retired.exists());
        assert_eq!(fs::read(retired.join("content/page-1.jpg"))?, b"page one");

        Ok(())
    }

    #[test]
    fn test_archive_twice_fails_already_archived() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        make_tree(root)?;

        archive(&druid(), 1, root)?;

        // Second call fails even though the live tree is now gone
        let result = archive(&druid(), 1, root);
        assert!(matches!(result, Err(WorkspaceError::AlreadyArchived(_))));

        // And with a freshly recreated live tree the collision still wins
        make_tree(root)?;
        let result = archive(&druid(), 1, root);
        assert!(matches!(result, Err(WorkspaceError::AlreadyArchived(_))));

        Ok(())
    }

    #[test]
    fn test_archive_missing_tree_is_noop() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let outcome = archive(&druid(), 1, temp.path())?;
        assert_eq!(outcome, ArchiveOutcome::NoWorkspace);
        Ok(())
    }

    #[test]
    fn test_reset_restores_tree() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        let tree = make_tree(root)?;

        archive(&druid(), 3, root)?;
        assert!(!tree.exists());

        let outcome = reset(&druid(), 3, root)?;
        assert_eq!(outcome, ArchiveOutcome::Renamed);
        assert!(tree.exists());
        assert!(!retired_tree_path(&druid(), 3, root).exists());

        Ok(())
    }

    #[test]
    fn test_reset_refuses_when_workspace_exists() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        make_tree(root)?;

        archive(&druid(), 1, root)?;
        make_tree(root)?;

        let result = reset(&druid(), 1, root);
        assert!(matches!(result, Err(WorkspaceError::WorkspaceExists(_))));

        Ok(())
    }

    #[test]
    fn test_reset_missing_retired_tree_is_noop() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let outcome = reset(&druid(), 1, temp.path())?;
        assert_eq!(outcome, ArchiveOutcome::NoWorkspace);
        Ok(())
    }

    #[test]
    fn test_retired_tree_path_suffix() {
        let retired = retired_tree_path(&druid(), 4, Path::new("/w"));
        assert_eq!(
            retired,
            PathBuf::from("/w/ab/123/cd/4567/ab123cd4567_v4")
        );
    }
}
