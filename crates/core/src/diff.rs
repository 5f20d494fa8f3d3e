//! Content diffs between two recorded versions of an object
//!
//! A diff is prepared by the external inventory comparator and consumed here;
//! this subsystem never computes raw inventories itself. Every entry carries
//! the signatures the shelver needs to gate its file mutations.

use crate::fsops::normalize_path;
use crate::signature::Signature;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A file present in the new version but not the basis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedFile {
    pub path: String,
    pub signature: Signature,
}

/// A file whose content changed between versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiedFile {
    pub path: String,
    /// Signature recorded for the basis version
    pub basis_signature: Signature,
    /// Signature of the new content
    pub signature: Signature,
}

/// A file removed in the new version
///
/// Upstream expresses copy-deletions (a duplicate removed while its twin
/// survives) as plain deletions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedFile {
    pub path: String,
    pub basis_signature: Signature,
}

/// A file moved to a new path, content unchanged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamedFile {
    pub from: String,
    pub to: String,
    pub signature: Signature,
}

/// New duplicates of a surviving basis file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopiedFile {
    pub basis: String,
    pub targets: Vec<String>,
    pub signature: Signature,
}

/// Per-file changes between two recorded inventories, scoped to one content
/// group
///
/// Ephemeral: computed on demand by the external comparator and consumed
/// once by the shelver and the metadata merger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentDiff {
    pub added: Vec<AddedFile>,
    pub modified: Vec<ModifiedFile>,
    pub deleted: Vec<DeletedFile>,
    pub renamed: Vec<RenamedFile>,
    pub copied: Vec<CopiedFile>,
}

impl ContentDiff {
    /// Check if there are any changes
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.modified.is_empty()
            && self.deleted.is_empty()
            && self.renamed.is_empty()
            && self.copied.is_empty()
    }

    /// Paths whose bytes must be copied from the workspace into stacks:
    /// added files, modified files, and copy targets
    pub fn paths_to_shelve(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = Vec::new();
        paths.extend(self.added.iter().map(|a| a.path.as_str()));
        paths.extend(self.modified.iter().map(|m| m.path.as_str()));
        for copy in &self.copied {
            paths.extend(copy.targets.iter().map(String::as_str));
        }
        paths
    }

    /// Every path named anywhere in the diff, basis and destination alike
    pub fn all_paths_touched(&self) -> Vec<&str> {
        let mut paths = self.paths_to_shelve();
        paths.extend(self.deleted.iter().map(|d| d.path.as_str()));
        for rename in &self.renamed {
            paths.push(rename.from.as_str());
            paths.push(rename.to.as_str());
        }
        paths.extend(self.copied.iter().map(|c| c.basis.as_str()));
        paths
    }

    /// Validate that every path is a well-formed relative path and every
    /// entry is internally consistent
    pub fn validate(&self) -> Result<()> {
        for path in self.all_paths_touched() {
            normalize_path(Path::new(path))?;
        }
        for rename in &self.renamed {
            if rename.from == rename.to {
                anyhow::bail!("Rename with identical paths: {}", rename.from);
            }
        }
        for copy in &self.copied {
            if copy.targets.is_empty() {
                anyhow::bail!("Copy of {} has no targets", copy.basis);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::signature_of_bytes;

    fn sig(data: &[u8]) -> Signature {
        signature_of_bytes(data)
    }

    #[test]
    fn test_empty_diff() {
        let diff = ContentDiff::default();
        assert!(diff.is_empty());
        assert!(diff.paths_to_shelve().is_empty());
        assert!(diff.validate().is_ok());
    }

    #[test]
    fn test_paths_to_shelve() {
        let diff = ContentDiff {
            added: vec![AddedFile {
                path: "page-4.jpg".into(),
                signature: sig(b"p4"),
            }],
            modified: vec![ModifiedFile {
                path: "page-1.jpg".into(),
                basis_signature: sig(b"p1-old"),
                signature: sig(b"p1-new"),
            }],
            deleted: vec![DeletedFile {
                path: "page-2.jpg".into(),
                basis_signature: sig(b"p2"),
            }],
            renamed: vec![],
            copied: vec![CopiedFile {
                basis: "title.jpg".into(),
                targets: vec!["cover.jpg".into()],
                signature: sig(b"t"),
            }],
        };

        let paths = diff.paths_to_shelve();
        assert_eq!(paths, vec!["page-4.jpg", "page-1.jpg", "cover.jpg"]);
        assert!(!diff.is_empty());
    }

    #[test]
    fn test_all_paths_touched_includes_basis_paths() {
        let diff = ContentDiff {
            renamed: vec![RenamedFile {
                from: "a.txt".into(),
                to: "b.txt".into(),
                signature: sig(b"a"),
            }],
            deleted: vec![DeletedFile {
                path: "gone.txt".into(),
                basis_signature: sig(b"g"),
            }],
            ..Default::default()
        };

        let paths = diff.all_paths_touched();
        assert!(paths.contains(&"a.txt"));
        assert!(paths.contains(&"b.txt"));
        assert!(paths.contains(&"gone.txt"));
    }

    #[test]
    fn test_validate_rejects_traversal() {
        let diff = ContentDiff {
            added: vec![AddedFile {
                path: "../escape.txt".into(),
                signature: sig(b"x"),
            }],
            ..Default::default()
        };
        assert!(diff.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_absolute_path() {
        let diff = ContentDiff {
            deleted: vec![DeletedFile {
                path: "/etc/passwd".into(),
                basis_signature: sig(b"x"),
            }],
            ..Default::default()
        };
        assert!(diff.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_self_rename() {
        let diff = ContentDiff {
            renamed: vec![RenamedFile {
                from: "same.txt".into(),
                to: "same.txt".into(),
                signature: sig(b"s"),
            }],
            ..Default::default()
        };
        assert!(diff.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_copy_without_targets() {
        let diff = ContentDiff {
            copied: vec![CopiedFile {
                basis: "a.txt".into(),
                targets: vec![],
                signature: sig(b"a"),
            }],
            ..Default::default()
        };
        assert!(diff.validate().is_err());
    }

    #[test]
    fn test_serde_roundtrip_from_external_json() {
        let raw = format!(
            r#"{{
                "added": [{{"path": "page-4.jpg", "signature": "{}"}}],
                "modified": [{{"path": "page-1.jpg", "basis_signature": "{}", "signature": "{}"}}]
            }}"#,
            sig(b"p4").to_hex(),
            sig(b"p1-old").to_hex(),
            sig(b"p1-new").to_hex(),
        );

        let diff: ContentDiff = serde_json::from_str(&raw).unwrap();
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.modified.len(), 1);
        assert!(diff.deleted.is_empty());

        let back: ContentDiff =
            serde_json::from_str(&serde_json::to_string(&diff).unwrap()).unwrap();
        assert_eq!(back, diff);
    }
}
