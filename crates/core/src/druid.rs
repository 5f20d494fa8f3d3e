//! Druid identifiers and their on-disk tree paths

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Error raised when an identifier does not match the segmentation rule
#[derive(Debug, thiserror::Error)]
pub enum DruidError {
    #[error("invalid druid format: {0:?}")]
    InvalidFormat(String),
}

/// Identifier of one digital object
///
/// The canonical bare form is eleven characters: two lowercase letters, three
/// digits, two lowercase letters, four digits (`ab123cd4567`). A `druid:`
/// prefix is accepted on parse and stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Druid(String);

impl Druid {
    /// Parse an identifier, stripping an optional `druid:` prefix
    pub fn parse(input: &str) -> Result<Self, DruidError> {
        let bare = input.strip_prefix("druid:").unwrap_or(input);

        if !is_valid_bare_id(bare) {
            return Err(DruidError::InvalidFormat(input.to_string()));
        }

        Ok(Self(bare.to_string()))
    }

    /// The bare identifier, without prefix
    pub fn id(&self) -> &str {
        &self.0
    }

    /// The identifier's tree-shaped directory path under a root
    ///
    /// Segments follow the fixed 2-3-2-4 rule plus a leaf directory named
    /// after the full bare id: `root/ab/123/cd/4567/ab123cd4567`. Pure, no
    /// I/O.
    pub fn tree_path(&self, root: &Path) -> PathBuf {
        let id = self.id();
        root.join(&id[0..2])
            .join(&id[2..5])
            .join(&id[5..7])
            .join(&id[7..11])
            .join(id)
    }

    /// The `content` directory inside the workspace tree
    ///
    /// Shelving copies bytes from here into the stacks tree.
    pub fn content_dir(&self, root: &Path) -> PathBuf {
        self.tree_path(root).join("content")
    }
}

fn is_valid_bare_id(bare: &str) -> bool {
    let bytes = bare.as_bytes();
    bytes.len() == 11
        && bytes[0..2].iter().all(u8::is_ascii_lowercase)
        && bytes[2..5].iter().all(u8::is_ascii_digit)
        && bytes[5..7].iter().all(u8::is_ascii_lowercase)
        && bytes[7..11].iter().all(u8::is_ascii_digit)
}

impl fmt::Display for Druid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Druid {
    type Err = DruidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Druid {
    type Error = DruidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Druid> for String {
    fn from(druid: Druid) -> Self {
        druid.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_bare_id() {
        let druid = Druid::parse("ab123cd4567").unwrap();
        assert_eq!(druid.id(), "ab123cd4567");
    }

    #[test]
    fn test_parse_strips_prefix() {
        let druid = Druid::parse("druid:ab123cd4567").unwrap();
        assert_eq!(druid.id(), "ab123cd4567");
        assert_eq!(druid.to_string(), "ab123cd4567");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        // Wrong length
        assert!(Druid::parse("ab123cd456").is_err());
        assert!(Druid::parse("ab123cd45678").is_err());
        assert!(Druid::parse("").is_err());

        // Wrong segment classes
        assert!(Druid::parse("AB123cd4567").is_err());
        assert!(Druid::parse("ab12acd4567").is_err());
        assert!(Druid::parse("ab123cd456x").is_err());
        assert!(Druid::parse("1b123cd4567").is_err());

        // Prefix alone is not an identifier
        assert!(Druid::parse("druid:").is_err());
    }

    #[test]
    fn test_tree_path_segmentation() {
        let druid = Druid::parse("ab123cd4567").unwrap();
        let path = druid.tree_path(Path::new("/workspace"));
        assert_eq!(path, PathBuf::from("/workspace/ab/123/cd/4567/ab123cd4567"));
    }

    #[test]
    fn test_content_dir() {
        let druid = Druid::parse("ab123cd4567").unwrap();
        let path = druid.content_dir(Path::new("/workspace"));
        assert_eq!(
            path,
            PathBuf::from("/workspace/ab/123/cd/4567/ab123cd4567/content")
        );
    }

    #[test]
    fn test_tree_path_deterministic() {
        let a = Druid::parse("zx987yw6543").unwrap();
        let b = Druid::parse("druid:zx987yw6543").unwrap();
        assert_eq!(a.tree_path(Path::new("/r")), b.tree_path(Path::new("/r")));
    }

    #[test]
    fn test_serde_roundtrip() {
        let druid = Druid::parse("ab123cd4567").unwrap();
        let json = serde_json::to_string(&druid).unwrap();
        assert_eq!(json, "\"ab123cd4567\"");

        let back: Druid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, druid);
    }

    #[test]
    fn test_serde_rejects_malformed() {
        let result: Result<Druid, _> = serde_json::from_str("\"not-a-druid\"");
        assert!(result.is_err());
    }
}
