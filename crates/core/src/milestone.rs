//! Lifecycle milestones supplied by the external workflow oracle
//!
//! This subsystem never writes milestones, only reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A timestamped named event in an object's processing lifecycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    /// Milestone name from the fixed lifecycle vocabulary
    #[serde(rename = "milestone")]
    pub name: String,
    /// Version the milestone belongs to; absent means still active/unversioned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// When the milestone was recorded
    pub at: DateTime<Utc>,
}

impl Milestone {
    /// Whether this milestone counts toward the given current version
    ///
    /// Version-less milestones are still active and always count.
    pub fn applies_to(&self, current_version: u32) -> bool {
        match self.version {
            Some(v) => v == current_version,
            None => true,
        }
    }
}

/// Lifecycle rank of a milestone name
///
/// Unranked names return None and are ignored by status resolution.
pub fn milestone_rank(name: &str) -> Option<u8> {
    match name {
        "registered" => Some(1),
        "submitted" => Some(2),
        "described" => Some(3),
        "published" => Some(4),
        "deposited" => Some(5),
        "accessioned" => Some(6),
        "indexed" => Some(7),
        "shelved" => Some(8),
        "opened" => Some(9),
        _ => None,
    }
}

/// Whether the "accessioned" milestone has landed for a version
///
/// The pruner uses this to keep an in-flight version's retired tree alive.
pub fn accessioned(milestones: &[Milestone], version: u32) -> bool {
    milestones
        .iter()
        .any(|m| m.name == "accessioned" && m.version == Some(version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_rank_table() {
        assert_eq!(milestone_rank("registered"), Some(1));
        assert_eq!(milestone_rank("accessioned"), Some(6));
        assert_eq!(milestone_rank("opened"), Some(9));
        assert_eq!(milestone_rank("unknown-step"), None);
        assert_eq!(milestone_rank(""), None);
    }

    #[test]
    fn test_applies_to() {
        let versioned = Milestone {
            name: "published".into(),
            version: Some(2),
            at: at(100),
        };
        assert!(versioned.applies_to(2));
        assert!(!versioned.applies_to(3));

        let active = Milestone {
            name: "submitted".into(),
            version: None,
            at: at(100),
        };
        assert!(active.applies_to(1));
        assert!(active.applies_to(7));
    }

    #[test]
    fn test_accessioned() {
        let milestones = vec![
            Milestone {
                name: "accessioned".into(),
                version: Some(1),
                at: at(100),
            },
            Milestone {
                name: "submitted".into(),
                version: Some(2),
                at: at(200),
            },
        ];

        assert!(accessioned(&milestones, 1));
        assert!(!accessioned(&milestones, 2));
        assert!(!accessioned(&[], 1));
    }

    #[test]
    fn test_serde_feed_shape() {
        let raw = r#"[
            {"milestone": "registered", "version": 1, "at": "2026-01-05T10:00:00Z"},
            {"milestone": "submitted", "at": "2026-01-06T11:30:00Z"}
        ]"#;

        let feed: Vec<Milestone> = serde_json::from_str(raw).unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].name, "registered");
        assert_eq!(feed[0].version, Some(1));
        assert_eq!(feed[1].version, None);
    }
}
