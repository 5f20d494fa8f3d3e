//! Processing status derived from recorded lifecycle milestones
//!
//! Pure reduction over externally supplied milestone data; no I/O.

use crate::milestone::{milestone_rank, Milestone};
use chrono::{DateTime, Utc};
use std::fmt;

/// The current version's display status
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub version: u32,
    pub rank: u8,
    /// Timestamp of the winning milestone, if any milestone ranked
    pub at: Option<DateTime<Utc>>,
}

impl Status {
    /// Display label for the winning rank
    pub fn label(&self) -> &'static str {
        match self.rank {
            1 => "registered",
            2 => "submitted",
            3 => "described",
            4 => "published",
            5 => "deposited",
            6 => "accessioned",
            7 => "indexed",
            8 => "shelved",
            9 => "opened",
            _ => "unknown",
        }
    }

    /// Render as `v<version> <label>`, optionally with the milestone time
    pub fn render(&self, include_time: bool) -> String {
        let mut out = format!("v{} {}", self.version, self.label());
        if include_time {
            if let Some(at) = self.at {
                out.push(' ');
                out.push_str(&at.format("%Y-%m-%d %I:%M%p").to_string());
            }
        }
        out
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(false))
    }
}

/// Reduce an ordered milestone list into the current version's status
///
/// A milestone counts if it belongs to the current version or is version-less
/// (still active). Higher rank wins; equal rank is broken by later timestamp.
/// `registered` only counts for the very first version. Unranked names are
/// ignored.
pub fn resolve_status(milestones: &[Milestone], current_version: u32) -> Status {
    let mut best_rank = 0u8;
    let mut best_at: Option<DateTime<Utc>> = None;

    for milestone in milestones {
        if !milestone.applies_to(current_version) {
            continue;
        }
        if milestone.name == "registered" && current_version > 1 {
            continue;
        }
        let rank = match milestone_rank(&milestone.name) {
            Some(rank) => rank,
            None => continue,
        };

        let later_at_same_rank = rank == best_rank && Some(milestone.at) > best_at;
        if rank > best_rank || later_at_same_rank {
            best_rank = rank;
            best_at = Some(milestone.at);
        }
    }

    Status {
        version: current_version,
        rank: best_rank,
        at: best_at,
    }
}
