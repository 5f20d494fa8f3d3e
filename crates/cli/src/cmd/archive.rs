//! Retire a workspace tree for a closed version

use crate::config::Roots;
use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use plinth_workspace::{archive, ArchiveOutcome};

pub fn run(druid: &str, version: u32, roots: &Roots) -> Result<()> {
    // 1. Parse the identifier
    let druid = util::parse_druid(druid)?;

    // 2. Retire the tree
    let outcome = archive(&druid, version, &roots.workspace)
        .with_context(|| format!("Failed to archive {} v{}", druid, version))?;

    // 3. Report
    match outcome {
        ArchiveOutcome::Renamed => {
            println!("{} {} v{}", "Archived".green().bold(), druid, version);
        }
        ArchiveOutcome::NoWorkspace => {
            println!("{}", "No workspace tree - nothing to archive".dimmed());
        }
    }

    Ok(())
}
