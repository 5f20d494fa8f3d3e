//! Roll back an erroneous version close

use crate::config::Roots;
use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use plinth_workspace::{reset, ArchiveOutcome};

pub fn run(druid: &str, version: u32, roots: &Roots) -> Result<()> {
    // 1. Parse the identifier
    let druid = util::parse_druid(druid)?;

    // 2. Restore the retired tree
    let outcome = reset(&druid, version, &roots.workspace)
        .with_context(|| format!("Failed to reset {} v{}", druid, version))?;

    // 3. Report
    match outcome {
        ArchiveOutcome::Renamed => {
            println!("{} {} v{}", "Reset".green().bold(), druid, version);
        }
        ArchiveOutcome::NoWorkspace => {
            println!("{}", "No retired tree - nothing to reset".dimmed());
        }
    }

    Ok(())
}
