//! Remove every on-disk artifact of a decommissioned object

use crate::config::Roots;
use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use plinth_workspace::cleanup_object;

pub fn run(druid: &str, yes: bool, roots: &Roots) -> Result<()> {
    // 1. Parse the identifier
    let druid = util::parse_druid(druid)?;

    // 2. This deletes the live tree too, so require explicit confirmation
    if !yes {
        anyhow::bail!(
            "Refusing to remove all artifacts of {} (pass --yes to confirm)",
            druid
        );
    }

    // 3. Remove workspace trees, export artifacts, and empty ancestors
    let metrics = cleanup_object(&druid, &roots.workspace, &roots.export)
        .with_context(|| format!("Failed to clean up {}", druid))?;

    // 4. Report
    if metrics.is_empty() {
        println!("{}", "Nothing on disk - object is already clean".dimmed());
    } else {
        println!("{} {}", "Cleaned up".green().bold(), druid);
        println!(
            "Trees deleted: {}",
            metrics.trees_deleted.to_string().yellow()
        );
        println!(
            "Bags deleted:  {}",
            metrics.bags_deleted.to_string().yellow()
        );
        println!(
            "Tars deleted:  {}",
            metrics.tars_deleted.to_string().yellow()
        );
    }

    Ok(())
}
