//! Delete retired version trees and export artifacts

use crate::config::Roots;
use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use plinth_core::milestone::accessioned;
use plinth_workspace::{prune_export_artifacts, prune_limit, prune_version_trees};
use std::path::Path;

pub fn run(
    druid: &str,
    current_version: u32,
    milestones: Option<&Path>,
    skip_export: bool,
    roots: &Roots,
) -> Result<()> {
    // 1. Parse the identifier
    let druid = util::parse_druid(druid)?;

    // 2. Decide how far pruning may reach; without a milestone feed the
    //    current version is assumed mid-accessioning, which keeps its tree
    let is_accessioned = match milestones {
        Some(path) => {
            let feed = util::read_milestones(path)?;
            accessioned(&feed, current_version)
        }
        None => false,
    };
    let upto = prune_limit(current_version, is_accessioned);

    if upto == 0 {
        println!("{}", "Nothing prunable yet - v1 is still in flight".dimmed());
        return Ok(());
    }

    // 3. Prune retired workspace trees
    let mut metrics = prune_version_trees(&druid, upto, &roots.workspace)
        .with_context(|| format!("Failed to prune version trees for {}", druid))?;

    // 4. Prune export artifacts
    if !skip_export {
        let export = prune_export_artifacts(&druid, upto, &roots.export)
            .with_context(|| format!("Failed to prune export artifacts for {}", druid))?;
        metrics.absorb(export);
    }

    // 5. Report
    if metrics.is_empty() {
        println!("{}", "Nothing to prune - object is already clean".dimmed());
    } else {
        println!("{} {} up to v{}", "Pruned".green().bold(), druid, upto);
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
