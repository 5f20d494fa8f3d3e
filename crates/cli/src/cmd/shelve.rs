//! Apply a content diff against the object's stacks tree

use crate::config::Roots;
use crate::util;
use anyhow::Result;
use owo_colors::OwoColorize;
use plinth_shelve::{FileAction, ShelveError, Shelver};
use std::path::Path;

pub fn run(druid: &str, diff_path: &Path, roots: &Roots) -> Result<()> {
    // 1. Parse inputs
    let druid = util::parse_druid(druid)?;
    let diff = util::read_diff(diff_path)?;

    if diff.is_empty() {
        println!("{}", "Empty diff - nothing to shelve".dimmed());
        return Ok(());
    }

    // 2. Apply the diff: workspace content dir -> stacks object tree
    let shelver = Shelver::new(
        druid.content_dir(&roots.workspace),
        druid.tree_path(&roots.stacks),
    );

    match shelver.apply(&diff) {
        Ok(report) => {
            println!("{} {}", "Shelved".green().bold(), druid);
            print_actions(&report.actions);
            Ok(())
        }
        Err(ShelveError::Partial { failures, report }) => {
            print_actions(&report.actions);
            eprintln!("{}", "Some files failed:".red().bold());
            for failure in &failures {
                eprintln!("  {}: {}", failure.path.display(), failure.error);
            }
            anyhow::bail!("{} file(s) failed to shelve {}", failures.len(), druid);
        }
        Err(e) => Err(e.into()),
    }
}

fn print_actions(actions: &[FileAction]) {
    for action in actions {
        match action {
            FileAction::Deleted(path) => println!("  deleted   {}", path.display()),
            FileAction::Renamed { from, to } => {
                println!("  renamed   {} -> {}", from.display(), to.display());
            }
            FileAction::Shelved(path) => println!("  shelved   {}", path.display()),
            FileAction::Skipped(path) => {
                println!("  {}", format!("unchanged {}", path.display()).dimmed());
            }
            FileAction::Overwrote(path) => {
                println!("  {}  {}", "replaced".yellow(), path.display());
            }
        }
    }
}
