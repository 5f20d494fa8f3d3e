//! Plinth CLI - plinth command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;
mod config;
mod util;

/// Plinth - workspace archival, shelving, and cleanup for versioned objects
#[derive(Parser)]
#[command(name = "plinth")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Override the configured workspace root
    #[arg(long, global = true, value_name = "DIR")]
    workspace_root: Option<PathBuf>,

    /// Override the configured stacks root
    #[arg(long, global = true, value_name = "DIR")]
    stacks_root: Option<PathBuf>,

    /// Override the configured export root
    #[arg(long, global = true, value_name = "DIR")]
    export_root: Option<PathBuf>,

    /// Override the configured technical-metadata root
    #[arg(long, global = true, value_name = "DIR")]
    metadata_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Retire a druid's workspace tree to its version-suffixed sibling
    Archive {
        /// Object identifier (with or without the druid: prefix)
        druid: String,
        /// Version being closed
        #[arg(long)]
        version: u32,
    },
    /// Restore a retired tree back to the live workspace path
    Reset {
        /// Object identifier
        druid: String,
        /// Version whose close is being rolled back
        #[arg(long)]
        version: u32,
    },
    /// Delete retired version trees and export artifacts
    Prune {
        /// Object identifier
        druid: String,
        /// Current version of the object
        #[arg(long)]
        current_version: u32,
        /// Milestone feed JSON; decides whether the current version finished
        /// accessioning (assumed in-flight when absent)
        #[arg(long)]
        milestones: Option<PathBuf>,
        /// Leave export bags and tars alone
        #[arg(long)]
        skip_export: bool,
    },
    /// Remove every on-disk artifact of a decommissioned object
    Cleanup {
        /// Object identifier
        druid: String,
        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Apply a content diff against the object's stacks tree
    Shelve {
        /// Object identifier
        druid: String,
        /// Content diff JSON prepared by the inventory comparator
        #[arg(long)]
        diff: PathBuf,
    },
    /// Show the object's processing status from its milestone feed
    Status {
        /// Object identifier
        druid: String,
        /// Milestone feed JSON from the lifecycle oracle
        #[arg(long)]
        milestones: PathBuf,
        /// Current version of the object
        #[arg(long)]
        current_version: u32,
        /// Append the winning milestone's timestamp
        #[arg(short, long)]
        time: bool,
    },
    /// Merge newly computed per-file records into the stored document
    Merge {
        /// Object identifier
        druid: String,
        /// Newly computed records JSON (for added and modified paths)
        #[arg(long)]
        records: PathBuf,
        /// Content diff JSON the records belong to
        #[arg(long)]
        diff: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let roots = config::resolve_roots(
        cli.workspace_root,
        cli.stacks_root,
        cli.export_root,
        cli.metadata_root,
    )?;

    match cli.command {
        Commands::Archive { druid, version } => cmd::archive::run(&druid, version, &roots),
        Commands::Reset { druid, version } => cmd::reset::run(&druid, version, &roots),
        Commands::Prune {
            druid,
            current_version,
            milestones,
            skip_export,
        } => cmd::prune::run(
            &druid,
            current_version,
            milestones.as_deref(),
            skip_export,
            &roots,
        ),
        Commands::Cleanup { druid, yes } => cmd::cleanup::run(&druid, yes, &roots),
        Commands::Shelve { druid, diff } => cmd::shelve::run(&druid, &diff, &roots),
        Commands::Status {
            druid,
            milestones,
            current_version,
            time,
        } => cmd::status::run(&druid, &milestones, current_version, time),
        Commands::Merge {
            druid,
            records,
            diff,
        } => cmd::merge::run(&druid, &records, &diff, &roots),
    }
}
