//! Show processing status derived from the milestone feed

use crate::util;
use anyhow::Result;
use owo_colors::OwoColorize;
use plinth_core::status::resolve_status;
use std::path::Path;

pub fn run(druid: &str, milestones_path: &Path, current_version: u32, time: bool) -> Result<()> {
    // 1. Parse inputs
    let druid = util::parse_druid(druid)?;
    let feed = util::read_milestones(milestones_path)?;

    // 2. Reduce the feed to the current version's status
    let status = resolve_status(&feed, current_version);

    println!("{} {}", druid.to_string().bold(), status.render(time));
    Ok(())
}
