//! Edit command: change a tracker's editable fields.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::{DateTime, Local, Utc};
use clap::Args;
use ct_core::{TrackerPatch, TrackerStatus};

use crate::commands::util::{parse_target, resolve_tracker};
use crate::context::AppContext;
use crate::render::{short_id, write_card};

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Tracker ID or a unique prefix of at least 4 characters.
    pub id: String,

    /// New title.
    #[arg(long)]
    pub title: Option<String>,

    /// New description.
    #[arg(short, long, conflicts_with = "clear_description")]
    pub description: Option<String>,

    /// Remove the description.
    #[arg(long)]
    pub clear_description: bool,

    /// New target (same formats as `ct add --target`).
    #[arg(short, long)]
    pub target: Option<String>,

    /// New status: progress, not-started, or available.
    #[arg(short, long)]
    pub status: Option<TrackerStatus>,
}

fn build_patch(args: &EditArgs, now: DateTime<Utc>) -> Result<TrackerPatch> {
    let mut patch = TrackerPatch::default();
    if let Some(title) = &args.title {
        patch = patch.title(title)?;
    }
    if args.clear_description {
        patch = patch.description(None);
    } else if let Some(description) = &args.description {
        patch = patch.description(Some(description));
    }
    if let Some(target) = &args.target {
        patch = patch.target_timestamp(parse_target(target, now)?);
    }
    if let Some(status) = args.status {
        patch = patch.status(status);
    }
    Ok(patch)
}

pub fn run<W: Write>(
    writer: &mut W,
    ctx: &mut AppContext,
    args: &EditArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let owner = ctx.owner()?;
    let patch = build_patch(args, now)?;
    if patch.is_empty() {
        bail!("nothing to change. Pass --title, --description, --clear-description, --target, or --status");
    }

    let id = resolve_tracker(&ctx.db, &owner, &args.id)?;
    let tracker = ctx.db.update_tracker(&owner, &id, &patch)?;

    writeln!(writer, "Updated tracker {}", short_id(&tracker.id))?;
    write_card(writer, &tracker, now, &Local, &ctx.palette())?;
    Ok(())
}
