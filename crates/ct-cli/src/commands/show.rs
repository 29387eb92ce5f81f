//! Show command: a single tracker card.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use clap::Args;

use crate::commands::list::TrackerEntry;
use crate::commands::util::resolve_tracker;
use crate::context::AppContext;
use crate::render::write_card;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Tracker ID or a unique prefix of at least 4 characters.
    pub id: String,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(
    writer: &mut W,
    ctx: &AppContext,
    args: &ShowArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let owner = ctx.owner()?;
    let id = resolve_tracker(&ctx.db, &owner, &args.id)?;
    let tracker = ctx.db.get_tracker(&owner, &id)?;

    if args.json {
        let entry = TrackerEntry::new(&tracker, now);
        writeln!(writer, "{}", serde_json::to_string_pretty(&entry)?)?;
    } else {
        write_card(writer, &tracker, now, &Local, &ctx.palette())?;
    }
    Ok(())
}
