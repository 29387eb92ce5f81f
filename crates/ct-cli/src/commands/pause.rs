//! Pause, resume, and toggle commands.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use ct_core::countdown;

use crate::commands::TrackerRef;
use crate::commands::util::resolve_tracker;
use crate::context::AppContext;
use crate::render::write_card;

/// Which pause transition to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Pause,
    Resume,
    /// Pause a running tracker or resume a paused one.
    Toggle,
}

pub fn run<W: Write>(
    writer: &mut W,
    ctx: &mut AppContext,
    args: &TrackerRef,
    transition: Transition,
    now: DateTime<Utc>,
) -> Result<()> {
    let owner = ctx.owner()?;
    let id = resolve_tracker(&ctx.db, &owner, &args.id)?;
    let tracker = ctx.db.get_tracker(&owner, &id)?;

    let patch = match transition {
        Transition::Pause => countdown::pause(&tracker, now)?,
        Transition::Resume => countdown::resume(&tracker, now)?,
        Transition::Toggle => countdown::toggle(&tracker, now)?,
    };
    let updated = ctx.db.update_tracker(&owner, &id, &patch)?;

    let verb = if updated.pause.is_paused() {
        "Paused"
    } else {
        "Resumed"
    };
    writeln!(writer, "{verb} \"{}\"", updated.title)?;
    write_card(writer, &updated, now, &Local, &ctx.palette())?;
    Ok(())
}
