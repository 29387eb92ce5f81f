//! Delete command with confirmation.

use std::io::{BufRead, Write};

use anyhow::Result;
use clap::Args;

use crate::commands::util::{read_line, resolve_tracker};
use crate::context::AppContext;
use crate::render::short_id;

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Tracker ID or a unique prefix of at least 4 characters.
    pub id: String,

    /// Skip the confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

pub fn run<W: Write, R: BufRead>(
    writer: &mut W,
    input: &mut R,
    ctx: &mut AppContext,
    args: &DeleteArgs,
) -> Result<()> {
    let owner = ctx.owner()?;
    let id = resolve_tracker(&ctx.db, &owner, &args.id)?;
    let tracker = ctx.db.get_tracker(&owner, &id)?;

    if !args.yes {
        write!(writer, "Delete \"{}\"? [y/N] ", tracker.title)?;
        writer.flush()?;
        let answer = read_line(input)?.unwrap_or_default().to_ascii_lowercase();
        if !matches!(answer.as_str(), "y" | "yes") {
            writeln!(writer, "Cancelled.")?;
            return Ok(());
        }
    }

    ctx.db.delete_tracker(&owner, &id)?;
    writeln!(writer, "Deleted tracker {}", short_id(&id))?;
    Ok(())
}
