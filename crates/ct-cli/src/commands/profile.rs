//! Profile command: show or update the signed-in account.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use crate::context::{AppContext, NOT_SIGNED_IN};

#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// New display name. An empty value clears it.
    #[arg(long)]
    pub name: Option<String>,

    /// New password.
    #[arg(long)]
    pub password: Option<String>,
}

pub fn run<W: Write>(writer: &mut W, ctx: &mut AppContext, args: &ProfileArgs) -> Result<()> {
    let owner = ctx.owner()?;

    if let Some(name) = &args.name {
        let account = ctx.db.update_display_name(&owner, Some(name))?;
        ctx.refresh_session(&account)?;
        writeln!(writer, "Display name updated.")?;
    }
    if let Some(password) = &args.password {
        ctx.db.update_password(&owner, password)?;
        writeln!(writer, "Password updated.")?;
    }

    let account = ctx.db.account(&owner)?.context(NOT_SIGNED_IN)?;
    writeln!(writer, "Email:        {}", account.email)?;
    writeln!(
        writer,
        "Display name: {}",
        account.display_name.as_deref().unwrap_or("(not set)")
    )?;
    writeln!(
        writer,
        "Member since: {}",
        account.created_at.format("%Y-%m-%d")
    )?;
    Ok(())
}
