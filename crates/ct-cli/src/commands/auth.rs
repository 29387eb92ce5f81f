//! Sign-up, sign-in, and sign-out.

use std::io::{BufRead, Write};

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;

use crate::commands::util::password_from;
use crate::context::AppContext;

#[derive(Debug, Args)]
pub struct CredentialsArgs {
    /// Account email.
    pub email: String,

    /// Account password. Read from stdin when omitted.
    #[arg(long, env = "CT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

pub fn signup<W: Write, R: BufRead>(
    writer: &mut W,
    input: &mut R,
    ctx: &mut AppContext,
    args: &CredentialsArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let password = password_from(args.password.as_deref(), input)?;
    let account = ctx.db.sign_up(&args.email, &password, now)?;
    ctx.start_session(&account, now)?;
    writeln!(writer, "Welcome! Signed in as {}", account.email)?;
    Ok(())
}

pub fn login<W: Write, R: BufRead>(
    writer: &mut W,
    input: &mut R,
    ctx: &mut AppContext,
    args: &CredentialsArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let password = password_from(args.password.as_deref(), input)?;
    let account = ctx.db.sign_in(&args.email, &password)?;
    let session = ctx.start_session(&account, now)?;
    writeln!(writer, "Signed in as {}", session.label())?;
    Ok(())
}

pub fn logout<W: Write>(writer: &mut W, ctx: &mut AppContext) -> Result<()> {
    if ctx.end_session()? {
        writeln!(writer, "Signed out.")?;
    } else {
        writeln!(writer, "Not signed in.")?;
    }
    Ok(())
}
