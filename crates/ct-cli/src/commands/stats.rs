//! Stats command: trackers bucketed by how soon they come due.

use std::fmt::Display;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone, Utc};
use clap::Args;
use ct_core::{Distribution, Tracker};
use serde::Serialize;

use crate::context::AppContext;
use crate::render::{Palette, write_stats};

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct StatsOutput<'a> {
    timezone: &'a str,
    today: String,
    total: usize,
    buckets: Distribution,
}

/// Writes the statistics for `trackers` with "today" taken from `now`.
pub fn write_report<W, Tz>(
    writer: &mut W,
    trackers: &[Tracker],
    now: &DateTime<Tz>,
    timezone: &str,
    json: bool,
    palette: &Palette,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let distribution = Distribution::from_trackers(trackers, now);
    if json {
        let output = StatsOutput {
            timezone,
            today: now.date_naive().format("%Y-%m-%d").to_string(),
            total: distribution.total(),
            buckets: distribution,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    } else {
        write_stats(writer, &distribution, timezone, palette)?;
    }
    Ok(())
}

pub fn run<W: Write>(
    writer: &mut W,
    ctx: &AppContext,
    args: &StatsArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let owner = ctx.owner()?;
    let trackers = ctx.db.list_trackers(&owner)?;
    let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "Local".to_string());
    write_report(
        writer,
        &trackers,
        &now.with_timezone(&Local),
        &timezone,
        args.json,
        &ctx.palette(),
    )
}
