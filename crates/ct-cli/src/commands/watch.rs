//! Watch command: a live, self-refreshing list.
//!
//! Runs on a current-thread tokio runtime. Each second the list is
//! re-evaluated against the clock, and writes made by other `ct` processes
//! are picked up through the database's live subscriptions.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::Args;
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use ct_core::{FilterTab, ListState, OwnerId, Tracker};
use tokio::time::{self, MissedTickBehavior};

use crate::commands::list::list_state;
use crate::context::AppContext;
use crate::render::{Palette, write_list};

const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Filter tab: all, progress, or available.
    #[arg(long, default_value = "all")]
    pub tab: FilterTab,

    /// Case-insensitive search over titles.
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Number of extra pages to reveal.
    #[arg(long, default_value_t = 0)]
    pub more: usize,

    /// Stop after this many refreshes instead of waiting for Ctrl-C.
    #[arg(long)]
    pub ticks: Option<u64>,
}

/// Runs the live view until Ctrl-C or the tick limit.
///
/// With `clear_screen` each frame replaces the previous one; otherwise
/// frames are appended.
pub fn run<W: Write>(
    writer: &mut W,
    ctx: &mut AppContext,
    args: &WatchArgs,
    clear_screen: bool,
) -> Result<()> {
    let owner = ctx.owner()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(watch(writer, ctx, &owner, args, clear_screen))
}

async fn watch<W: Write>(
    writer: &mut W,
    ctx: &mut AppContext,
    owner: &OwnerId,
    args: &WatchArgs,
    clear_screen: bool,
) -> Result<()> {
    let mut subscription = ctx.db.subscribe(owner)?;
    let state = list_state(ctx.config.page_size, args.tab, &args.search, args.more);
    let palette = ctx.palette();

    let mut interval = time::interval(REFRESH_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut frames = 0_u64;
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            result = &mut shutdown => {
                result.context("failed to listen for Ctrl-C")?;
                tracing::debug!("watch interrupted");
                break;
            }
        }

        ctx.db.refresh_subscriptions()?;
        if subscription.poll() {
            tracing::debug!(trackers = subscription.current().len(), "snapshot received");
        }
        render_frame(
            writer,
            &state,
            subscription.current(),
            Utc::now(),
            &palette,
            clear_screen,
        )?;

        frames += 1;
        if args.ticks.is_some_and(|limit| frames >= limit) {
            break;
        }
    }

    subscription.unsubscribe();
    Ok(())
}

fn render_frame<W: Write>(
    writer: &mut W,
    state: &ListState,
    trackers: &[Tracker],
    now: DateTime<Utc>,
    palette: &Palette,
    clear_screen: bool,
) -> Result<()> {
    if clear_screen {
        queue!(writer, Clear(ClearType::All), MoveTo(0, 0))?;
    }
    let clock = now.with_timezone(&Local).format("%H:%M:%S");
    writeln!(
        writer,
        "{}",
        palette.muted(&format!("Live at {clock}. Press Ctrl-C to quit."))
    )?;
    let view = state.view(trackers, now);
    write_list(writer, state, &view, now, &Local, palette, None)?;
    if !clear_screen {
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration as ChronoDuration;
    use ct_core::{NewTracker, TrackerStatus};

    use crate::context::tests::signed_in_context;

    fn watch_args(ticks: u64) -> WatchArgs {
        WatchArgs {
            tab: FilterTab::All,
            search: String::new(),
            more: 0,
            ticks: Some(ticks),
        }
    }

    #[test]
    fn single_frame_of_empty_list() {
        let temp = tempfile::tempdir().unwrap();
        let mut ctx = signed_in_context(&temp);

        let mut output = Vec::new();
        run(&mut output, &mut ctx, &watch_args(1), false).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output.starts_with("Live at "));
        assert!(output.contains("[All]  Progress  Available\n\nNo trackers found.\n"));
    }

    #[test]
    fn frames_show_current_trackers() {
        let temp = tempfile::tempdir().unwrap();
        let mut ctx = signed_in_context(&temp);
        let owner = ctx.owner().unwrap();
        let now = Utc::now();
        let new = NewTracker::new(
            "Rent",
            None,
            now + ChronoDuration::hours(2),
            TrackerStatus::Progress,
        )
        .unwrap();
        ctx.db.create_tracker(&owner, new, now).unwrap();

        let mut output = Vec::new();
        run(&mut output, &mut ctx, &watch_args(2), false).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert_eq!(output.matches("Live at ").count(), 2);
        assert_eq!(output.matches("[Progress] Rent").count(), 2);
    }

    #[test]
    fn clear_screen_emits_escape_codes() {
        let mut output = Vec::new();
        let state = ListState::default();
        render_frame(&mut output, &state, &[], Utc::now(), &Palette::plain(), true).unwrap();
        assert!(output.starts_with(b"\x1b["));
    }
}
