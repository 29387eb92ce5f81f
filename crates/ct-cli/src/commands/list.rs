//! List command: the filtered, searched, paginated tracker view.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use clap::Args;
use ct_core::listing::is_available_at;
use ct_core::{Countdown, FilterTab, ListState, Tracker, evaluate};
use serde::Serialize;

use crate::context::AppContext;
use crate::render::write_list;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Filter tab: all, progress, or available.
    #[arg(long, default_value = "all")]
    pub tab: FilterTab,

    /// Case-insensitive search over titles.
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Number of extra pages to reveal.
    #[arg(long, default_value_t = 0)]
    pub more: usize,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// A tracker with its evaluated display state.
#[derive(Debug, Serialize)]
pub struct TrackerEntry<'a> {
    #[serde(flatten)]
    pub tracker: &'a Tracker,
    pub countdown: Countdown,
    /// Time-derived availability used by the list filter.
    pub available: bool,
}

impl<'a> TrackerEntry<'a> {
    pub fn new(tracker: &'a Tracker, now: DateTime<Utc>) -> Self {
        Self {
            tracker,
            countdown: evaluate(tracker, now),
            available: is_available_at(tracker, now),
        }
    }
}

#[derive(Debug, Serialize)]
struct ListOutput<'a> {
    tab: FilterTab,
    search: &'a str,
    total: usize,
    shown: usize,
    has_more: bool,
    trackers: Vec<TrackerEntry<'a>>,
}

/// List state after applying the filters and `more` "load more" presses.
pub fn list_state(page_size: usize, tab: FilterTab, search: &str, more: usize) -> ListState {
    let mut state = ListState::new(page_size);
    state.set_tab(tab);
    state.set_query(search);
    state.load_more_by(more);
    state
}

fn more_hint(args: &ListArgs) -> String {
    let mut hint = String::from("ct list");
    if args.tab != FilterTab::All {
        hint.push_str(&format!(" --tab {}", args.tab));
    }
    if !args.search.is_empty() {
        hint.push_str(&format!(" --search {:?}", args.search));
    }
    hint.push_str(&format!(" --more {}", args.more.saturating_add(1)));
    hint
}

pub fn run<W: Write>(
    writer: &mut W,
    ctx: &AppContext,
    args: &ListArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let owner = ctx.owner()?;
    let trackers = ctx.db.list_trackers(&owner)?;
    let state = list_state(ctx.config.page_size, args.tab, &args.search, args.more);
    let view = state.view(&trackers, now);

    if args.json {
        let output = ListOutput {
            tab: state.tab(),
            search: state.query(),
            total: view.total,
            shown: view.items.len(),
            has_more: view.has_more(),
            trackers: view
                .items
                .iter()
                .map(|tracker| TrackerEntry::new(tracker, now))
                .collect(),
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    } else {
        let hint = more_hint(args);
        write_list(writer, &state, &view, now, &Local, &ctx.palette(), Some(&hint))?;
    }
    Ok(())
}
