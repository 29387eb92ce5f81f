//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::TrackerRef;
use crate::commands::add::AddArgs;
use crate::commands::auth::CredentialsArgs;
use crate::commands::delete::DeleteArgs;
use crate::commands::edit::EditArgs;
use crate::commands::list::ListArgs;
use crate::commands::profile::ProfileArgs;
use crate::commands::show::ShowArgs;
use crate::commands::stats::StatsArgs;
use crate::commands::theme::ThemeArgs;
use crate::commands::watch::WatchArgs;

/// Countdown credit tracker.
///
/// Tracks countdowns toward target instants with pause/resume time
/// accounting, filtering, and due-date statistics.
#[derive(Debug, Parser)]
#[command(name = "ct", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an account and sign in.
    Signup(CredentialsArgs),

    /// Sign in to an existing account.
    Login(CredentialsArgs),

    /// Sign out.
    Logout,

    /// Show or update the signed-in account.
    Profile(ProfileArgs),

    /// Create a tracker.
    Add(AddArgs),

    /// Change a tracker's title, description, target, or status.
    Edit(EditArgs),

    /// Duplicate a tracker as a new one.
    Copy(TrackerRef),

    /// Delete a tracker.
    Delete(DeleteArgs),

    /// Freeze a tracker's countdown.
    Pause(TrackerRef),

    /// Continue a paused countdown, pushing its target back.
    Resume(TrackerRef),

    /// Pause a running tracker or resume a paused one.
    Toggle(TrackerRef),

    /// List trackers with filtering, search, and pagination.
    List(ListArgs),

    /// Show a single tracker.
    Show(ShowArgs),

    /// Show how many trackers fall due when.
    Stats(StatsArgs),

    /// Live view that refreshes every second.
    Watch(WatchArgs),

    /// Show, set, or toggle the colour theme.
    Theme(ThemeArgs),
}
