//! CLI subcommand implementations.

use clap::Args;

pub mod add;
pub mod auth;
pub mod copy;
pub mod delete;
pub mod edit;
pub mod list;
pub mod pause;
pub mod profile;
pub mod show;
pub mod stats;
pub mod theme;
pub mod util;
pub mod watch;

/// A single tracker argument.
#[derive(Debug, Args)]
pub struct TrackerRef {
    /// Tracker ID or a unique prefix of at least 4 characters.
    pub id: String,
}
