//! Add command: create a tracker.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use clap::Args;
use ct_core::{NewTracker, TrackerStatus};

use crate::commands::util::parse_target;
use crate::context::AppContext;
use crate::render::{short_id, write_card};

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Tracker title.
    pub title: String,

    /// When the countdown ends: RFC 3339, "YYYY-MM-DD HH:MM" local time, or "in 2 hours".
    #[arg(short, long)]
    pub target: String,

    /// Optional notes shown on the card.
    #[arg(short, long)]
    pub description: Option<String>,

    /// Initial status: progress, not-started, or available.
    #[arg(short, long, default_value = "progress")]
    pub status: TrackerStatus,
}

pub fn run<W: Write>(
    writer: &mut W,
    ctx: &mut AppContext,
    args: &AddArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let owner = ctx.owner()?;
    let target = parse_target(&args.target, now)?;
    let new = NewTracker::new(&args.title, args.description.as_deref(), target, args.status)?;
    let tracker = ctx.db.create_tracker(&owner, new, now)?;

    writeln!(writer, "Created tracker {}", short_id(&tracker.id))?;
    write_card(writer, &tracker, now, &Local, &ctx.palette())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;

    use crate::context::NOT_SIGNED_IN;
    use crate::context::tests::{empty_context, now, signed_in_context};

    fn args(title: &str, target: &str) -> AddArgs {
        AddArgs {
            title: title.to_string(),
            target: target.to_string(),
            description: Some("  ".to_string()),
            status: TrackerStatus::Progress,
        }
    }

    #[test]
    fn creates_tracker_for_signed_in_owner() {
        let temp = tempfile::tempdir().unwrap();
        let mut ctx = signed_in_context(&temp);
        let mut output = Vec::new();

        run(&mut output, &mut ctx, &args("  Rent ", "in 2 hours"), now()).unwrap();

        let owner = ctx.owner().unwrap();
        let trackers = ctx.db.list_trackers(&owner).unwrap();
        assert_eq!(trackers.len(), 1);
        let tracker = &trackers[0];
        assert_eq!(tracker.title, "Rent");
        assert_eq!(tracker.description, None);
        assert_eq!(tracker.created_at, now());
        assert_eq!(tracker.target_timestamp, now() + Duration::hours(2));
        assert!(!tracker.pause.is_paused());

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with(&format!("Created tracker {}", short_id(&tracker.id))));
        assert!(output.contains("[Progress] Rent"));
        assert!(output.contains("02:00:00"));
    }

    #[test]
    fn rejects_blank_title() {
        let temp = tempfile::tempdir().unwrap();
        let mut ctx = signed_in_context(&temp);
        let err = run(&mut Vec::new(), &mut ctx, &args("   ", "in 1 hour"), now()).unwrap_err();
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn rejects_bad_target() {
        let temp = tempfile::tempdir().unwrap();
        let mut ctx = signed_in_context(&temp);
        let err = run(&mut Vec::new(), &mut ctx, &args("Rent", "whenever"), now()).unwrap_err();
        assert!(err.to_string().starts_with("Invalid target"));
    }

    #[test]
    fn requires_session() {
        let temp = tempfile::tempdir().unwrap();
        let mut ctx = empty_context(&temp);
        let err = run(&mut Vec::new(), &mut ctx, &args("Rent", "in 1 hour"), now()).unwrap_err();
        assert_eq!(err.to_string(), NOT_SIGNED_IN);
    }
}
