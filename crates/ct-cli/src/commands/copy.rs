//! Copy command: duplicate a tracker as a new one.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};

use crate::commands::TrackerRef;
use crate::commands::util::resolve_tracker;
use crate::context::AppContext;
use crate::render::{short_id, write_card};

pub fn run<W: Write>(
    writer: &mut W,
    ctx: &mut AppContext,
    args: &TrackerRef,
    now: DateTime<Utc>,
) -> Result<()> {
    let owner = ctx.owner()?;
    let id = resolve_tracker(&ctx.db, &owner, &args.id)?;
    let source = ctx.db.get_tracker(&owner, &id)?;
    let copy = ctx.db.create_tracker(&owner, source.duplicate(), now)?;

    writeln!(
        writer,
        "Copied {} to new tracker {}",
        short_id(&source.id),
        short_id(&copy.id)
    )?;
    write_card(writer, &copy, now, &Local, &ctx.palette())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use ct_core::countdown::pause;
    use ct_core::{NewTracker, TrackerStatus};

    use crate::context::tests::{now, signed_in_context};

    #[test]
    fn copy_is_fresh_and_unpaused() {
        let temp = tempfile::tempdir().unwrap();
        let mut ctx = signed_in_context(&temp);
        let owner = ctx.owner().unwrap();
        let new = NewTracker::new(
            "Rent",
            Some("monthly"),
            now() + Duration::hours(1),
            TrackerStatus::NotStarted,
        )
        .unwrap();
        let source = ctx.db.create_tracker(&owner, new, now()).unwrap();
        let patch = pause(&source, now()).unwrap();
        ctx.db.update_tracker(&owner, &source.id, &patch).unwrap();

        let later = now() + Duration::minutes(10);
        let args = TrackerRef {
            id: source.id.to_string(),
        };
        run(&mut Vec::new(), &mut ctx, &args, later).unwrap();

        let trackers = ctx.db.list_trackers(&owner).unwrap();
        assert_eq!(trackers.len(), 2);
        let copy = &trackers[1];
        assert_ne!(copy.id, source.id);
        assert_eq!(copy.title, "Rent");
        assert_eq!(copy.description.as_deref(), Some("monthly"));
        assert_eq!(copy.target_timestamp, source.target_timestamp);
        assert_eq!(copy.status, TrackerStatus::NotStarted);
        assert_eq!(copy.created_at, later);
        assert!(!copy.pause.is_paused());
        assert_eq!(copy.accumulated_time_ms, None);
    }
}
