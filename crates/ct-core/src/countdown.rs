//! Countdown evaluation and pause/resume time accounting.
//!
//! A tracker's display is a pure function of the tracker and a clock
//! reading. While running, the live clock drives the countdown; while
//! paused, the frozen `paused_at` instant does, so the display holds still.
//! Resuming shifts the target forward by the length of the pause, which
//! restores exactly the remaining time the tracker had when it was paused.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::tracker::{PauseState, Tracker, TrackerPatch};
use crate::types::TrackerStatus;

const MS_PER_SECOND: i64 = 1000;
const SECONDS_PER_DAY: i64 = 86_400;

/// Rejected pause/resume transitions.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    #[error("tracker is already paused")]
    AlreadyPaused,
    #[error("tracker is not paused")]
    NotPaused,
    #[error("tracker is already completed")]
    Completed,
}

/// Status as displayed on a tracker card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    NotStarted,
    Progress,
    Completed,
}

impl DisplayStatus {
    /// Badge label; a completed tracker is shown as available.
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::Progress => "Progress",
            Self::Completed => "Available",
        }
    }
}

/// Evaluated display state of a tracker at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Countdown {
    pub display_status: DisplayStatus,
    /// `[Dd ]HH:MM:SS`, `Completed`, or `Not Started`.
    pub text: String,
    /// In `[0, 100]`.
    pub progress_percent: f64,
}

impl Countdown {
    fn completed() -> Self {
        Self {
            display_status: DisplayStatus::Completed,
            text: "Completed".to_string(),
            progress_percent: 100.0,
        }
    }

    fn not_started() -> Self {
        Self {
            display_status: DisplayStatus::NotStarted,
            text: "Not Started".to_string(),
            progress_percent: 0.0,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.display_status == DisplayStatus::Completed
    }
}

/// The clock reading the countdown is computed against: `now` while
/// running, the pause instant while paused.
pub const fn reference_instant(tracker: &Tracker, now: DateTime<Utc>) -> DateTime<Utc> {
    match tracker.pause {
        PauseState::Running => now,
        PauseState::Paused { at } => at,
    }
}

/// Evaluates the card display of `tracker` at `now`.
///
/// Completion wins over everything: an `Available` status, a non-positive
/// remaining time, or a zero-length countdown all display as completed,
/// whether or not the tracker is paused.
#[allow(clippy::cast_precision_loss)]
pub fn evaluate(tracker: &Tracker, now: DateTime<Utc>) -> Countdown {
    let reference = reference_instant(tracker, now);
    let total_ms = (tracker.target_timestamp - tracker.created_at).num_milliseconds();
    let elapsed_ms = (reference - tracker.created_at).num_milliseconds();
    let remaining_ms = (tracker.target_timestamp - reference).num_milliseconds();

    if tracker.status == TrackerStatus::Available || remaining_ms <= 0 || total_ms <= 0 {
        return Countdown::completed();
    }
    if tracker.status == TrackerStatus::NotStarted {
        return Countdown::not_started();
    }

    let percent = (elapsed_ms as f64 / total_ms as f64) * 100.0;
    Countdown {
        display_status: DisplayStatus::Progress,
        text: format_remaining(remaining_ms),
        progress_percent: percent.clamp(0.0, 100.0),
    }
}

/// Renders a remaining duration as `[Dd ]HH:MM:SS`, truncated to the second.
///
/// The day segment is omitted when zero. Negative input renders as zero.
pub fn format_remaining(remaining_ms: i64) -> String {
    let total_secs = remaining_ms.max(0) / MS_PER_SECOND;
    let days = total_secs / SECONDS_PER_DAY;
    let hours = (total_secs % SECONDS_PER_DAY) / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if days > 0 {
        format!("{days}d {hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

/// Freezes the countdown at `now`.
///
/// Seeds `accumulated_time_ms` with the elapsed time only if it has never
/// been set.
pub fn pause(tracker: &Tracker, now: DateTime<Utc>) -> Result<TrackerPatch, TransitionError> {
    if tracker.pause.is_paused() {
        return Err(TransitionError::AlreadyPaused);
    }
    if evaluate(tracker, now).is_completed() {
        return Err(TransitionError::Completed);
    }

    let accumulated = tracker
        .accumulated_time_ms
        .unwrap_or_else(|| (now - tracker.created_at).num_milliseconds());

    Ok(TrackerPatch {
        pause: Some(PauseState::Paused { at: now }),
        accumulated_time_ms: Some(accumulated),
        ..TrackerPatch::default()
    })
}

/// Restarts the countdown at `now`, moving the target forward by the time
/// spent paused.
///
/// A clock reading earlier than the pause instant counts as a zero-length
/// pause so the target never moves backward.
pub fn resume(tracker: &Tracker, now: DateTime<Utc>) -> Result<TrackerPatch, TransitionError> {
    let PauseState::Paused { at: paused_at } = tracker.pause else {
        return Err(TransitionError::NotPaused);
    };

    let pause_duration = (now - paused_at).max(Duration::zero());

    Ok(TrackerPatch {
        pause: Some(PauseState::Running),
        target_timestamp: Some(tracker.target_timestamp + pause_duration),
        ..TrackerPatch::default()
    })
}

/// Pauses a running tracker or resumes a paused one.
pub fn toggle(tracker: &Tracker, now: DateTime<Utc>) -> Result<TrackerPatch, TransitionError> {
    if tracker.pause.is_paused() {
        resume(tracker, now)
    } else {
        pause(tracker, now)
    }
}
