//! Countdown trackers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    OwnerId, TrackerId, TrackerStatus, ValidationError, normalize_description, validate_title,
};

/// Whether a tracker's countdown is running or frozen.
///
/// Persisted as a `paused` flag plus `paused_at`; the enum makes the
/// "paused implies a pause timestamp" rule unrepresentable to break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "PauseFields", into = "PauseFields")]
pub enum PauseState {
    #[default]
    Running,
    Paused {
        at: DateTime<Utc>,
    },
}

impl PauseState {
    /// Rebuilds the state from its stored columns.
    pub fn from_parts(
        paused: bool,
        paused_at: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        match (paused, paused_at) {
            (false, _) => Ok(Self::Running),
            (true, Some(at)) => Ok(Self::Paused { at }),
            (true, None) => Err(ValidationError::PausedWithoutTimestamp),
        }
    }

    pub const fn is_paused(&self) -> bool {
        matches!(self, Self::Paused { .. })
    }

    /// When the countdown was frozen, if it is.
    pub const fn paused_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Running => None,
            Self::Paused { at } => Some(*at),
        }
    }
}

/// Wire shape of [`PauseState`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PauseFields {
    #[serde(default)]
    paused: bool,
    #[serde(default)]
    paused_at: Option<DateTime<Utc>>,
}

impl TryFrom<PauseFields> for PauseState {
    type Error = ValidationError;

    fn try_from(fields: PauseFields) -> Result<Self, Self::Error> {
        Self::from_parts(fields.paused, fields.paused_at)
    }
}

impl From<PauseState> for PauseFields {
    fn from(state: PauseState) -> Self {
        Self {
            paused: state.is_paused(),
            paused_at: state.paused_at(),
        }
    }
}

/// A countdown toward a target instant, owned by one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracker {
    /// Store-assigned identifier.
    pub id: TrackerId,

    /// The account that created the tracker.
    pub owner_id: OwnerId,

    /// Non-empty display title.
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Start of the countdown. Set once at creation.
    pub created_at: DateTime<Utc>,

    /// Instant the countdown runs toward. Shifted forward on resume.
    pub target_timestamp: DateTime<Utc>,

    pub status: TrackerStatus,

    #[serde(flatten)]
    pub pause: PauseState,

    /// Milliseconds elapsed up to the first pause.
    ///
    /// Written when pausing but not consumed by the countdown display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accumulated_time_ms: Option<i64>,
}

impl Tracker {
    /// Template for a new tracker carrying this one's editable fields.
    pub fn duplicate(&self) -> NewTracker {
        NewTracker {
            title: self.title.clone(),
            description: self.description.clone(),
            target_timestamp: self.target_timestamp,
            status: self.status,
        }
    }
}

/// Fields supplied by the author when creating a tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTracker {
    pub title: String,
    pub description: Option<String>,
    pub target_timestamp: DateTime<Utc>,
    pub status: TrackerStatus,
}

impl NewTracker {
    /// Validates form input: the title is trimmed and required, a blank
    /// description is dropped.
    pub fn new(
        title: &str,
        description: Option<&str>,
        target_timestamp: DateTime<Utc>,
        status: TrackerStatus,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            title: validate_title(title)?,
            description: normalize_description(description),
            target_timestamp,
            status,
        })
    }

    /// Materializes the tracker with store-assigned identity.
    pub fn into_tracker(self, id: TrackerId, owner_id: OwnerId, created_at: DateTime<Utc>) -> Tracker {
        Tracker {
            id,
            owner_id,
            title: self.title,
            description: self.description,
            created_at,
            target_timestamp: self.target_timestamp,
            status: self.status,
            pause: PauseState::Running,
            accumulated_time_ms: None,
        }
    }
}

/// A partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerPatch {
    pub title: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub target_timestamp: Option<DateTime<Utc>>,
    pub status: Option<TrackerStatus>,
    pub pause: Option<PauseState>,
    pub accumulated_time_ms: Option<i64>,
}

impl TrackerPatch {
    /// Sets a validated title.
    pub fn title(mut self, title: &str) -> Result<Self, ValidationError> {
        self.title = Some(validate_title(title)?);
        Ok(self)
    }

    /// Sets or clears the description; blank text clears it.
    #[must_use]
    pub fn description(mut self, description: Option<&str>) -> Self {
        self.description = Some(normalize_description(description));
        self
    }

    #[must_use]
    pub fn target_timestamp(mut self, target: DateTime<Utc>) -> Self {
        self.target_timestamp = Some(target);
        self
    }

    #[must_use]
    pub fn status(mut self, status: TrackerStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.target_timestamp.is_none()
            && self.status.is_none()
            && self.pause.is_none()
            && self.accumulated_time_ms.is_none()
    }

    /// Applies the patch in place. Identity and `created_at` never change.
    pub fn apply(&self, tracker: &mut Tracker) {
        if let Some(title) = &self.title {
            tracker.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            tracker.description.clone_from(description);
        }
        if let Some(target) = self.target_timestamp {
            tracker.target_timestamp = target;
        }
        if let Some(status) = self.status {
            tracker.status = status;
        }
        if let Some(pause) = self.pause {
            tracker.pause = pause;
        }
        if let Some(accumulated) = self.accumulated_time_ms {
            tracker.accumulated_time_ms = Some(accumulated);
        }
    }
}
