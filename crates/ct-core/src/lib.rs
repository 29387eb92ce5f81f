//! Core domain logic for the credit tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Trackers: countdown entities owned by a single account
//! - Countdown: pause/resume time accounting and progress evaluation
//! - Listing: tab filtering, title search, sorting, and pagination
//! - Statistics: target-date distribution buckets

pub mod countdown;
pub mod listing;
pub mod stats;
pub mod theme;
pub mod tracker;
pub mod types;

pub use countdown::{Countdown, DisplayStatus, TransitionError, evaluate};
pub use listing::{FilterTab, ListState, ListView, PAGE_SIZE};
pub use stats::{Bucket, Distribution};
pub use theme::Theme;
pub use tracker::{NewTracker, PauseState, Tracker, TrackerPatch};
pub use types::{OwnerId, TrackerId, TrackerStatus, ValidationError};
