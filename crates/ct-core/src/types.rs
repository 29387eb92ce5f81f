//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Unknown tracker status string.
    #[error("invalid status: {value} (expected one of: not-started, progress, available)")]
    InvalidStatus { value: String },

    /// Unknown list filter tab.
    #[error("invalid filter tab: {value} (expected one of: all, progress, available)")]
    InvalidTab { value: String },

    /// Unknown theme name.
    #[error("invalid theme: {value} (expected light or dark)")]
    InvalidTheme { value: String },

    /// A paused tracker must record when it was paused.
    #[error("tracker is marked paused but has no pause timestamp")]
    PausedWithoutTimestamp,
}

/// Author-set status of a tracker.
///
/// `Available` forces the completed display regardless of time. The stored
/// strings match the labels shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TrackerStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[default]
    Progress,
    Available,
}

impl TrackerStatus {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::Progress => "Progress",
            Self::Available => "Available",
        }
    }
}

impl fmt::Display for TrackerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TrackerStatus {
    type Err = ValidationError;

    /// Accepts the stored labels as well as kebab/snake case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "notstarted" => Ok(Self::NotStarted),
            "progress" | "inprogress" => Ok(Self::Progress),
            "available" => Ok(Self::Available),
            _ => Err(ValidationError::InvalidStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated tracker identifier.
    ///
    /// Assigned by the store on creation and never changed afterwards.
    TrackerId, "tracker ID"
);

define_string_id!(
    /// A validated account identifier.
    ///
    /// Scopes tracker queries to the signed-in owner.
    OwnerId, "owner ID"
);

/// Trims a title and rejects blank input.
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::Empty { field: "title" });
    }
    Ok(title.to_string())
}

/// Normalizes an optional description: blank text means no description.
pub fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from)
}
