//! Storage layer for the credit tracker.
//!
//! Provides persistence for accounts and trackers using `rusqlite`, plus live
//! snapshot subscriptions over each owner's trackers.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 UTC with millisecond precision
//! (e.g., `2024-01-15T10:30:00.000Z`). The fixed width keeps lexicographic
//! ordering equal to chronological ordering.
//!
//! ## Pause State
//!
//! `paused` is an INTEGER flag and `paused_at` the instant the countdown was
//! frozen. A row with `paused = 1` and no `paused_at` is rejected on read.

mod accounts;
mod live;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use ct_core::{NewTracker, OwnerId, PauseState, Tracker, TrackerId, TrackerPatch, TrackerStatus};
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;
use uuid::Uuid;

pub use accounts::{Account, AuthError, MIN_PASSWORD_LEN};
pub use live::{Snapshot, Subscription};

use live::SnapshotHub;

/// How long a write waits on another process holding the database lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const TRACKER_COLUMNS: &str = "id, owner_id, title, description, created_at, target_timestamp, \
                               status, paused, paused_at, accumulated_time_ms";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for {record}: {timestamp}")]
    TimestampParse {
        record: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row violates a domain rule.
    #[error("invalid record {record}: {message}")]
    InvalidRecord { record: String, message: String },
    /// No tracker with this ID belongs to the owner.
    #[error("tracker not found: {0}")]
    TrackerNotFound(String),
    /// An abbreviated ID matched more than one tracker.
    #[error("tracker ID prefix {prefix} is ambiguous ({matches} matches)")]
    AmbiguousId { prefix: String, matches: usize },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
    hub: SnapshotHub,
    data_version: i64,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Self::from_connection(conn)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, DbError> {
        let mut db = Self {
            conn,
            hub: SnapshotHub::default(),
            data_version: 0,
        };
        db.init()?;
        db.data_version = db.read_data_version()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                display_name TEXT,
                created_at TEXT NOT NULL
            );

            -- Trackers: countdowns scoped by owner_id
            -- status: 'Not Started' | 'Progress' | 'Available'
            -- paused_at: set iff paused = 1
            CREATE TABLE IF NOT EXISTS trackers (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL,
                target_timestamp TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'Progress',
                paused INTEGER NOT NULL DEFAULT 0,
                paused_at TEXT,
                accumulated_time_ms INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_trackers_owner_target
                ON trackers(owner_id, target_timestamp);
            ",
        )?;
        Ok(())
    }

    fn read_data_version(&self) -> Result<i64, DbError> {
        Ok(self
            .conn
            .query_row("PRAGMA data_version", [], |row| row.get(0))?)
    }

    /// Creates a tracker for `owner`, assigning a fresh ID.
    pub fn create_tracker(
        &mut self,
        owner: &OwnerId,
        new: NewTracker,
        created_at: DateTime<Utc>,
    ) -> Result<Tracker, DbError> {
        let id = TrackerId::new(Uuid::new_v4().to_string()).map_err(|e| invalid("new tracker", &e))?;
        let tracker = new.into_tracker(id, owner.clone(), created_at);
        self.conn.execute(
            "
            INSERT INTO trackers
            (id, owner_id, title, description, created_at, target_timestamp, status, paused, paused_at, accumulated_time_ms)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                tracker.id.as_str(),
                tracker.owner_id.as_str(),
                tracker.title,
                tracker.description,
                format_timestamp(tracker.created_at),
                format_timestamp(tracker.target_timestamp),
                tracker.status.as_str(),
                tracker.pause.is_paused(),
                tracker.pause.paused_at().map(format_timestamp),
                tracker.accumulated_time_ms,
            ],
        )?;
        tracing::debug!(tracker = %tracker.id, owner = %owner, "tracker created");
        self.publish(owner)?;
        Ok(tracker)
    }

    /// Lists the owner's trackers ordered by creation time then ID.
    pub fn list_trackers(&self, owner: &OwnerId) -> Result<Vec<Tracker>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRACKER_COLUMNS} FROM trackers WHERE owner_id = ? ORDER BY created_at ASC, id ASC"
        ))?;
        let rows = stmt.query_map([owner.as_str()], TrackerRow::from_row)?;
        let mut trackers = Vec::new();
        for row in rows {
            trackers.push(row?.into_tracker()?);
        }
        Ok(trackers)
    }

    /// Fetches one of the owner's trackers.
    pub fn get_tracker(&self, owner: &OwnerId, id: &TrackerId) -> Result<Tracker, DbError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {TRACKER_COLUMNS} FROM trackers WHERE owner_id = ? AND id = ?"),
                [owner.as_str(), id.as_str()],
                TrackerRow::from_row,
            )
            .optional()?;
        row.ok_or_else(|| DbError::TrackerNotFound(id.to_string()))?
            .into_tracker()
    }

    /// Resolves a full or abbreviated tracker ID among the owner's trackers.
    ///
    /// An exact match always wins over prefix matches.
    pub fn resolve_tracker_id(&self, owner: &OwnerId, prefix: &str) -> Result<TrackerId, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id FROM trackers
            WHERE owner_id = ? AND substr(id, 1, length(?)) = ?
            ORDER BY id ASC
            ",
        )?;
        let rows = stmt.query_map(params![owner.as_str(), prefix, prefix], |row| {
            row.get::<_, String>(0)
        })?;
        let mut matches = Vec::new();
        for row in rows {
            matches.push(row?);
        }

        let id = if matches.iter().any(|id| id == prefix) {
            prefix.to_string()
        } else {
            match matches.len() {
                0 => return Err(DbError::TrackerNotFound(prefix.to_string())),
                1 => matches.remove(0),
                n => {
                    return Err(DbError::AmbiguousId {
                        prefix: prefix.to_string(),
                        matches: n,
                    });
                }
            }
        };
        TrackerId::new(id).map_err(|e| invalid(prefix, &e))
    }

    /// Applies a partial update and returns the updated tracker.
    ///
    /// An empty patch is a no-op and publishes nothing.
    pub fn update_tracker(
        &mut self,
        owner: &OwnerId,
        id: &TrackerId,
        patch: &TrackerPatch,
    ) -> Result<Tracker, DbError> {
        let mut tracker = self.get_tracker(owner, id)?;
        if patch.is_empty() {
            return Ok(tracker);
        }
        patch.apply(&mut tracker);

        self.conn.execute(
            "
            UPDATE trackers SET
                title = ?,
                description = ?,
                target_timestamp = ?,
                status = ?,
                paused = ?,
                paused_at = ?,
                accumulated_time_ms = ?
            WHERE owner_id = ? AND id = ?
            ",
            params![
                tracker.title,
                tracker.description,
                format_timestamp(tracker.target_timestamp),
                tracker.status.as_str(),
                tracker.pause.is_paused(),
                tracker.pause.paused_at().map(format_timestamp),
                tracker.accumulated_time_ms,
                owner.as_str(),
                id.as_str(),
            ],
        )?;
        tracing::debug!(tracker = %id, ?patch, "tracker updated");
        self.publish(owner)?;
        Ok(tracker)
    }

    /// Deletes one of the owner's trackers.
    pub fn delete_tracker(&mut self, owner: &OwnerId, id: &TrackerId) -> Result<(), DbError> {
        let deleted = self.conn.execute(
            "DELETE FROM trackers WHERE owner_id = ? AND id = ?",
            [owner.as_str(), id.as_str()],
        )?;
        if deleted == 0 {
            return Err(DbError::TrackerNotFound(id.to_string()));
        }
        tracing::debug!(tracker = %id, "tracker deleted");
        self.publish(owner)?;
        Ok(())
    }

    /// Subscribes to the owner's trackers.
    ///
    /// The subscription starts with the current snapshot and receives a new
    /// one after every write made through this `Database`, and after
    /// [`Database::refresh_subscriptions`] observes writes from other
    /// connections.
    pub fn subscribe(&self, owner: &OwnerId) -> Result<Subscription, DbError> {
        let initial: Snapshot = Arc::from(self.list_trackers(owner)?);
        Ok(self.hub.register(owner.clone(), initial))
    }

    /// Republishes snapshots if another connection has committed since the
    /// last check. Returns whether anything was published.
    pub fn refresh_subscriptions(&mut self) -> Result<bool, DbError> {
        let version = self.read_data_version()?;
        if version == self.data_version {
            return Ok(false);
        }
        self.data_version = version;
        tracing::debug!(version, "external change detected");
        for owner in self.hub.owners() {
            self.publish(&owner)?;
        }
        Ok(true)
    }

    fn publish(&self, owner: &OwnerId) -> Result<(), DbError> {
        if !self.hub.has_subscribers(owner) {
            return Ok(());
        }
        let snapshot: Snapshot = Arc::from(self.list_trackers(owner)?);
        let delivered = self.hub.publish(owner, &snapshot);
        tracing::debug!(owner = %owner, delivered, "snapshot published");
        Ok(())
    }
}

/// Raw tracker columns, converted to a [`Tracker`] after the query.
struct TrackerRow {
    id: String,
    owner_id: String,
    title: String,
    description: Option<String>,
    created_at: String,
    target_timestamp: String,
    status: String,
    paused: bool,
    paused_at: Option<String>,
    accumulated_time_ms: Option<i64>,
}

impl TrackerRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            created_at: row.get(4)?,
            target_timestamp: row.get(5)?,
            status: row.get(6)?,
            paused: row.get(7)?,
            paused_at: row.get(8)?,
            accumulated_time_ms: row.get(9)?,
        })
    }

    fn into_tracker(self) -> Result<Tracker, DbError> {
        let record = self.id.clone();
        let paused_at = self
            .paused_at
            .as_deref()
            .map(|ts| parse_timestamp(ts, &record))
            .transpose()?;
        let pause = PauseState::from_parts(self.paused, paused_at).map_err(|e| invalid(&record, &e))?;
        let status = self.status.parse::<TrackerStatus>().map_err(|e| invalid(&record, &e))?;

        Ok(Tracker {
            id: TrackerId::new(self.id).map_err(|e| invalid(&record, &e))?,
            owner_id: OwnerId::new(self.owner_id).map_err(|e| invalid(&record, &e))?,
            title: self.title,
            description: self.description,
            created_at: parse_timestamp(&self.created_at, &record)?,
            target_timestamp: parse_timestamp(&self.target_timestamp, &record)?,
            status,
            pause,
            accumulated_time_ms: self.accumulated_time_ms,
        })
    }
}

fn invalid(record: &str, err: &impl std::fmt::Display) -> DbError {
    DbError::InvalidRecord {
        record: record.to_string(),
        message: err.to_string(),
    }
}

fn parse_timestamp(timestamp: &str, record: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            record: record.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
