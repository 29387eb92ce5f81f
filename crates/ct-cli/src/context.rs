//! Per-invocation application context.
//!
//! Bundles the open database, the signed-in session, and the preferences so
//! commands receive them explicitly instead of reading ambient state.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ct_core::{OwnerId, Theme};
use ct_db::{Account, Database};

use crate::Config;
use crate::preferences::{self, Preferences};
use crate::render::Palette;
use crate::session::{self, Session};

/// Message shown when a command needs a signed-in user.
pub const NOT_SIGNED_IN: &str = "Not signed in. Run 'ct login' first.";

pub struct AppContext {
    pub config: Config,
    pub db: Database,
    session: Option<Session>,
    preferences: Preferences,
    color: bool,
}

impl AppContext {
    /// Opens the database and loads persisted client state.
    ///
    /// A session whose account no longer exists is treated as signed out.
    pub fn open(config: Config) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create database directory")?;
        }
        let db = Database::open(&config.database_path)
            .with_context(|| format!("failed to open {}", config.database_path.display()))?;
        Self::with_database(config, db)
    }

    pub fn with_database(config: Config, db: Database) -> Result<Self> {
        let session = match session::load_from(&config.session_path())? {
            Some(session) if db.account(&session.user_id)?.is_some() => Some(session),
            Some(stale) => {
                tracing::warn!(user = %stale.user_id, "ignoring session for missing account");
                None
            }
            None => None,
        };
        let preferences = preferences::load_from(&config.preferences_path());
        Ok(Self {
            config,
            db,
            session,
            preferences,
            color: false,
        })
    }

    /// Enables ANSI styling when stdout supports it.
    #[must_use]
    pub fn with_terminal_colors(mut self) -> Self {
        self.color = crate::render::stdout_supports_color();
        self
    }

    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The signed-in session, or the "not signed in" error.
    pub fn require_session(&self) -> Result<&Session> {
        self.session.as_ref().context(NOT_SIGNED_IN)
    }

    /// ID of the signed-in account.
    pub fn owner(&self) -> Result<OwnerId> {
        Ok(self.require_session()?.user_id.clone())
    }

    /// Persists a session for `account`, replacing any previous one.
    pub fn start_session(&mut self, account: &Account, now: DateTime<Utc>) -> Result<&Session> {
        let session = Session::for_account(account, now);
        session::save_to(&self.config.session_path(), &session)?;
        tracing::debug!(user = %session.user_id, "session started");
        Ok(&*self.session.insert(session))
    }

    /// Refreshes the cached account details in the persisted session.
    pub fn refresh_session(&mut self, account: &Account) -> Result<()> {
        if let Some(session) = &mut self.session {
            session.email.clone_from(&account.email);
            session.display_name.clone_from(&account.display_name);
            session::save_to(&self.config.session_path(), session)?;
        }
        Ok(())
    }

    /// Forgets the session. Returns `false` if nobody was signed in.
    pub fn end_session(&mut self) -> Result<bool> {
        self.session = None;
        session::clear(&self.config.session_path())
    }

    pub const fn theme(&self) -> Theme {
        self.preferences.theme
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.preferences.theme = theme;
        preferences::save_to(&self.config.preferences_path(), &self.preferences)
    }

    pub const fn palette(&self) -> Palette {
        Palette::new(self.preferences.theme, self.color)
    }
}
