//! Persisted sign-in session.
//!
//! The signed-in account is remembered in `session.json` under the state
//! directory. Signing out removes the file.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ct_core::OwnerId;
use ct_db::Account;
use serde::{Deserialize, Serialize};

/// The account a command acts on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: OwnerId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub signed_in_at: DateTime<Utc>,
}

impl Session {
    pub fn for_account(account: &Account, now: DateTime<Utc>) -> Self {
        Self {
            user_id: account.id.clone(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            signed_in_at: now,
        }
    }

    /// Display name when set, otherwise the email.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

/// Loads the session from `path`.
///
/// Returns `None` if the file doesn't exist.
/// Returns an error if the file exists but is unreadable/unparseable.
pub fn load_from(path: &Path) -> Result<Option<Session>> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let session: Session =
                serde_json::from_str(&content).context("failed to parse session.json")?;
            Ok(Some(session))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).context("failed to read session.json"),
    }
}

pub fn save_to(path: &Path, session: &Session) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("failed to create state directory")?;
    }
    let json = serde_json::to_string_pretty(session).context("failed to serialize session")?;
    std::fs::write(path, json).context("failed to write session.json")?;
    Ok(())
}

/// Removes the session file. Returns `false` if there was none.
pub fn clear(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).context("failed to remove session.json"),
    }
}
