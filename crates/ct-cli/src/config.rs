//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use ct_core::PAGE_SIZE;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Directory holding the persisted session and preferences.
    pub state_dir: PathBuf,

    /// Trackers revealed per list page.
    pub page_size: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("state_dir", &self.state_dir)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        let state_dir = dirs_state_path().unwrap_or_else(|| data_dir.clone());
        Self {
            database_path: data_dir.join("ct.db"),
            state_dir,
            page_size: PAGE_SIZE,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (CT_*)
        figment = figment.merge(
            Env::prefixed("CT_").only(&["database_path", "state_dir", "page_size"]),
        );

        figment.extract()
    }

    /// Path to the persisted sign-in session.
    pub fn session_path(&self) -> PathBuf {
        self.state_dir.join("session.json")
    }

    /// Path to the persisted client preferences.
    pub fn preferences_path(&self) -> PathBuf {
        self.state_dir.join("preferences.json")
    }
}

/// Returns the platform-specific config directory for ct.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("credit-tracker"))
}

/// Returns the platform-specific data directory for ct.
///
/// On Linux: `~/.local/share/credit-tracker`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("credit-tracker"))
}

/// Returns the platform-specific state directory for ct.
///
/// On Linux: `~/.local/state/credit-tracker`. Not every platform has one.
pub fn dirs_state_path() -> Option<PathBuf> {
    dirs::state_dir().map(|p| p.join("credit-tracker"))
}
