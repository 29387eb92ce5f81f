//! Client preferences stored in `preferences.json`.

use std::path::Path;

use anyhow::{Context, Result};
use ct_core::Theme;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
}

/// Loads preferences from `path`.
///
/// A missing or unreadable file yields the defaults; an unreadable one is
/// logged and left in place until the next save overwrites it.
pub fn load_from(path: &Path) -> Preferences {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Preferences::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read preferences");
            return Preferences::default();
        }
    };
    serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt preferences");
        Preferences::default()
    })
}

pub fn save_to(path: &Path, preferences: &Preferences) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("failed to create state directory")?;
    }
    let json =
        serde_json::to_string_pretty(preferences).context("failed to serialize preferences")?;
    std::fs::write(path, json).context("failed to write preferences.json")?;
    Ok(())
}
