use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_AUTOSAVE_INTERVAL_MS: u64 = 30_000;
pub const MIN_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_SAVE_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_USER_ID: &str = "user-1";

/// Editor settings, as found under `editor` in `lectern.config.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    #[serde(default = "default_autosave_interval_ms")]
    pub autosave_interval_ms: u64,

    #[serde(default = "default_true")]
    pub autosave_enabled: bool,

    /// Upper bound for each remote call
    #[serde(default = "default_save_timeout_ms")]
    pub save_timeout_ms: u64,

    /// Recorded as the actor in activity entries
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Undo history depth (0 = unlimited)
    #[serde(default = "default_undo_levels")]
    pub undo_levels: usize,
}

fn default_autosave_interval_ms() -> u64 {
    DEFAULT_AUTOSAVE_INTERVAL_MS
}

fn default_true() -> bool {
    true
}

fn default_save_timeout_ms() -> u64 {
    DEFAULT_SAVE_TIMEOUT_MS
}

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

fn default_undo_levels() -> usize {
    crate::undo_stack::DEFAULT_UNDO_LEVELS
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Configured interval, never shorter than [`MIN_AUTOSAVE_INTERVAL`]
    pub fn autosave_interval(&self) -> Duration {
        Duration::from_millis(self.autosave_interval_ms).max(MIN_AUTOSAVE_INTERVAL)
    }

    pub fn save_timeout(&self) -> Duration {
        Duration::from_millis(self.save_timeout_ms)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_interval_ms: default_autosave_interval_ms(),
            autosave_enabled: true,
            save_timeout_ms: default_save_timeout_ms(),
            user_id: default_user_id(),
            undo_levels: default_undo_levels(),
        }
    }
}
