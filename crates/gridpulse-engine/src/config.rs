//! Configuration file parsing for GridPulse
//!
//! Settings live in `.gridpulse/config.toml` relative to the working
//! directory. Every field has a serde default so a missing or partial file
//! never blocks startup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use gridpulse_core::prelude::*;

const CONFIG_FILENAME: &str = "config.toml";
const GRIDPULSE_DIR: &str = ".gridpulse";

/// Application settings (`.gridpulse/config.toml`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub refresh: RefreshSettings,

    #[serde(default)]
    pub highlight: HighlightSettings,

    #[serde(default)]
    pub table: TableSettings,

    #[serde(default)]
    pub notifications: NotificationSettings,
}

/// Auto-refresh and force-refresh behavior
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RefreshSettings {
    /// Auto-refresh tick interval in milliseconds
    #[serde(default = "default_auto_interval_ms")]
    pub auto_interval_ms: u64,

    /// Deliberate delay before a force refresh fetches (UX pacing, 0 disables)
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            auto_interval_ms: default_auto_interval_ms(),
            pacing_ms: default_pacing_ms(),
        }
    }
}

/// Persistent-highlight behavior
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HighlightSettings {
    /// Marker re-application cadence in milliseconds
    #[serde(default = "default_reapply_ms")]
    pub reapply_ms: u64,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            reapply_ms: default_reapply_ms(),
        }
    }
}

/// Grid view defaults
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TableSettings {
    #[serde(default = "default_table_page_size")]
    pub page_size: usize,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            page_size: default_table_page_size(),
        }
    }
}

/// Notification sidebar defaults
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NotificationSettings {
    #[serde(default = "default_notification_page_size")]
    pub page_size: usize,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            page_size: default_notification_page_size(),
        }
    }
}

fn default_auto_interval_ms() -> u64 {
    2000
}

fn default_pacing_ms() -> u64 {
    300
}

fn default_reapply_ms() -> u64 {
    200
}

fn default_table_page_size() -> usize {
    20
}

fn default_notification_page_size() -> usize {
    5
}

// ─────────────────────────────────────────────────────────────────────────────
// Loading
// ─────────────────────────────────────────────────────────────────────────────

/// Path of the config file under a project directory.
pub fn config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(GRIDPULSE_DIR).join(CONFIG_FILENAME)
}

/// Load settings from `<project_dir>/.gridpulse/config.toml`.
///
/// A missing file yields defaults; a malformed file is an error so typos do
/// not silently revert behavior to defaults.
pub fn load_settings(project_dir: &Path) -> Result<Settings> {
    let path = config_path(project_dir);
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Settings::default());
    }

    let raw = std::fs::read_to_string(&path)?;
    let settings: Settings = toml::from_str(&raw)
        .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;
    info!(path = %path.display(), "settings loaded");
    Ok(settings)
}

/// Load settings from the current working directory.
pub fn load_default_settings() -> Result<Settings> {
    let cwd = std::env::current_dir()?;
    load_settings(&cwd)
}
