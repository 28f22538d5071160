mod defaults;


use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::calendar::CalendarZone;
use crate::error::VitalisError;
use defaults::*;

/// Top-level Vitalis configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub vitalis: VitalisConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub reconcile: ReconcileConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalisConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for VitalisConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Durable storage backend.
///
/// `backend` is one of `json` (one file per key under `path`), `sqlite`
/// (database file at `path`) or `memory` (nothing survives the process).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            path: default_storage_path(),
        }
    }
}

/// Periodic reconciliation while the reminders view is open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    #[serde(default = "default_reconcile_interval")]
    pub interval_secs: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_reconcile_interval(),
        }
    }
}

/// Local notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// `local` (tokio timers in this process) or `none`.
    #[serde(default = "default_notification_backend")]
    pub backend: String,
    /// Body used when a reminder has no description.
    #[serde(default = "default_notification_body")]
    pub default_body: String,
    /// Cancel a reminder's notification when it is completed or deleted.
    #[serde(default = "default_true")]
    pub cancel_on_finish: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            backend: default_notification_backend(),
            default_body: default_notification_body(),
            cancel_on_finish: true,
        }
    }
}

/// Calendar zone for "today" and daily triggers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Fixed offset east of UTC in minutes. Unset = host local time zone.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

impl CalendarConfig {
    pub fn zone(&self) -> Result<CalendarZone, VitalisError> {
        CalendarZone::from_offset_minutes(self.utc_offset_minutes)
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, VitalisError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| VitalisError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| VitalisError::Config(format!("failed to parse config: {}", e)))?;

    if config.reconcile.interval_secs == 0 {
        return Err(VitalisError::Config(
            "reconcile.interval_secs must be greater than zero".to_string(),
        ));
    }
    config.calendar.zone()?;

    Ok(config)
}
