//! TOML-based host configuration.
//!
//! Stores host-level preferences that are not part of the reminder settings:
//! - Storage location override
//! - Reminder sound resource and notification text
//! - Log filter
//!
//! Configuration is stored at `~/.config/postureroom/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::{ConfigError, Result};

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Explicit database path. Defaults to `<data_dir>/postureroom.db`.
    #[serde(default)]
    pub db_path: Option<String>,
}

/// Reminder presentation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_sound")]
    pub sound: String,
    #[serde(default = "default_notification_title")]
    pub notification_title: String,
    #[serde(default = "default_notification_body")]
    pub notification_body: String,
    #[serde(default = "default_notification_timeout_secs")]
    pub notification_timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

/// Host configuration.
///
/// Serialized to/from TOML at `~/.config/postureroom/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub reminder: ReminderConfig,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_sound() -> String {
    "posture-chime".into()
}
fn default_notification_title() -> String {
    "Posture check".into()
}
fn default_notification_body() -> String {
    "Sit up straight, relax your shoulders and look away from the screen.".into()
}
fn default_notification_timeout_secs() -> u64 {
    10
}
fn default_log_filter() -> String {
    "info".into()
}

impl ReminderConfig {
    /// Longest a reminder notification stays open: one day.
    pub const MAX_NOTIFICATION_TIMEOUT_SECS: u64 = 86_400;

    /// Configured timeout, capped at [`Self::MAX_NOTIFICATION_TIMEOUT_SECS`].
    pub fn notification_timeout_secs(&self) -> u64 {
        self.notification_timeout_secs
            .min(Self::MAX_NOTIFICATION_TIMEOUT_SECS)
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            sound: default_sound(),
            notification_title: default_notification_title(),
            notification_body: default_notification_body(),
            notification_timeout_secs: default_notification_timeout_secs(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

/// Read a value from a JSON tree by dot-separated path.
pub(crate) fn get_json_value_by_path<'a>(
    root: &'a serde_json::Value,
    key: &str,
) -> Option<&'a serde_json::Value> {
    if key.is_empty() {
        return None;
    }

    let mut current = root;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

/// Overwrite an existing leaf in a JSON tree, parsing `value` as the leaf's current type.
pub(crate) fn set_json_value_by_path(
    root: &mut serde_json::Value,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    let unknown = || ConfigError::UnknownKey(key.to_string());
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };

    let mut parts = key.split('.').peekable();
    if key.is_empty() {
        return Err(unknown());
    }

    let mut current = root;
    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        current = current.get_mut(part).ok_or_else(unknown)?;
    }

    Err(unknown())
}

impl Config {
    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing defaults if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                ConfigError::LoadFailed {
                    path,
                    message: e.to_string(),
                }
                .into()
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without persisting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        set_json_value_by_path(&mut json, key, value)?;
        let updated: Self = serde_json::from_value(json)?;
        if updated.reminder.notification_timeout_secs > ReminderConfig::MAX_NOTIFICATION_TIMEOUT_SECS
        {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!(
                    "must be at most {} seconds",
                    ReminderConfig::MAX_NOTIFICATION_TIMEOUT_SECS
                ),
            }
            .into());
        }
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and persist. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value)?;
        self.save()
    }

    /// Resolved database path.
    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(data_dir()?.join("postureroom.db")),
        }
    }
}
