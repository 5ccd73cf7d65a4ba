//! Durable local storage for reminder settings and runtime state.
//!
//! Records are JSON documents stored under fixed keys. Reads never fail from
//! the caller's point of view: a missing, unreadable or corrupt record yields
//! the type's default. Writes go through immediately on every mutation.

mod config;
pub mod database;
mod memory;

pub use config::{Config, LogConfig, ReminderConfig, StorageConfig};
pub(crate) use config::{get_json_value_by_path, set_json_value_by_path};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, StorageError};

/// Key of the persisted [`Settings`](crate::reminder::Settings) record.
pub const SETTINGS_KEY: &str = "postureSettings";
/// Key of the persisted [`RuntimeState`](crate::reminder::RuntimeState) record.
pub const STATE_KEY: &str = "postureState";

/// Returns `~/.config/postureroom[-dev]/` based on POSTUREROOM_ENV.
///
/// Set POSTUREROOM_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POSTUREROOM_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("postureroom-dev")
    } else {
        base_dir.join("postureroom")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Raw string key/value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// JSON persistence adapter over a [`KeyValueStore`].
pub struct JsonStore<S> {
    inner: S,
}

impl<S: KeyValueStore> JsonStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Load the record under `key`, or `T::default()` if it is absent or unusable.
    pub fn load<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let raw = match self.inner.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "no persisted record, using defaults");
                return T::default();
            }
            Err(e) => {
                warn!(key, error = %e, "failed to read persisted record, using defaults");
                return T::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "corrupt persisted record, using defaults");
                T::default()
            }
        }
    }

    /// Serialize `value` and write it under `key`.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.inner.set(key, &json)?;
        Ok(())
    }
}
