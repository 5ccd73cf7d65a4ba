//! Reminder settings and their partial-update form.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result, ValidationError};
use crate::storage::{get_json_value_by_path, set_json_value_by_path};

/// Long-lived reminder configuration, persisted under `postureSettings`.
///
/// Values are not range-checked when applied; see [`Settings::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub enabled: bool,
    /// Minutes between reminders.
    pub interval: u32,
    pub work_start_hour: u8,
    pub work_end_hour: u8,
    /// Weekdays reminders may fire on, 0 = Sunday.
    pub work_days: BTreeSet<u8>,
    pub sound_enabled: bool,
    pub sound_volume: f32,
    pub notifications_enabled: bool,
    pub auto_pause_in_meetings: bool,
    pub auto_pause_during_focus: bool,
    /// Snooze menu entries in minutes, in display order.
    pub snooze_options: Vec<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: 30,
            work_start_hour: 9,
            work_end_hour: 17,
            work_days: (1..=5).collect(),
            sound_enabled: true,
            sound_volume: 0.5,
            notifications_enabled: true,
            auto_pause_in_meetings: true,
            auto_pause_during_focus: true,
            snooze_options: vec![5, 10, 15, 30],
        }
    }
}

/// A partial [`Settings`] update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_start_hour: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_end_hour: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_days: Option<BTreeSet<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_volume: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_pause_in_meetings: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_pause_during_focus: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snooze_options: Option<Vec<u32>>,
}

impl SettingsPatch {
    pub fn interval(minutes: u32) -> Self {
        Self {
            interval: Some(minutes),
            ..Self::default()
        }
    }

    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Build a single-field patch from a camelCase key and its text value,
    /// parsed according to the field's type in `current`.
    pub fn from_key_value(current: &Settings, key: &str, value: &str) -> Result<Self> {
        let mut json = serde_json::to_value(current)?;
        set_json_value_by_path(&mut json, key, value)?;
        let field = get_json_value_by_path(&json, key)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let mut partial = serde_json::Map::new();
        partial.insert(key.to_string(), field);
        serde_json::from_value(serde_json::Value::Object(partial)).map_err(|e| {
            ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }
}

impl From<Settings> for SettingsPatch {
    fn from(s: Settings) -> Self {
        Self {
            enabled: Some(s.enabled),
            interval: Some(s.interval),
            work_start_hour: Some(s.work_start_hour),
            work_end_hour: Some(s.work_end_hour),
            work_days: Some(s.work_days),
            sound_enabled: Some(s.sound_enabled),
            sound_volume: Some(s.sound_volume),
            notifications_enabled: Some(s.notifications_enabled),
            auto_pause_in_meetings: Some(s.auto_pause_in_meetings),
            auto_pause_during_focus: Some(s.auto_pause_during_focus),
            snooze_options: Some(s.snooze_options),
        }
    }
}

impl Settings {
    /// Shallow-merge `patch` into these settings.
    pub fn apply(&mut self, patch: SettingsPatch) {
        let SettingsPatch {
            enabled,
            interval,
            work_start_hour,
            work_end_hour,
            work_days,
            sound_enabled,
            sound_volume,
            notifications_enabled,
            auto_pause_in_meetings,
            auto_pause_during_focus,
            snooze_options,
        } = patch;

        if let Some(v) = enabled {
            self.enabled = v;
        }
        if let Some(v) = interval {
            self.interval = v;
        }
        if let Some(v) = work_start_hour {
            self.work_start_hour = v;
        }
        if let Some(v) = work_end_hour {
            self.work_end_hour = v;
        }
        if let Some(v) = work_days {
            self.work_days = v;
        }
        if let Some(v) = sound_enabled {
            self.sound_enabled = v;
        }
        if let Some(v) = sound_volume {
            self.sound_volume = v;
        }
        if let Some(v) = notifications_enabled {
            self.notifications_enabled = v;
        }
        if let Some(v) = auto_pause_in_meetings {
            self.auto_pause_in_meetings = v;
        }
        if let Some(v) = auto_pause_during_focus {
            self.auto_pause_during_focus = v;
        }
        if let Some(v) = snooze_options {
            self.snooze_options = v;
        }
    }

    /// Get a value as string by camelCase key.
    pub fn get_value(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match get_json_value_by_path(&json, key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Report the first out-of-range value.
    ///
    /// The scheduler accepts any settings; hosts call this at their input boundary.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let out_of_range = |field: &str, message: &str| ValidationError::OutOfRange {
            field: field.to_string(),
            message: message.to_string(),
        };

        if self.interval == 0 {
            return Err(out_of_range("interval", "must be greater than 0"));
        }
        if self.work_start_hour > 23 {
            return Err(out_of_range("workStartHour", "must be between 0 and 23"));
        }
        if self.work_end_hour > 23 {
            return Err(out_of_range("workEndHour", "must be between 0 and 23"));
        }
        if self.work_days.iter().any(|d| *d > 6) {
            return Err(out_of_range("workDays", "days must be between 0 and 6"));
        }
        if !(0.0..=1.0).contains(&self.sound_volume) {
            return Err(out_of_range("soundVolume", "must be between 0 and 1"));
        }
        if self.snooze_options.iter().any(|m| *m == 0) {
            return Err(out_of_range("snoozeOptions", "entries must be greater than 0"));
        }
        Ok(())
    }
}
