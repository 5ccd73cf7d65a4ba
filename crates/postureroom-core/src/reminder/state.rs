//! Runtime state and the settings/state stores.
//!
//! Both stores are write-through: every mutator saves the whole record via
//! the [`JsonStore`] before returning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pain::{window_start, PainLog};
use super::settings::{Settings, SettingsPatch};
use crate::error::Result;
use crate::storage::{JsonStore, KeyValueStore, SETTINGS_KEY, STATE_KEY};

/// Session state, persisted under `postureState`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeState {
    pub is_active: bool,
    pub last_reminder: Option<DateTime<Utc>>,
    pub next_reminder: Option<DateTime<Utc>>,
    pub snooze_until: Option<DateTime<Utc>>,
    pub in_meeting: bool,
    pub in_focus_mode: bool,
    /// Append-only; see [`StateStore::append_pain_log`] and [`StateStore::clear_pain_logs`].
    pub(crate) pain_logs: Vec<PainLog>,
}

impl RuntimeState {
    pub fn pain_logs(&self) -> &[PainLog] {
        &self.pain_logs
    }
}

/// Holds the current [`Settings`].
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    settings: Settings,
}

impl SettingsStore {
    pub fn load<S: KeyValueStore>(storage: &JsonStore<S>) -> Self {
        Self {
            settings: storage.load(SETTINGS_KEY),
        }
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Merge `patch` into the settings and persist.
    pub fn update<S: KeyValueStore>(
        &mut self,
        storage: &JsonStore<S>,
        patch: SettingsPatch,
    ) -> Result<()> {
        self.settings.apply(patch);
        self.save(storage)
    }

    pub fn save<S: KeyValueStore>(&self, storage: &JsonStore<S>) -> Result<()> {
        storage.save(SETTINGS_KEY, &self.settings)
    }
}

/// Holds the current [`RuntimeState`].
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    state: RuntimeState,
}

impl StateStore {
    /// Load persisted state. `is_active` is always reset: reminders never
    /// resume on their own in a new session.
    pub fn load<S: KeyValueStore>(storage: &JsonStore<S>) -> Self {
        let mut state: RuntimeState = storage.load(STATE_KEY);
        state.is_active = false;
        Self { state }
    }

    pub fn get(&self) -> &RuntimeState {
        &self.state
    }

    /// Apply `f` to the state and persist.
    pub fn modify<S: KeyValueStore>(
        &mut self,
        storage: &JsonStore<S>,
        f: impl FnOnce(&mut RuntimeState),
    ) -> Result<()> {
        f(&mut self.state);
        self.save(storage)
    }

    pub fn append_pain_log<S: KeyValueStore>(
        &mut self,
        storage: &JsonStore<S>,
        log: PainLog,
    ) -> Result<()> {
        self.state.pain_logs.push(log);
        self.save(storage)
    }

    pub fn clear_pain_logs<S: KeyValueStore>(&mut self, storage: &JsonStore<S>) -> Result<()> {
        self.state.pain_logs.clear();
        self.save(storage)
    }

    /// Entries with `timestamp >= now - days`.
    pub fn pain_logs_within(&self, now: DateTime<Utc>, days: u32) -> Vec<PainLog> {
        let cutoff = window_start(now, days);
        self.state
            .pain_logs
            .iter()
            .filter(|log| log.timestamp >= cutoff)
            .cloned()
            .collect()
    }

    pub fn save<S: KeyValueStore>(&self, storage: &JsonStore<S>) -> Result<()> {
        storage.save(STATE_KEY, &self.state)
    }
}
