//! Scheduler events and the bus that delivers them.
//!
//! Every state change in the scheduler publishes an event. UI layers
//! subscribe instead of polling the snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::reminder::{PainLocation, PauseReason};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReminderEvent {
    RemindersStarted {
        at: DateTime<Utc>,
    },
    RemindersStopped {
        at: DateTime<Utc>,
    },
    /// A timer was armed for `next_reminder`.
    ReminderScheduled {
        next_reminder: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// Scheduling found reminders disabled or suppressed. `reason` is `None`
    /// when reminders are disabled in settings.
    RemindersPaused {
        reason: Option<PauseReason>,
        at: DateTime<Utc>,
    },
    ReminderFired {
        sound_played: bool,
        notification_shown: bool,
        at: DateTime<Utc>,
    },
    ReminderDismissed {
        at: DateTime<Utc>,
    },
    Snoozed {
        until: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    SettingsChanged {
        at: DateTime<Utc>,
    },
    MeetingChanged {
        in_meeting: bool,
        at: DateTime<Utc>,
    },
    FocusModeChanged {
        in_focus_mode: bool,
        at: DateTime<Utc>,
    },
    PainLogged {
        id: String,
        level: u8,
        location: PainLocation,
        at: DateTime<Utc>,
    },
    PainLogsCleared {
        at: DateTime<Utc>,
    },
}

/// Broadcast bus for [`ReminderEvent`]s.
#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<ReminderEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish to all current subscribers. Having none is fine.
    pub fn publish(&self, event: ReminderEvent) {
        trace!(?event, "publishing reminder event");
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReminderEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(128)
    }
}
