//! # Postureroom Core Library
//!
//! Scheduling core for posture and focus reminders. It decides when the next
//! reminder may fire given the work-hour window, meeting and focus state and
//! snooze, keeps exactly one reminder armed, runs best-effort sound and
//! desktop notification side effects, and keeps a log of self-reported pain.
//!
//! ## Architecture
//!
//! - **Scheduler**: A wall-clock-based state machine; the host calls `tick()`
//!   at the deadline returned by `next_wakeup()`
//! - **Storage**: JSON records in a SQLite key/value table, TOML host configuration
//! - **Ports**: Clock, audio and notification traits implemented by the host
//! - **Events**: Broadcast bus the scheduler publishes every state change on
//!
//! ## Key Components
//!
//! - [`ReminderScheduler`]: Reminder state machine and control surface
//! - [`Settings`] / [`RuntimeState`]: Persisted reminder records
//! - [`Database`]: Durable key/value storage
//! - [`Config`]: Host configuration management

pub mod error;
pub mod events;
pub mod ports;
pub mod reminder;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, SideEffectError, StorageError, ValidationError};
pub use events::{EventBus, ReminderEvent};
pub use ports::{
    AudioPort, Clock, ManualClock, NotificationHandle, NotificationPermission, NotificationPort,
    NotificationRequest, SystemClock,
};
pub use reminder::{
    PainLocation, PainLog, PainSummary, PauseReason, ReminderOptions, ReminderScheduler,
    RuntimeState, SchedulerPhase, SchedulerSnapshot, Settings, SettingsPatch,
};
pub use storage::{Config, Database, JsonStore, KeyValueStore, MemoryStore};
pub use timer::{ScheduledTask, TimerSlot};
