mod pain;
mod scheduler;
mod settings;
mod state;
mod suppression;

pub use pain::{window_start, PainLocation, PainLog, PainSummary};
pub use scheduler::{ReminderOptions, ReminderScheduler, SchedulerPhase, SchedulerSnapshot};
pub use settings::{Settings, SettingsPatch};
pub use state::{RuntimeState, SettingsStore, StateStore};
pub use suppression::{is_work_hours, pause_reason, should_pause_reminders, PauseReason};
