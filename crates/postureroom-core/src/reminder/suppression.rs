//! Suppression evaluator.
//!
//! Decides whether reminders may fire at a given instant. Everything here is
//! a pure function of settings, state and time; the scheduler re-evaluates
//! on every scheduling decision.

use chrono::{DateTime, Datelike, FixedOffset, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::settings::Settings;
use super::state::RuntimeState;

/// Why reminders are currently suppressed, highest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseReason {
    Snoozed,
    InMeeting,
    InFocus,
    OutsideWorkHours,
}

/// True when `local_now` falls on a configured work day and inside
/// `[work_start_hour:00, work_end_hour:00]`. Both bounds are inclusive, so
/// 17:00 counts as in-hours for an end hour of 17, while 17:01 does not.
///
/// A start hour after the end hour yields an empty window.
pub fn is_work_hours<Tz: TimeZone>(settings: &Settings, local_now: &DateTime<Tz>) -> bool {
    let weekday = local_now.weekday().num_days_from_sunday() as u8;
    if !settings.work_days.contains(&weekday) {
        return false;
    }

    let minute_of_day = local_now.hour() * 60 + local_now.minute();
    let start = u32::from(settings.work_start_hour) * 60;
    let end = u32::from(settings.work_end_hour) * 60;
    (start..=end).contains(&minute_of_day)
}

/// Highest-precedence reason reminders are suppressed at `now`, if any.
///
/// An active snooze wins over every other condition.
pub fn pause_reason(
    settings: &Settings,
    state: &RuntimeState,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Option<PauseReason> {
    if state.snooze_until.is_some_and(|until| now < until) {
        return Some(PauseReason::Snoozed);
    }
    if settings.auto_pause_in_meetings && state.in_meeting {
        return Some(PauseReason::InMeeting);
    }
    if settings.auto_pause_during_focus && state.in_focus_mode {
        return Some(PauseReason::InFocus);
    }
    if !is_work_hours(settings, &now.with_timezone(&offset)) {
        return Some(PauseReason::OutsideWorkHours);
    }
    None
}

pub fn should_pause_reminders(
    settings: &Settings,
    state: &RuntimeState,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> bool {
    pause_reason(settings, state, now, offset).is_some()
}
