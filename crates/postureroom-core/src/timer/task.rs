//! Single-slot cancellable timer.
//!
//! The slot never runs anything itself. Like the rest of the core it is
//! wall-clock based: the host asks for the armed deadline, waits however it
//! likes, then hands the task back for firing. Each arm gets a fresh id, so a
//! host holding a superseded task cannot fire it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One armed deadline plus its cancellation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub id: u64,
    pub deadline: DateTime<Utc>,
}

impl ScheduledTask {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline
    }

    /// Milliseconds until the deadline, zero if already due.
    pub fn remaining_ms(&self, now: DateTime<Utc>) -> u64 {
        (self.deadline - now).num_milliseconds().max(0) as u64
    }
}

/// Holds at most one [`ScheduledTask`].
#[derive(Debug, Default)]
pub struct TimerSlot {
    armed: Option<ScheduledTask>,
    next_id: u64,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel whatever is armed and arm `deadline` in its place.
    pub fn arm(&mut self, deadline: DateTime<Utc>) -> ScheduledTask {
        self.next_id += 1;
        let task = ScheduledTask {
            id: self.next_id,
            deadline,
        };
        self.armed = Some(task);
        task
    }

    /// Disarm, returning the cancelled task.
    pub fn cancel(&mut self) -> Option<ScheduledTask> {
        self.armed.take()
    }

    pub fn armed(&self) -> Option<&ScheduledTask> {
        self.armed.as_ref()
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Whether `id` names the currently armed task.
    pub fn is_current(&self, id: u64) -> bool {
        self.armed.is_some_and(|t| t.id == id)
    }

    /// Disarm and return the task if its deadline has passed.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Option<ScheduledTask> {
        match self.armed {
            Some(task) if task.is_due(now) => self.armed.take(),
            _ => None,
        }
    }

    /// Disarm and return the task if `id` is current, regardless of deadline.
    pub fn take_if_current(&mut self, id: u64) -> Option<ScheduledTask> {
        if self.is_current(id) {
            self.armed.take()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 10, 0, 0).unwrap()
    }

    #[test]
    fn arm_supersedes_previous_task() {
        let mut slot = TimerSlot::new();
        let first = slot.arm(t0() + Duration::minutes(5));
        let second = slot.arm(t0() + Duration::minutes(30));

        assert_ne!(first.id, second.id);
        assert!(!slot.is_current(first.id));
        assert!(slot.is_current(second.id));
        assert_eq!(slot.armed(), Some(&second));
    }

    #[test]
    fn take_due_respects_deadline() {
        let mut slot = TimerSlot::new();
        let task = slot.arm(t0() + Duration::minutes(5));

        assert!(slot.take_due(t0()).is_none());
        assert!(slot.is_armed());
        assert_eq!(slot.take_due(t0() + Duration::minutes(5)), Some(task));
        assert!(!slot.is_armed());
    }

    #[test]
    fn stale_id_cannot_be_taken() {
        let mut slot = TimerSlot::new();
        let stale = slot.arm(t0());
        slot.cancel();
        assert!(slot.take_if_current(stale.id).is_none());

        let fresh = slot.arm(t0());
        assert!(slot.take_if_current(stale.id).is_none());
        assert_eq!(slot.take_if_current(fresh.id), Some(fresh));
    }

    #[test]
    fn remaining_ms_clamps_at_zero() {
        let task = ScheduledTask {
            id: 1,
            deadline: t0(),
        };
        assert_eq!(task.remaining_ms(t0() - Duration::seconds(2)), 2_000);
        assert_eq!(task.remaining_ms(t0() + Duration::seconds(2)), 0);
    }
}
