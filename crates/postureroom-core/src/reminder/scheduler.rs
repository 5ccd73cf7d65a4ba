//! Reminder scheduler.
//!
//! Owns the settings and runtime state and decides when the next posture
//! reminder fires. Like the rest of the core it is wall-clock based with no
//! internal threads: the host waits until [`ReminderScheduler::next_wakeup`]
//! and then calls [`ReminderScheduler::tick`].
//!
//! ## Phases
//!
//! ```text
//! Disabled <-> Armed -> Firing -> (Armed | Disabled)
//! ```
//!
//! Every path into `Armed` goes through `schedule_next_reminder`, which
//! cancels the previous timer before arming a new one, so at most one
//! reminder is ever pending.
//!
//! A snooze is a suppression condition, not a timer: once the snooze
//! deadline passes nothing re-arms until another control method runs.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::pain::{PainLocation, PainLog, PainSummary};
use super::settings::{Settings, SettingsPatch};
use super::state::{RuntimeState, SettingsStore, StateStore};
use super::suppression::{pause_reason, PauseReason};
use crate::error::Result;
use crate::events::{EventBus, ReminderEvent};
use crate::ports::{
    AudioPort, Clock, NoNotifications, NotificationHandle, NotificationPermission,
    NotificationPort, NotificationRequest, SilentAudio,
};
use crate::storage::{JsonStore, KeyValueStore, ReminderConfig};
use crate::timer::{ScheduledTask, TimerSlot};

const NOTIFICATION_TAG: &str = "posture-reminder";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerPhase {
    /// No timer armed.
    Disabled,
    /// Exactly one timer armed for `next_reminder`.
    Armed,
    /// Reminder side effects running.
    Firing,
}

/// Presentation details for a fired reminder.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderOptions {
    pub sound: String,
    pub notification_title: String,
    pub notification_body: String,
    /// Visible notifications are closed on the first tick after this long.
    pub notification_timeout: Duration,
}

impl Default for ReminderOptions {
    fn default() -> Self {
        ReminderConfig::default().into()
    }
}

impl From<ReminderConfig> for ReminderOptions {
    fn from(cfg: ReminderConfig) -> Self {
        let notification_timeout = Duration::seconds(cfg.notification_timeout_secs() as i64);
        Self {
            sound: cfg.sound,
            notification_title: cfg.notification_title,
            notification_body: cfg.notification_body,
            notification_timeout,
        }
    }
}

/// Read-only view for rendering countdowns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerSnapshot {
    pub phase: SchedulerPhase,
    pub settings: Settings,
    pub is_active: bool,
    pub last_reminder: Option<DateTime<Utc>>,
    pub next_reminder: Option<DateTime<Utc>>,
    pub snooze_until: Option<DateTime<Utc>>,
    pub in_meeting: bool,
    pub in_focus_mode: bool,
    pub pause_reason: Option<PauseReason>,
    /// Milliseconds until the armed reminder, if any.
    pub remaining_ms: Option<u64>,
    pub notifications_blocked: bool,
    pub pain_log_count: usize,
    pub at: DateTime<Utc>,
}

struct VisibleNotification {
    handle: Box<dyn NotificationHandle>,
    close_at: DateTime<Utc>,
}

/// The reminder state machine and its control surface.
pub struct ReminderScheduler<S: KeyValueStore> {
    storage: JsonStore<S>,
    settings: SettingsStore,
    state: StateStore,
    timer: TimerSlot,
    phase: SchedulerPhase,
    clock: Arc<dyn Clock>,
    audio: Arc<dyn AudioPort>,
    notifications: Arc<dyn NotificationPort>,
    events: EventBus,
    options: ReminderOptions,
    visible: Option<VisibleNotification>,
    permission_requested: bool,
    notifications_blocked: bool,
}

impl<S: KeyValueStore> ReminderScheduler<S> {
    /// Load settings and state from `store`. Starts `Disabled` with no ports
    /// attached; reminders stay off until [`start_reminders`](Self::start_reminders)
    /// or another control method schedules them.
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        let storage = JsonStore::new(store);
        let settings = SettingsStore::load(&storage);
        let state = StateStore::load(&storage);
        debug!(
            enabled = settings.get().enabled,
            interval = settings.get().interval,
            "loaded reminder settings"
        );
        Self {
            storage,
            settings,
            state,
            timer: TimerSlot::new(),
            phase: SchedulerPhase::Disabled,
            clock,
            audio: Arc::new(SilentAudio),
            notifications: Arc::new(NoNotifications),
            events: EventBus::default(),
            options: ReminderOptions::default(),
            visible: None,
            permission_requested: false,
            notifications_blocked: false,
        }
    }

    pub fn with_audio(mut self, audio: Arc<dyn AudioPort>) -> Self {
        self.audio = audio;
        self
    }

    pub fn with_notifications(mut self, notifications: Arc<dyn NotificationPort>) -> Self {
        self.notifications = notifications;
        self
    }

    pub fn with_options(mut self, options: ReminderOptions) -> Self {
        self.options = options;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        self.settings.get()
    }

    pub fn state(&self) -> &RuntimeState {
        self.state.get()
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    pub fn armed_task(&self) -> Option<ScheduledTask> {
        self.timer.armed().copied()
    }

    /// Earliest instant the host should call [`tick`](Self::tick): the armed
    /// reminder or a pending notification auto-close.
    pub fn next_wakeup(&self) -> Option<DateTime<Utc>> {
        let reminder = self.timer.armed().map(|t| t.deadline);
        let close = self.visible.as_ref().map(|v| v.close_at);
        match (reminder, close) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn pause_reason(&self) -> Option<PauseReason> {
        pause_reason(
            self.settings.get(),
            self.state.get(),
            self.clock.now(),
            self.clock.local_offset(),
        )
    }

    pub fn notifications_blocked(&self) -> bool {
        self.notifications_blocked
    }

    pub fn has_visible_notification(&self) -> bool {
        self.visible.is_some()
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        let now = self.clock.now();
        let state = self.state.get();
        SchedulerSnapshot {
            phase: self.phase,
            settings: self.settings.get().clone(),
            is_active: state.is_active,
            last_reminder: state.last_reminder,
            next_reminder: state.next_reminder,
            snooze_until: state.snooze_until,
            in_meeting: state.in_meeting,
            in_focus_mode: state.in_focus_mode,
            pause_reason: self.pause_reason(),
            remaining_ms: self.timer.armed().map(|t| t.remaining_ms(now)),
            notifications_blocked: self.notifications_blocked,
            pain_log_count: state.pain_logs().len(),
            at: now,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReminderEvent> {
        self.events.subscribe()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Cancel any armed timer, then arm the next reminder unless reminders
    /// are disabled or suppressed right now.
    pub fn schedule_next_reminder(&mut self) {
        self.timer.cancel();
        let now = self.clock.now();
        let settings = self.settings.get();
        let enabled = settings.enabled;
        let interval = Duration::minutes(i64::from(settings.interval));
        let reason = pause_reason(settings, self.state.get(), now, self.clock.local_offset());

        if !enabled || reason.is_some() {
            self.modify_state(|s| {
                s.is_active = false;
                s.next_reminder = None;
            });
            self.phase = SchedulerPhase::Disabled;
            debug!(enabled, ?reason, "reminders not scheduled");
            self.events
                .publish(ReminderEvent::RemindersPaused { reason, at: now });
            return;
        }

        // A cycle that is already overdue fires immediately rather than in the past.
        let target = (self.state.get().last_reminder.unwrap_or(now) + interval).max(now);
        self.modify_state(|s| {
            s.is_active = true;
            s.next_reminder = Some(target);
        });
        let task = self.timer.arm(target);
        self.phase = SchedulerPhase::Armed;
        debug!(task_id = task.id, next_reminder = %target, "reminder armed");
        self.events.publish(ReminderEvent::ReminderScheduled {
            next_reminder: target,
            at: now,
        });
    }

    /// Fire the armed reminder if it is due and close an expired notification.
    ///
    /// Returns the `ReminderFired` event when a reminder fired.
    pub fn tick(&mut self) -> Option<ReminderEvent> {
        let now = self.clock.now();
        if self.visible.as_ref().is_some_and(|v| now >= v.close_at) {
            debug!("auto-closing reminder notification");
            self.close_visible();
        }
        self.timer.take_due(now)?;
        Some(self.trigger_reminder())
    }

    /// Fire the task named by `task_id` if it is still the armed one.
    ///
    /// For hosts whose own timer calls back with the task it was given.
    /// Superseded or cancelled tasks are ignored.
    pub fn fire(&mut self, task_id: u64) -> Option<ReminderEvent> {
        match self.timer.take_if_current(task_id) {
            Some(_) => Some(self.trigger_reminder()),
            None => {
                debug!(task_id, "ignoring stale reminder task");
                None
            }
        }
    }

    /// Enable reminders and restart the cadence from now.
    pub fn start_reminders(&mut self) {
        let now = self.clock.now();
        let result = self
            .settings
            .update(&self.storage, SettingsPatch::enabled(true));
        log_persist_failure("settings", result);
        self.modify_state(|s| {
            s.last_reminder = None;
            s.snooze_until = None;
            s.is_active = true;
        });
        self.ensure_notification_permission();
        info!(interval = self.settings.get().interval, "reminders started");
        self.events
            .publish(ReminderEvent::RemindersStarted { at: now });
        self.schedule_next_reminder();
    }

    /// Cancel the pending reminder. `last_reminder` and `snooze_until` are kept.
    pub fn stop_reminders(&mut self) {
        let now = self.clock.now();
        self.timer.cancel();
        self.modify_state(|s| {
            s.is_active = false;
            s.next_reminder = None;
        });
        self.phase = SchedulerPhase::Disabled;
        info!("reminders stopped");
        self.events
            .publish(ReminderEvent::RemindersStopped { at: now });
    }

    /// Suppress reminders for `minutes` from now.
    ///
    /// Reminders do not come back by themselves when the snooze ends; the
    /// next call to any other control method re-evaluates.
    pub fn snooze(&mut self, minutes: u32) {
        let now = self.clock.now();
        let until = now + Duration::minutes(i64::from(minutes));
        self.modify_state(|s| s.snooze_until = Some(until));
        info!(minutes, until = %until, "reminders snoozed");
        self.events.publish(ReminderEvent::Snoozed { until, at: now });
        self.schedule_next_reminder();
    }

    /// Acknowledge the current reminder and arm the next cycle.
    pub fn dismiss_reminder(&mut self) {
        let now = self.clock.now();
        self.close_visible();
        self.events
            .publish(ReminderEvent::ReminderDismissed { at: now });
        self.schedule_next_reminder();
    }

    pub fn set_in_meeting(&mut self, in_meeting: bool) {
        let now = self.clock.now();
        self.modify_state(|s| s.in_meeting = in_meeting);
        self.events
            .publish(ReminderEvent::MeetingChanged { in_meeting, at: now });
        self.schedule_next_reminder();
    }

    pub fn set_in_focus_mode(&mut self, in_focus_mode: bool) {
        let now = self.clock.now();
        self.modify_state(|s| s.in_focus_mode = in_focus_mode);
        self.events.publish(ReminderEvent::FocusModeChanged {
            in_focus_mode,
            at: now,
        });
        self.schedule_next_reminder();
    }

    /// Merge `patch` into the settings, persist, and re-schedule.
    pub fn update_settings(&mut self, patch: SettingsPatch) {
        let now = self.clock.now();
        let result = self.settings.update(&self.storage, patch);
        log_persist_failure("settings", result);
        self.events
            .publish(ReminderEvent::SettingsChanged { at: now });
        self.schedule_next_reminder();
    }

    // ── Pain log ─────────────────────────────────────────────────────

    /// Append a pain report stamped with the current time.
    pub fn log_pain(&mut self, level: u8, location: PainLocation, notes: Option<String>) -> PainLog {
        let now = self.clock.now();
        let log = PainLog::new(now, level, location, notes);
        let result = self.state.append_pain_log(&self.storage, log.clone());
        log_persist_failure("state", result);
        debug!(id = %log.id, level, %location, "pain logged");
        self.events.publish(ReminderEvent::PainLogged {
            id: log.id.clone(),
            level,
            location,
            at: now,
        });
        log
    }

    pub fn clear_logs(&mut self) {
        let now = self.clock.now();
        let result = self.state.clear_pain_logs(&self.storage);
        log_persist_failure("state", result);
        self.events
            .publish(ReminderEvent::PainLogsCleared { at: now });
    }

    /// Pain logs from the last `days` days.
    pub fn pain_logs(&self, days: u32) -> Vec<PainLog> {
        self.state.pain_logs_within(self.clock.now(), days)
    }

    pub fn pain_summary(&self, days: u32) -> PainSummary {
        PainSummary::from_logs(&self.pain_logs(days))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn trigger_reminder(&mut self) -> ReminderEvent {
        self.phase = SchedulerPhase::Firing;
        let now = self.clock.now();
        let (sound_enabled, volume, notifications_enabled) = {
            let settings = self.settings.get();
            (
                settings.sound_enabled,
                settings.sound_volume,
                settings.notifications_enabled,
            )
        };

        let sound_played = sound_enabled && self.play_sound(volume);
        let notification_shown = notifications_enabled && self.show_notification(now);

        self.modify_state(|s| {
            s.last_reminder = Some(now);
            s.next_reminder = None;
        });
        info!(sound_played, notification_shown, "posture reminder fired");

        let event = ReminderEvent::ReminderFired {
            sound_played,
            notification_shown,
            at: now,
        };
        self.events.publish(event.clone());
        self.schedule_next_reminder();
        event
    }

    fn play_sound(&self, volume: f32) -> bool {
        match self.audio.play(&self.options.sound, volume) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "reminder sound failed");
                false
            }
        }
    }

    fn show_notification(&mut self, now: DateTime<Utc>) -> bool {
        if self.notifications_blocked {
            return false;
        }
        match self.notifications.permission() {
            NotificationPermission::Granted => {}
            NotificationPermission::Denied => {
                debug!("notification permission denied, disabling for this session");
                self.notifications_blocked = true;
                return false;
            }
            NotificationPermission::Default => return false,
        }

        self.close_visible();
        let request = NotificationRequest {
            title: self.options.notification_title.clone(),
            body: self.options.notification_body.clone(),
            tag: Some(NOTIFICATION_TAG.to_string()),
            require_interaction: false,
        };
        match self.notifications.show(&request) {
            Ok(handle) => {
                self.visible = Some(VisibleNotification {
                    handle,
                    close_at: now
                        .checked_add_signed(self.options.notification_timeout)
                        .unwrap_or(DateTime::<Utc>::MAX_UTC),
                });
                true
            }
            Err(e) => {
                warn!(error = %e, "reminder notification failed");
                false
            }
        }
    }

    /// Ask for notification permission once per session if it is undecided.
    fn ensure_notification_permission(&mut self) {
        if !self.settings.get().notifications_enabled || self.notifications_blocked {
            return;
        }
        let permission = match self.notifications.permission() {
            NotificationPermission::Default if !self.permission_requested => {
                self.permission_requested = true;
                self.notifications.request()
            }
            other => other,
        };
        if permission == NotificationPermission::Denied {
            info!("desktop notifications denied, skipping them for this session");
            self.notifications_blocked = true;
        }
    }

    fn close_visible(&mut self) {
        if let Some(visible) = self.visible.take() {
            visible.handle.close();
        }
    }

    fn modify_state(&mut self, f: impl FnOnce(&mut RuntimeState)) {
        let result = self.state.modify(&self.storage, f);
        log_persist_failure("state", result);
    }
}

fn log_persist_failure(record: &str, result: Result<()>) {
    if let Err(e) = result {
        warn!(record, error = %e, "failed to persist reminder record");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SideEffectError;
    use crate::ports::ManualClock;
    use crate::storage::{MemoryStore, STATE_KEY};
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeAudio {
        plays: Mutex<Vec<(String, f32)>>,
        fail: bool,
    }

    impl AudioPort for FakeAudio {
        fn play(&self, resource: &str, volume: f32) -> Result<(), SideEffectError> {
            self.plays.lock().unwrap().push((resource.to_string(), volume));
            if self.fail {
                Err(SideEffectError::Audio("autoplay blocked".into()))
            } else {
                Ok(())
            }
        }
    }

    struct FakeHandle {
        closed: Arc<AtomicUsize>,
    }

    impl NotificationHandle for FakeHandle {
        fn close(&self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FakeNotifications {
        permission: Mutex<NotificationPermission>,
        answer: NotificationPermission,
        requests: AtomicUsize,
        shown: Mutex<Vec<NotificationRequest>>,
        closed: Arc<AtomicUsize>,
    }

    impl FakeNotifications {
        fn with_permission(permission: NotificationPermission) -> Self {
            Self {
                permission: Mutex::new(permission),
                answer: NotificationPermission::Granted,
                requests: AtomicUsize::new(0),
                shown: Mutex::new(Vec::new()),
                closed: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn shown(&self) -> usize {
            self.shown.lock().unwrap().len()
        }

        fn closed(&self) -> usize {
            self.closed.load(Ordering::SeqCst)
        }
    }

    impl NotificationPort for FakeNotifications {
        fn permission(&self) -> NotificationPermission {
            *self.permission.lock().unwrap()
        }

        fn request(&self) -> NotificationPermission {
            self.requests.fetch_add(1, Ordering::SeqCst);
            *self.permission.lock().unwrap() = self.answer;
            self.answer
        }

        fn show(
            &self,
            request: &NotificationRequest,
        ) -> Result<Box<dyn NotificationHandle>, SideEffectError> {
            self.shown.lock().unwrap().push(request.clone());
            Ok(Box::new(FakeHandle {
                closed: self.closed.clone(),
            }))
        }
    }

    // 2026-03-10 is a Tuesday.
    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 10, 0, 0).unwrap()
    }

    fn scheduler_at(
        start: DateTime<Utc>,
    ) -> (ReminderScheduler<Arc<MemoryStore>>, Arc<ManualClock>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(start));
        let scheduler = ReminderScheduler::new(store.clone(), clock.clone());
        (scheduler, clock, store)
    }

    #[test]
    fn start_arms_one_timer_at_now_plus_interval() {
        let (mut s, _clock, _) = scheduler_at(t0());
        s.start_reminders();

        assert_eq!(s.phase(), SchedulerPhase::Armed);
        assert!(s.state().is_active);
        assert_eq!(s.state().next_reminder, Some(t0() + Duration::minutes(30)));
        assert_eq!(s.armed_task().map(|t| t.deadline), s.state().next_reminder);
    }

    #[test]
    fn rescheduling_twice_leaves_one_timer() {
        let (mut s, clock, _) = scheduler_at(t0());
        s.start_reminders();
        let first = s.armed_task().unwrap();
        s.schedule_next_reminder();
        let second = s.armed_task().unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.deadline, second.deadline);
        assert!(s.fire(first.id).is_none());

        clock.advance(Duration::minutes(30));
        assert!(s.tick().is_some());
        assert!(s.tick().is_none());
    }

    #[test]
    fn fire_and_rearm_keeps_cadence() {
        let (mut s, clock, _) = scheduler_at(t0());
        s.start_reminders();

        clock.advance(Duration::minutes(29));
        assert!(s.tick().is_none());

        clock.advance(Duration::minutes(1));
        let fired = s.tick();
        assert!(matches!(fired, Some(ReminderEvent::ReminderFired { .. })));
        assert_eq!(s.state().last_reminder, Some(t0() + Duration::minutes(30)));
        assert_eq!(s.state().next_reminder, Some(t0() + Duration::minutes(60)));
        assert_eq!(s.phase(), SchedulerPhase::Armed);
    }

    #[test]
    fn start_discards_previous_cycle() {
        let (mut s, clock, _) = scheduler_at(t0());
        s.start_reminders();
        clock.advance(Duration::minutes(30));
        s.tick();
        assert!(s.state().last_reminder.is_some());

        clock.advance(Duration::minutes(7));
        s.start_reminders();
        assert!(s.state().last_reminder.is_none());
        assert_eq!(
            s.state().next_reminder,
            Some(t0() + Duration::minutes(67))
        );
    }

    #[test]
    fn start_forces_enabled_and_clears_snooze() {
        let (mut s, _clock, _) = scheduler_at(t0());
        s.update_settings(SettingsPatch::enabled(false));
        s.snooze(10);
        assert_eq!(s.phase(), SchedulerPhase::Disabled);

        s.start_reminders();
        assert!(s.settings().enabled);
        assert!(s.state().snooze_until.is_none());
        assert_eq!(s.phase(), SchedulerPhase::Armed);
    }

    #[test]
    fn disabled_settings_never_arm() {
        let (mut s, _clock, _) = scheduler_at(t0());
        s.update_settings(SettingsPatch::enabled(false));
        s.schedule_next_reminder();

        assert_eq!(s.phase(), SchedulerPhase::Disabled);
        assert!(!s.state().is_active);
        assert!(s.state().next_reminder.is_none());
        assert!(s.armed_task().is_none());
    }

    #[test]
    fn outside_work_hours_stays_disabled() {
        let evening = Utc.with_ymd_and_hms(2026, 3, 10, 19, 0, 0).unwrap();
        let (mut s, _clock, _) = scheduler_at(evening);
        s.start_reminders();

        assert_eq!(s.phase(), SchedulerPhase::Disabled);
        assert_eq!(s.pause_reason(), Some(PauseReason::OutsideWorkHours));
        assert!(!s.state().is_active);
    }

    #[test]
    fn snooze_does_not_resume_on_its_own() {
        let (mut s, clock, _) = scheduler_at(t0());
        s.update_settings(SettingsPatch::interval(5));
        s.start_reminders();
        assert_eq!(s.state().next_reminder, Some(t0() + Duration::minutes(5)));

        s.snooze(15);
        assert!(s.armed_task().is_none());
        assert_eq!(s.phase(), SchedulerPhase::Disabled);
        assert_eq!(s.state().snooze_until, Some(t0() + Duration::minutes(15)));

        clock.advance(Duration::minutes(15));
        assert!(s.tick().is_none());
        assert_eq!(s.phase(), SchedulerPhase::Disabled);
        assert!(s.next_wakeup().is_none());
        assert!(s.pause_reason().is_none());

        // Only another control call brings reminders back.
        s.set_in_meeting(false);
        assert_eq!(s.phase(), SchedulerPhase::Armed);
        assert_eq!(
            s.state().next_reminder,
            Some(t0() + Duration::minutes(20))
        );
    }

    #[test]
    fn meeting_suppresses_and_resumes() {
        let (mut s, _clock, _) = scheduler_at(t0());
        s.start_reminders();

        s.set_in_meeting(true);
        assert_eq!(s.phase(), SchedulerPhase::Disabled);
        assert_eq!(s.pause_reason(), Some(PauseReason::InMeeting));

        s.set_in_meeting(false);
        assert_eq!(s.phase(), SchedulerPhase::Armed);
    }

    #[test]
    fn focus_ignored_when_auto_pause_off() {
        let (mut s, _clock, _) = scheduler_at(t0());
        s.update_settings(SettingsPatch {
            auto_pause_during_focus: Some(false),
            ..SettingsPatch::default()
        });
        s.start_reminders();
        s.set_in_focus_mode(true);

        assert!(s.state().in_focus_mode);
        assert_eq!(s.phase(), SchedulerPhase::Armed);
    }

    #[test]
    fn stop_keeps_last_reminder_and_snooze() {
        let (mut s, clock, _) = scheduler_at(t0());
        s.start_reminders();
        clock.advance(Duration::minutes(30));
        s.tick();
        s.snooze(5);
        s.stop_reminders();

        assert_eq!(s.phase(), SchedulerPhase::Disabled);
        assert!(!s.state().is_active);
        assert!(s.state().next_reminder.is_none());
        assert_eq!(s.state().last_reminder, Some(t0() + Duration::minutes(30)));
        assert!(s.state().snooze_until.is_some());
    }

    #[test]
    fn overdue_cycle_fires_now_not_in_the_past() {
        let (mut s, clock, _) = scheduler_at(t0());
        s.start_reminders();
        clock.advance(Duration::minutes(30));
        s.tick();
        s.set_in_meeting(true);

        clock.advance(Duration::minutes(90));
        s.set_in_meeting(false);
        let now = clock.now();
        assert_eq!(s.state().next_reminder, Some(now));
        assert!(s.tick().is_some());
    }

    #[test]
    fn audio_failure_still_counts_as_fired() {
        let (s, clock, _) = scheduler_at(t0());
        let audio = Arc::new(FakeAudio {
            fail: true,
            ..FakeAudio::default()
        });
        let mut s = s.with_audio(audio.clone());
        s.start_reminders();
        clock.advance(Duration::minutes(30));

        match s.tick() {
            Some(ReminderEvent::ReminderFired { sound_played, .. }) => assert!(!sound_played),
            other => panic!("expected ReminderFired, got {other:?}"),
        }
        assert_eq!(audio.plays.lock().unwrap().len(), 1);
        assert_eq!(s.state().last_reminder, Some(clock.now()));
        assert_eq!(s.phase(), SchedulerPhase::Armed);
    }

    #[test]
    fn sound_uses_configured_resource_and_volume() {
        let (s, clock, _) = scheduler_at(t0());
        let audio = Arc::new(FakeAudio::default());
        let mut s = s.with_audio(audio.clone()).with_options(ReminderOptions {
            sound: "bell".into(),
            ..ReminderOptions::default()
        });
        s.update_settings(SettingsPatch {
            sound_volume: Some(0.8),
            ..SettingsPatch::default()
        });
        s.start_reminders();
        clock.advance(Duration::minutes(30));
        s.tick();

        assert_eq!(*audio.plays.lock().unwrap(), vec![("bell".to_string(), 0.8)]);
    }

    #[test]
    fn sound_disabled_skips_audio() {
        let (s, clock, _) = scheduler_at(t0());
        let audio = Arc::new(FakeAudio::default());
        let mut s = s.with_audio(audio.clone());
        s.update_settings(SettingsPatch {
            sound_enabled: Some(false),
            ..SettingsPatch::default()
        });
        s.start_reminders();
        clock.advance(Duration::minutes(30));
        s.tick();

        assert!(audio.plays.lock().unwrap().is_empty());
    }

    #[test]
    fn notification_auto_closes_after_timeout() {
        let (s, clock, _) = scheduler_at(t0());
        let notes = Arc::new(FakeNotifications::with_permission(
            NotificationPermission::Granted,
        ));
        let mut s = s.with_notifications(notes.clone());
        s.start_reminders();

        clock.advance(Duration::minutes(30));
        s.tick();
        assert_eq!(notes.shown(), 1);
        assert!(s.has_visible_notification());
        assert_eq!(s.next_wakeup(), Some(clock.now() + Duration::seconds(10)));

        clock.advance(Duration::seconds(9));
        s.tick();
        assert_eq!(notes.closed(), 0);

        clock.advance(Duration::seconds(1));
        s.tick();
        assert_eq!(notes.closed(), 1);
        assert!(!s.has_visible_notification());
        assert_eq!(s.next_wakeup(), Some(t0() + Duration::minutes(60)));
    }

    #[test]
    fn newer_notification_replaces_visible_one() {
        let (s, clock, _) = scheduler_at(t0());
        let notes = Arc::new(FakeNotifications::with_permission(
            NotificationPermission::Granted,
        ));
        let mut s = s
            .with_notifications(notes.clone())
            .with_options(ReminderOptions {
                notification_timeout: Duration::minutes(10),
                ..ReminderOptions::default()
            });
        s.update_settings(SettingsPatch::interval(1));
        s.start_reminders();

        clock.advance(Duration::minutes(1));
        s.tick();
        clock.advance(Duration::minutes(1));
        s.tick();

        assert_eq!(notes.shown(), 2);
        assert_eq!(notes.closed(), 1);
        assert!(s.has_visible_notification());
        let shown = notes.shown.lock().unwrap();
        assert_eq!(shown[1].tag.as_deref(), Some("posture-reminder"));
    }

    #[test]
    fn undecided_permission_is_requested_once() {
        let (s, _clock, _) = scheduler_at(t0());
        let notes = Arc::new(FakeNotifications::with_permission(
            NotificationPermission::Default,
        ));
        let mut s = s.with_notifications(notes.clone());
        s.start_reminders();
        s.start_reminders();

        assert_eq!(notes.requests.load(Ordering::SeqCst), 1);
        assert!(!s.notifications_blocked());
    }

    #[test]
    fn denied_permission_disables_notifications_for_session() {
        let (s, clock, _) = scheduler_at(t0());
        let notes = Arc::new(FakeNotifications {
            answer: NotificationPermission::Denied,
            ..FakeNotifications::with_permission(NotificationPermission::Default)
        });
        let mut s = s.with_notifications(notes.clone());
        s.start_reminders();
        assert!(s.notifications_blocked());

        // Even if the host later reports Granted, no retry happens this session.
        *notes.permission.lock().unwrap() = NotificationPermission::Granted;
        clock.advance(Duration::minutes(30));
        match s.tick() {
            Some(ReminderEvent::ReminderFired {
                notification_shown, ..
            }) => assert!(!notification_shown),
            other => panic!("expected ReminderFired, got {other:?}"),
        }
        assert_eq!(notes.shown(), 0);
        assert_eq!(notes.requests.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dismiss_closes_notification_and_rearms() {
        let (s, clock, _) = scheduler_at(t0());
        let notes = Arc::new(FakeNotifications::with_permission(
            NotificationPermission::Granted,
        ));
        let mut s = s.with_notifications(notes.clone());
        s.start_reminders();
        clock.advance(Duration::minutes(30));
        s.tick();

        clock.advance(Duration::seconds(3));
        s.dismiss_reminder();
        assert_eq!(notes.closed(), 1);
        assert_eq!(s.phase(), SchedulerPhase::Armed);
        assert_eq!(s.state().next_reminder, Some(t0() + Duration::minutes(60)));
    }

    #[test]
    fn settings_update_round_trips_through_storage() {
        let (mut s, clock, store) = scheduler_at(t0());
        s.update_settings(SettingsPatch::interval(45));

        let reloaded = ReminderScheduler::new(store, clock);
        assert_eq!(reloaded.settings().interval, 45);
    }

    #[test]
    fn reload_never_resumes_active_session() {
        let (mut s, clock, store) = scheduler_at(t0());
        s.start_reminders();
        assert!(store.get(STATE_KEY).unwrap().unwrap().contains("\"isActive\":true"));

        let reloaded = ReminderScheduler::new(store, clock);
        assert!(!reloaded.state().is_active);
        assert_eq!(reloaded.phase(), SchedulerPhase::Disabled);
        assert!(reloaded.armed_task().is_none());
    }

    #[test]
    fn control_calls_publish_events() {
        let (mut s, _clock, _) = scheduler_at(t0());
        let mut rx = s.subscribe();
        s.start_reminders();
        s.set_in_focus_mode(true);

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert!(matches!(events[0], ReminderEvent::RemindersStarted { .. }));
        assert!(matches!(events[1], ReminderEvent::ReminderScheduled { .. }));
        assert!(matches!(
            events[2],
            ReminderEvent::FocusModeChanged {
                in_focus_mode: true,
                ..
            }
        ));
        assert!(matches!(
            events[3],
            ReminderEvent::RemindersPaused {
                reason: Some(PauseReason::InFocus),
                ..
            }
        ));
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn pain_log_window() {
        let (mut s, clock, _) = scheduler_at(t0());
        let early = s.log_pain(5, PainLocation::LowerBack, None);
        clock.advance(Duration::hours(25));
        let now_log = s.log_pain(7, PainLocation::Neck, Some("ache".into()));

        assert_eq!(s.pain_logs(1), vec![now_log.clone()]);
        assert!(!s.pain_logs(0).contains(&early));
        assert_eq!(s.pain_logs(2).len(), 2);
        assert_eq!(s.pain_summary(2).count, 2);

        s.clear_logs();
        assert!(s.pain_logs(30).is_empty());
    }

    #[test]
    fn pain_log_window_includes_exact_cutoff() {
        let (mut s, clock, _) = scheduler_at(t0());
        let log = s.log_pain(3, PainLocation::Neck, None);

        clock.advance(Duration::hours(24));
        assert_eq!(s.pain_logs(1), vec![log.clone()]);

        clock.advance(Duration::milliseconds(1));
        assert!(s.pain_logs(1).is_empty());
    }

    #[test]
    fn pain_log_window_of_any_length_returns_everything() {
        let (mut s, _clock, _) = scheduler_at(t0());
        let log = s.log_pain(3, PainLocation::Neck, None);
        assert_eq!(s.pain_logs(u32::MAX), vec![log]);
        assert_eq!(s.pain_summary(u32::MAX).count, 1);
    }

    #[test]
    fn oversized_notification_timeout_is_capped() {
        let options = ReminderOptions::from(ReminderConfig {
            notification_timeout_secs: u64::MAX / 2,
            ..ReminderConfig::default()
        });
        assert_eq!(
            options.notification_timeout,
            Duration::seconds(ReminderConfig::MAX_NOTIFICATION_TIMEOUT_SECS as i64)
        );
    }

    #[test]
    fn unbounded_notification_timeout_still_fires() {
        let (s, clock, _) = scheduler_at(t0());
        let notes = Arc::new(FakeNotifications::with_permission(
            NotificationPermission::Granted,
        ));
        let mut s = s
            .with_notifications(notes.clone())
            .with_options(ReminderOptions {
                notification_timeout: Duration::MAX,
                ..ReminderOptions::default()
            });
        s.start_reminders();

        clock.advance(Duration::minutes(30));
        assert!(s.tick().is_some());
        assert!(s.has_visible_notification());
        assert_eq!(s.next_wakeup(), Some(t0() + Duration::minutes(60)));
    }
}
