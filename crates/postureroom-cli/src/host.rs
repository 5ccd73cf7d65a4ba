//! Terminal implementations of the scheduler's side-effect ports.

use std::io::Write;

use postureroom_core::{
    AudioPort, NotificationHandle, NotificationPermission, NotificationPort, NotificationRequest,
    SideEffectError,
};

/// Rings the terminal bell. Volume is ignored; a muted reminder never reaches the port.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl AudioPort for TerminalBell {
    fn play(&self, _resource: &str, _volume: f32) -> Result<(), SideEffectError> {
        let mut stderr = std::io::stderr().lock();
        stderr
            .write_all(b"\x07")
            .and_then(|_| stderr.flush())
            .map_err(|e| SideEffectError::Audio(e.to_string()))
    }
}

/// Prints notifications to stderr. A terminal needs no permission.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifications;

struct PrintedNotification;

impl NotificationHandle for PrintedNotification {
    fn close(&self) {}
}

impl NotificationPort for StderrNotifications {
    fn permission(&self) -> NotificationPermission {
        NotificationPermission::Granted
    }

    fn request(&self) -> NotificationPermission {
        NotificationPermission::Granted
    }

    fn show(
        &self,
        request: &NotificationRequest,
    ) -> Result<Box<dyn NotificationHandle>, SideEffectError> {
        eprintln!("[{}] {}", request.title, request.body);
        Ok(Box::new(PrintedNotification))
    }
}
