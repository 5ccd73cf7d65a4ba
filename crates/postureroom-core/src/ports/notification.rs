use serde::{Deserialize, Serialize};

use crate::error::SideEffectError;

/// Desktop notification permission as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPermission {
    /// Not asked yet.
    Default,
    Granted,
    Denied,
}

/// Content of one desktop notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    /// Notifications sharing a tag replace each other.
    pub tag: Option<String>,
    pub require_interaction: bool,
}

/// A visible notification.
pub trait NotificationHandle: Send {
    fn close(&self);
}

/// Shows desktop notifications.
pub trait NotificationPort: Send + Sync {
    fn permission(&self) -> NotificationPermission;

    /// Ask the user for permission. Called at most once per session.
    fn request(&self) -> NotificationPermission;

    fn show(
        &self,
        request: &NotificationRequest,
    ) -> Result<Box<dyn NotificationHandle>, SideEffectError>;
}

/// Notification port for hosts without a desktop.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoNotifications;

impl NotificationPort for NoNotifications {
    fn permission(&self) -> NotificationPermission {
        NotificationPermission::Denied
    }

    fn request(&self) -> NotificationPermission {
        NotificationPermission::Denied
    }

    fn show(
        &self,
        _request: &NotificationRequest,
    ) -> Result<Box<dyn NotificationHandle>, SideEffectError> {
        Err(SideEffectError::PermissionDenied)
    }
}
