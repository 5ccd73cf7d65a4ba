//! Collaborator interfaces owned by the host environment.
//!
//! The scheduler only talks to time, audio and desktop notifications through
//! these traits, so it can run against fakes with no timing or I/O.

mod audio;
mod clock;
mod notification;

pub use audio::{AudioPort, SilentAudio};
pub use clock::{Clock, ManualClock, SystemClock};
pub use notification::{
    NoNotifications, NotificationHandle, NotificationPermission, NotificationPort,
    NotificationRequest,
};
