pub mod config;
pub mod control;
pub mod pain;
pub mod settings;
pub mod watch;

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use postureroom_core::{Config, Database, ReminderScheduler, SystemClock};
use serde::Serialize;

use crate::host::{StderrNotifications, TerminalBell};

pub type Scheduler = ReminderScheduler<Database>;

/// Open the database and wire the scheduler to the terminal host adapters.
pub fn open_scheduler(config: &Config, db: Option<&Path>) -> Result<Scheduler, Box<dyn Error>> {
    let path = match db {
        Some(path) => path.to_path_buf(),
        None => config.db_path()?,
    };
    let database = Database::open_at(&path)?;
    Ok(ReminderScheduler::new(database, Arc::new(SystemClock))
        .with_audio(Arc::new(TerminalBell))
        .with_notifications(Arc::new(StderrNotifications))
        .with_options(config.reminder.clone().into()))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
