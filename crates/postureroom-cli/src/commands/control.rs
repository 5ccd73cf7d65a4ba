use std::path::Path;

use clap::{Subcommand, ValueEnum};
use postureroom_core::Config;

use super::{open_scheduler, print_json};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl From<Toggle> for bool {
    fn from(t: Toggle) -> Self {
        t == Toggle::On
    }
}

#[derive(Subcommand)]
pub enum ControlAction {
    /// Enable reminders and restart the cadence from now
    Start,
    /// Cancel the pending reminder
    Stop,
    /// Suppress reminders for a number of minutes
    Snooze {
        /// Minutes to snooze
        minutes: u32,
    },
    /// Acknowledge the current reminder and arm the next one
    Dismiss,
    /// Mark whether you are in a meeting
    Meeting {
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Mark whether you are in focus mode
    Focus {
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Print the scheduler snapshot as JSON
    Status,
}

pub fn run(
    action: ControlAction,
    config: &Config,
    db: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut scheduler = open_scheduler(config, db)?;

    match action {
        ControlAction::Start => scheduler.start_reminders(),
        ControlAction::Stop => scheduler.stop_reminders(),
        ControlAction::Snooze { minutes } => scheduler.snooze(minutes),
        ControlAction::Dismiss => scheduler.dismiss_reminder(),
        ControlAction::Meeting { state } => scheduler.set_in_meeting(state.into()),
        ControlAction::Focus { state } => scheduler.set_in_focus_mode(state.into()),
        ControlAction::Status => {}
    }

    print_json(&scheduler.snapshot())
}
