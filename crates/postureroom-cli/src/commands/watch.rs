//! Foreground reminder loop.
//!
//! Sleeps until the scheduler's next wakeup, ticks it, and applies control
//! commands read line by line from stdin. Every scheduler event is written
//! to stdout as one JSON line.

use std::path::Path;
use std::str::FromStr;

use chrono::Utc;
use postureroom_core::{Config, PainLocation, ReminderEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{info, warn};

use super::{open_scheduler, Scheduler};

/// Idle sleep when nothing is armed; stdin and ctrl-c still wake the loop.
const IDLE_POLL: std::time::Duration = std::time::Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq)]
pub enum WatchCommand {
    Start,
    Stop,
    Snooze(u32),
    Dismiss,
    Meeting(bool),
    Focus(bool),
    Pain(u8, PainLocation),
    Status,
    Quit,
}

fn parse_toggle(word: Option<&str>) -> Result<bool, String> {
    match word {
        Some("on") => Ok(true),
        Some("off") => Ok(false),
        other => Err(format!("expected on|off, got {:?}", other.unwrap_or(""))),
    }
}

impl FromStr for WatchCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let cmd = words.next().ok_or("empty command")?;
        let cmd = match cmd {
            "start" => Self::Start,
            "stop" => Self::Stop,
            "snooze" => {
                let minutes = words.next().ok_or("snooze needs minutes")?;
                Self::Snooze(minutes.parse::<u32>().map_err(|e| format!("minutes: {e}"))?)
            }
            "dismiss" => Self::Dismiss,
            "meeting" => Self::Meeting(parse_toggle(words.next())?),
            "focus" => Self::Focus(parse_toggle(words.next())?),
            "pain" => {
                let level = words.next().ok_or("pain needs a level")?;
                let level = level.parse::<u8>().map_err(|e| format!("level: {e}"))?;
                let location = words.next().ok_or("pain needs a location")?;
                Self::Pain(level, location.parse::<PainLocation>().map_err(|e| e.to_string())?)
            }
            "status" => Self::Status,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command: {other}")),
        };
        match words.next() {
            Some(extra) => Err(format!("unexpected argument: {extra}")),
            None => Ok(cmd),
        }
    }
}

/// Apply a command. Returns `false` when the loop should end.
fn apply(scheduler: &mut Scheduler, command: WatchCommand) -> Result<bool, serde_json::Error> {
    match command {
        WatchCommand::Start => scheduler.start_reminders(),
        WatchCommand::Stop => scheduler.stop_reminders(),
        WatchCommand::Snooze(minutes) => scheduler.snooze(minutes),
        WatchCommand::Dismiss => scheduler.dismiss_reminder(),
        WatchCommand::Meeting(on) => scheduler.set_in_meeting(on),
        WatchCommand::Focus(on) => scheduler.set_in_focus_mode(on),
        WatchCommand::Pain(level, location) => {
            scheduler.log_pain(level, location, None);
        }
        WatchCommand::Status => println!("{}", serde_json::to_string(&scheduler.snapshot())?),
        WatchCommand::Quit => return Ok(false),
    }
    Ok(true)
}

fn drain(events: &mut broadcast::Receiver<ReminderEvent>) -> Result<(), serde_json::Error> {
    loop {
        match events.try_recv() {
            Ok(event) => println!("{}", serde_json::to_string(&event)?),
            Err(broadcast::error::TryRecvError::Lagged(n)) => {
                warn!(skipped = n, "event output fell behind");
            }
            Err(_) => return Ok(()),
        }
    }
}

pub fn run(
    start: bool,
    config: &Config,
    db: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut scheduler = open_scheduler(config, db)?;
    let mut events = scheduler.subscribe();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .enable_io()
        .build()?;

    runtime.block_on(async move {
        if start {
            scheduler.start_reminders();
        } else {
            scheduler.schedule_next_reminder();
        }
        drain(&mut events)?;
        info!("watching for reminders; type `quit` or press ctrl-c to exit");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        loop {
            let sleep_for = scheduler
                .next_wakeup()
                .map(|at| (at - Utc::now()).to_std().unwrap_or_default())
                .unwrap_or(IDLE_POLL);

            tokio::select! {
                _ = tokio::time::sleep(sleep_for) => {
                    scheduler.tick();
                }
                line = lines.next_line(), if stdin_open => match line? {
                    Some(line) if line.trim().is_empty() => {}
                    Some(line) => match line.parse::<WatchCommand>() {
                        Ok(command) => {
                            if !apply(&mut scheduler, command)? {
                                break;
                            }
                        }
                        Err(e) => eprintln!("error: {e}"),
                    },
                    None => stdin_open = false,
                },
                _ = tokio::signal::ctrl_c() => break,
            }
            drain(&mut events)?;
        }

        scheduler.stop_reminders();
        drain(&mut events)?;
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}
