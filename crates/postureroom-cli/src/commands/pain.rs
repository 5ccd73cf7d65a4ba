use std::path::Path;

use clap::Subcommand;
use postureroom_core::{Config, PainLocation};

use super::{open_scheduler, print_json};

#[derive(Subcommand)]
pub enum PainAction {
    /// Record a pain report
    Log {
        /// Pain level, 0-10
        level: u8,
        /// NECK, UPPER_BACK, LOWER_BACK, SHOULDERS, WRISTS or OTHER
        location: PainLocation,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// List reports from the last N days
    List {
        #[arg(long, default_value = "7")]
        days: u32,
    },
    /// Summarize reports from the last N days
    Summary {
        #[arg(long, default_value = "7")]
        days: u32,
    },
    /// Delete every report
    Clear,
}

pub fn run(
    action: PainAction,
    config: &Config,
    db: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut scheduler = open_scheduler(config, db)?;

    match action {
        PainAction::Log {
            level,
            location,
            notes,
        } => {
            let log = scheduler.log_pain(level, location, notes);
            print_json(&log)?;
        }
        PainAction::List { days } => print_json(&scheduler.pain_logs(days))?,
        PainAction::Summary { days } => print_json(&scheduler.pain_summary(days))?,
        PainAction::Clear => {
            scheduler.clear_logs();
            println!("pain log cleared");
        }
    }
    Ok(())
}
