use std::path::Path;

use clap::Subcommand;
use postureroom_core::{Config, Settings, SettingsPatch};

use super::{open_scheduler, print_json};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Get a setting value
    Get {
        /// Setting key (e.g. "interval", "workDays")
        key: String,
    },
    /// Set a setting value
    Set {
        /// Setting key
        key: String,
        /// New value; lists are given as JSON (e.g. "[1,2,3]")
        value: String,
    },
    /// List all settings
    List,
    /// Reset settings to defaults
    Reset,
}

pub fn run(
    action: SettingsAction,
    config: &Config,
    db: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut scheduler = open_scheduler(config, db)?;

    match action {
        SettingsAction::Get { key } => match scheduler.settings().get_value(&key) {
            Some(value) => println!("{value}"),
            None => return Err(format!("unknown key: {key}").into()),
        },
        SettingsAction::Set { key, value } => {
            let patch = SettingsPatch::from_key_value(scheduler.settings(), &key, &value)?;
            let mut preview = scheduler.settings().clone();
            preview.apply(patch.clone());
            preview.validate()?;
            scheduler.update_settings(patch);
            print_json(scheduler.settings())?;
        }
        SettingsAction::List => print_json(scheduler.settings())?,
        SettingsAction::Reset => {
            scheduler.update_settings(Settings::default().into());
            print_json(scheduler.settings())?;
        }
    }
    Ok(())
}
