use std::error::Error;

use clap::Subcommand;
use postureroom_core::Config;
use serde::Serialize;

use super::print_json;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value by dot path (e.g. "reminder.sound")
    Get { key: String },
    /// Change one value by dot path and save
    Set { key: String, value: String },
    /// Print the whole file plus the values the scheduler will actually use
    List,
    /// Overwrite the file with defaults
    Reset,
}

/// What a scheduler opened with this config would run with.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EffectiveConfig<'a> {
    db_path: String,
    notification_timeout_secs: u64,
    log_filter: &'a str,
    file: &'a Config,
}

impl<'a> EffectiveConfig<'a> {
    fn resolve(file: &'a Config) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            db_path: file.db_path()?.display().to_string(),
            notification_timeout_secs: file.reminder.notification_timeout_secs(),
            log_filter: &file.log.filter,
            file,
        })
    }
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn Error>> {
    let mut config = match action {
        ConfigAction::Reset => Config::default(),
        _ => Config::load()?,
    };

    match action {
        ConfigAction::Get { key } => {
            let value = config
                .get(&key)
                .ok_or_else(|| format!("unknown key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            print_json(&EffectiveConfig::resolve(&config)?)?;
        }
        ConfigAction::List => print_json(&EffectiveConfig::resolve(&config)?)?,
        ConfigAction::Reset => {
            config.save()?;
            print_json(&EffectiveConfig::resolve(&config)?)?;
        }
    }
    Ok(())
}
