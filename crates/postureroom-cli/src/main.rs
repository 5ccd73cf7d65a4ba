use std::path::PathBuf;

use clap::{Parser, Subcommand};
use postureroom_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod host;

#[derive(Parser)]
#[command(name = "postureroom-cli", version, about = "Postureroom CLI")]
struct Cli {
    /// Database path, overriding `storage.db_path` from the config file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Control(commands::control::ControlAction),
    /// Reminder settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Pain log
    Pain {
        #[command(subcommand)]
        action: commands::pain::PainAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Run the reminder loop, reading commands from stdin
    Watch {
        /// Start reminders immediately
        #[arg(long)]
        start: bool,
    },
}

fn init_tracing(config: &Config) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log.filter)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_tracing(&config);

    let db = cli.db.as_deref();
    let result = match cli.command {
        Commands::Control(action) => commands::control::run(action, &config, db),
        Commands::Settings { action } => commands::settings::run(action, &config, db),
        Commands::Pain { action } => commands::pain::run(action, &config, db),
        Commands::Config { action } => commands::config::run(action),
        Commands::Watch { start } => commands::watch::run(start, &config, db),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
