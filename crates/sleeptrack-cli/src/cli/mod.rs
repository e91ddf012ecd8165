//! CLI entry and dispatch.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sleeptrack_core::config::{self, Config};
use sleeptrack_core::logging::{self, LogTarget};
use sleeptrack_core::{MemoryStore, SessionId, SharedStore, SleepQuality, SqliteStore};
use tracing::debug;

mod commands;

#[derive(Parser)]
#[command(name = "sleeptrack")]
#[command(version)]
#[command(about = "Track your sleep from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use this database file instead of the configured one
    #[arg(long, value_name = "PATH", global = true, env = "SLEEPTRACK_DB")]
    db: Option<PathBuf>,

    /// Keep sessions in memory only (nothing is saved)
    #[arg(long, global = true, conflicts_with = "db")]
    ephemeral: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Start recording a night
    Start,
    /// Stop recording the current night
    Stop {
        /// Rate the night right away (0-5 or a label like "pretty good")
        #[arg(short, long, value_name = "QUALITY")]
        quality: Option<SleepQuality>,
    },
    /// Show whether a night is being recorded
    Status,
    /// List recorded nights, newest first
    History {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Rate a recorded night
    Rate {
        /// The night to rate
        #[arg(value_name = "ID")]
        id: SessionId,
        /// 0-5 or a label like "so-so"
        #[arg(value_name = "QUALITY")]
        quality: SleepQuality,
    },
    /// Erase every recorded night
    Clear {
        /// Confirm the erase
        #[arg(long)]
        yes: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // The interactive UI owns the terminal, so it logs to a file.
    let _log_guard = if cli.command.is_none() {
        logging::init(LogTarget::File(config::paths::logs_dir()), "info")?
    } else {
        logging::init(LogTarget::Stderr, "warn")?
    };

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load().context("load config")?;

    let Cli {
        command,
        db,
        ephemeral,
    } = cli;

    let store = || open_store(&config, db.clone(), ephemeral);

    // default to the interactive tracker
    let Some(command) = command else {
        return sleeptrack_tui::run_interactive(config.clone(), store()?);
    };

    match command {
        Commands::Start => commands::session::start(config.clone(), store()?).await,
        Commands::Stop { quality } => {
            commands::session::stop(config.clone(), store()?, quality).await
        }
        Commands::Status => commands::session::status(config.clone(), store()?).await,
        Commands::Rate { id, quality } => {
            commands::session::rate(config.clone(), store()?, id, quality).await
        }
        Commands::Clear { yes } => commands::session::clear(config.clone(), store()?, yes).await,
        Commands::History { json } => {
            commands::history::show(config.clone(), store()?, json).await
        }
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}

fn open_store(config: &Config, db: Option<PathBuf>, ephemeral: bool) -> Result<SharedStore> {
    if ephemeral {
        debug!("Using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let path = db.unwrap_or_else(|| config.database_path());
    debug!(path = %path.display(), "Opening sleep database");
    let store = SqliteStore::open(&path)
        .with_context(|| format!("open sleep database at {}", path.display()))?;
    Ok(Arc::new(store))
}
