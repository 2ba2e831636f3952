use std::env;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use crate::catalog;
use crate::config::{ConfigLoader, CONFIG_ENV, DATA_ENV};
use crate::storage;

pub mod commands;

use self::commands::{FavoriteArgs, ListArgs, NoteArgs};

#[derive(Parser, Debug)]
#[command(
    name = "clubdeck",
    version,
    about = "Browse clubs, keep favorites and notes, from the terminal"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the config file location (takes precedence over CLUBDECK_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the data directory (takes precedence over CLUBDECK_DATA)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Read clubs from this JSON file instead of the configured catalog
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive TUI (default)
    Tui,
    /// Print one page of clubs, optionally filtered by name
    List(ListArgs),
    /// Print favorite clubs with their notes
    Favorites,
    /// Add a club to favorites, or remove it if already there
    Favorite(FavoriteArgs),
    /// Set or delete the note on a club
    Note(NoteArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogTarget {
    Stderr,
    File,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        env::set_var(CONFIG_ENV, path);
    }
    if let Some(path) = &cli.data_dir {
        env::set_var(DATA_ENV, path);
    }

    let command = cli.command.unwrap_or(Commands::Tui);
    let target = match command {
        Commands::Tui => LogTarget::File,
        _ => LogTarget::Stderr,
    };

    let loader = ConfigLoader::discover()?;
    loader.paths().ensure_directories()?;
    let paths = loader.paths().clone();
    init_tracing(&cli.log_level, target, &paths.log_dir)
        .with_context(|| format!("initialising logging at level {}", cli.log_level))?;
    let mut config = loader.load_or_init()?;
    if let Some(path) = cli.catalog {
        config.catalog.override_path(path);
    }
    if config.catalog.uses_default_path {
        catalog::seed_default_catalog(&config.catalog.path)?;
    }
    let store = storage::init(&config.storage)?;
    tracing::debug!(
        config = %paths.config_file.display(),
        catalog = %config.catalog.path.display(),
        "configuration resolved"
    );

    let config = Arc::new(config);
    match command {
        Commands::Tui => commands::run_tui(config, store),
        Commands::List(args) => commands::list_clubs(&config, store, args),
        Commands::Favorites => commands::show_favorites(&config, store),
        Commands::Favorite(args) => commands::toggle_favorite(&config, store, args),
        Commands::Note(args) => commands::edit_note(&config, store, args),
    }
}

fn init_tracing(level: &str, target: LogTarget, log_dir: &Path) -> Result<()> {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_try_init(|| {
        let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
        match target {
            LogTarget::Stderr => fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init(),
            LogTarget::File => {
                // stderr would tear the alternate screen
                fs::create_dir_all(log_dir)
                    .with_context(|| format!("creating log directory {}", log_dir.display()))?;
                let path = log_dir.join("clubdeck.log");
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .with_context(|| format!("opening log file {}", path.display()))?;
                fmt()
                    .with_env_filter(env_filter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .init();
            }
        }
        Ok(())
    })
    .map(|_| ())
}
