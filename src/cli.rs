//! Command-line interface for namecolor.
//!
//! With no subcommand (or `console`) the binary runs the interactive console
//! host. The `get`/`set`/`remove`/`list` subcommands edit the player data file
//! directly and save synchronously before exiting.

use crate::colors::{self, NameColor};
use crate::config::{self, PluginConfig};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use namecolor_store::{FsDataFile, PreferenceStore, TaskScheduler, UserId};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// namecolor - persistent, permission-gated player name colors
#[derive(Parser)]
#[command(name = "namecolor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Folder holding config.yaml and the player data file
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Set log level (overrides RUST_LOG)
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,

    /// Also append log output to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the interactive console host (default)
    Console {
        /// Print raw § color codes instead of ANSI colors
        #[arg(long)]
        no_ansi: bool,
    },

    /// Print the saved color for a player id
    Get {
        /// Player UUID
        uuid: UserId,
    },

    /// Save a color for a player id
    Set {
        /// Player UUID
        uuid: UserId,
        /// Color name, e.g. `red` or `darkaqua`
        color: String,
    },

    /// Remove the saved color for a player id
    Remove {
        /// Player UUID
        uuid: UserId,
    },

    /// List every saved color
    List,
}

/// Options for the console host
#[derive(Clone, Debug)]
pub struct ConsoleOptions {
    pub data_folder: PathBuf,
    pub ansi: bool,
}

/// Result of CLI processing
pub enum CliResult {
    /// Run the console host
    Console(ConsoleOptions),
    /// Exit with the given code (subcommand completed)
    Exit(i32),
}

/// Parse arguments, install logging, and run any one-shot subcommand.
pub fn process_cli(scheduler: Arc<dyn TaskScheduler>) -> CliResult {
    let cli = Cli::parse();

    crate::debug::init_log_bridge(
        cli.log_level.map(LogLevelArg::to_level_filter),
        cli.log_file.as_deref(),
    );

    let data_folder = config::resolve_data_folder(cli.data_dir.as_deref());

    let result = match cli.command {
        None => {
            return CliResult::Console(ConsoleOptions {
                data_folder,
                ansi: true,
            });
        }
        Some(Commands::Console { no_ansi }) => {
            return CliResult::Console(ConsoleOptions {
                data_folder,
                ansi: !no_ansi,
            });
        }
        Some(command) => run_data_command(command, &data_folder, scheduler, &mut std::io::stdout()),
    };

    match result {
        Ok(()) => CliResult::Exit(0),
        Err(e) => {
            eprintln!("namecolor: error: {e:#}");
            CliResult::Exit(1)
        }
    }
}

/// Run `get`/`set`/`remove`/`list` against the data file in `data_folder`.
pub fn run_data_command(
    command: Commands,
    data_folder: &Path,
    scheduler: Arc<dyn TaskScheduler>,
    out: &mut dyn Write,
) -> Result<()> {
    let config = PluginConfig::load(data_folder)
        .with_context(|| format!("loading config from {}", data_folder.display()))?;
    let data_file = FsDataFile::new(config.data_file_path(data_folder));
    let store = PreferenceStore::builder(Arc::new(data_file), scheduler)
        .flush_wait_timeout(config.flush_wait_timeout())
        .open();

    match command {
        Commands::Get { uuid } => match store.get(&uuid) {
            Some(color) => writeln!(out, "{color}")?,
            None => bail!("no color saved for {uuid}"),
        },
        Commands::Set { uuid, color } => {
            let Some(color) = NameColor::from_name(&color) else {
                bail!(
                    "unknown color '{color}', expected one of: {}",
                    NameColor::ALL.map(|c| c.name()).join(", ")
                );
            };
            store.set(uuid, color.name());
            store.flush_sync()?;
            writeln!(out, "{uuid} -> {}", color.name())?;
        }
        Commands::Remove { uuid } => {
            if !store.has(&uuid) {
                bail!("no color saved for {uuid}");
            }
            store.remove(&uuid);
            store.flush_sync()?;
            writeln!(out, "removed {uuid}")?;
        }
        Commands::List => {
            for (id, color) in store.entries() {
                let painted = match NameColor::from_name(&color) {
                    Some(c) => colors::to_ansi(&c.paint(&color)),
                    None => color,
                };
                writeln!(out, "{id} {painted}")?;
            }
        }
        Commands::Console { .. } => bail!("console is not a data command"),
    }
    Ok(())
}
