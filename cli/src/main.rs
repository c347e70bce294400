//! banker CLI - command-line host for the Banker's algorithm core.
//!
//! # Architecture
//!
//! The binary is a thin collaborator around [`banker_core`]: it loads the
//! live state from a JSON state file when a command first reads it, applies
//! one command, and writes the state back through the codec whenever the
//! command mutated it.
//!
//! ```text
//! main() -> Cli::parse() -> Session::new(path) -> commands::run() -> print
//!                                    |
//!                                    v
//!                      banker_utils::read_state_file / write_state_file
//! ```

mod commands;
mod render;

use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
    sync::Mutex,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use banker_config::{BankerConfig, ExportFormat};

use crate::commands::Session;

#[derive(Parser)]
#[command(name = "banker")]
#[command(about = "Deadlock-avoidance resource allocation with the Banker's algorithm")]
struct Cli {
    /// State file (default: $BANKER_STATE, then [state].path, then ~/.banker/state.json)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replace the state with a zero-filled one of the given shape
    #[command(allow_negative_numbers = true)]
    Init { processes: i64, resources: i64 },
    /// List or load built-in scenarios
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },
    /// Edit Available or a Max/Allocation row
    Set {
        #[command(subcommand)]
        target: SetTarget,
    },
    /// Print the four matrices
    Show,
    /// Run the safety algorithm on the current state
    Check {
        /// Print every iteration of the algorithm
        #[arg(long)]
        trace: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Evaluate a resource request (preview unless --commit)
    #[command(allow_negative_numbers = true)]
    Request {
        process: usize,
        #[arg(required = true)]
        units: Vec<i64>,
        /// Apply the request to the saved state if it is approved
        #[arg(long)]
        commit: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export the state as JSON or CSV
    Export {
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace the state with one read from a JSON export
    Import { path: PathBuf },
}

#[derive(Subcommand)]
enum PresetAction {
    /// Show available scenarios
    List,
    /// Replace the state with a scenario
    Load {
        slug: String,
        /// Also make this the default scenario in the config file
        #[arg(long)]
        remember: bool,
    },
}

#[derive(Subcommand)]
enum SetTarget {
    /// Set the Available vector
    #[command(allow_negative_numbers = true)]
    Available {
        #[arg(required = true)]
        units: Vec<i64>,
    },
    /// Set the Max row of one process
    #[command(allow_negative_numbers = true)]
    Max {
        process: usize,
        #[arg(required = true)]
        units: Vec<i64>,
    },
    /// Set the Allocation row of one process
    #[command(allow_negative_numbers = true)]
    Allocation {
        process: usize,
        #[arg(required = true)]
        units: Vec<i64>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Csv,
}

impl From<FormatArg> for ExportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Csv => ExportFormat::Csv,
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::debug!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // Keep stdout clean for command output when no log file is writable.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new().create(true).append(true).open(&candidate) {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.banker/logs/banker.log
    if let Some(config_path) = BankerConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("banker.log"));
    }

    // Fallback: ./.banker/logs/banker.log
    candidates.push(PathBuf::from(".banker").join("logs").join("banker.log"));

    candidates
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = match BankerConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Warning: {err}; continuing with defaults");
            None
        }
    };

    let path = match cli.state {
        Some(path) => path,
        None => banker_config::state_path(config.as_ref())
            .context("could not determine a state file location; pass --state")?,
    };

    let mut session = Session::new(path, config.as_ref());
    let output = commands::run(cli.command, &mut session)?;
    session.save_if_dirty()?;

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
