//! `seal`: seal and open envelopes from the command line.
//!
//! Arguments are parsed first, then:
//! 1. Configuration: process [`Config`](config::Config) from `SEAL_*` variables.
//! 2. Telemetry: structured JSON logging on stderr.
//! 3. Command: load envelope options (optional `--config` file, then
//!    `ENVELOPE_*`) and run the subcommand over stdin/stdout.
//!
//! Failures print an `ErrorReport` JSON line on stderr and exit non-zero.

mod commands;
mod config;
mod telemetry;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::Action;

#[derive(Debug, Parser)]
#[command(name = "seal", version, about = "Seal and open authenticated envelopes")]
struct Cli {
    /// Envelope settings file (TOML or JSON), overlaid by ENVELOPE_* variables.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Seal a JSON document read from stdin and print the record.
    Seal {
        /// Seal this text as a JSON string instead of reading stdin.
        #[arg(long)]
        text: Option<String>,
    },
    /// Open a record read from stdin and print the payload as JSON.
    Open,
}

impl From<Command> for Action {
    fn from(command: Command) -> Self {
        match command {
            Command::Seal { text } => Action::Seal { text },
            Command::Open => Action::Open,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = match config::Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: seal configuration invalid: {e:#}");
            return ExitCode::from(2);
        }
    };

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    if let Err(e) = telemetry::init(&cfg) {
        eprintln!("ERROR: {e:#}");
        return ExitCode::FAILURE;
    }

    // -----------------------------------------------------------------------
    // 3. Command
    // -----------------------------------------------------------------------
    let action = Action::from(cli.command);
    match commands::run(&action, cli.config.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => commands::report(&e),
    }
}
