//! `seal` and `open` subcommands.

use std::io::{self, Read, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use common::{EnvelopeError, ErrorReport};
use envelope::{Envelope, EnvelopeOptions};
use serde_json::Value;
use tracing::info;

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Seal `text` as a JSON string, or stdin as a JSON document.
    Seal { text: Option<String> },
    /// Open a record from stdin.
    Open,
}

/// Build the envelope, run `action` against stdin, print the result to stdout.
pub fn run(action: &Action, config_file: Option<&Path>) -> Result<()> {
    let options = EnvelopeOptions::load(config_file)?;
    let envelope = Envelope::new(options)?;
    info!(algorithm = %envelope.algorithm(), action = action_name(action), "envelope ready");

    let output = match action {
        Action::Seal { text: Some(text) } => seal_input(&envelope, Some(text), "")?,
        Action::Seal { text: None } => seal_input(&envelope, None, &read_stdin()?)?,
        Action::Open => open_input(&envelope, &read_stdin()?)?,
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{output}").context("failed to write to stdout")?;
    Ok(())
}

fn action_name(action: &Action) -> &'static str {
    match action {
        Action::Seal { .. } => "seal",
        Action::Open => "open",
    }
}

fn read_stdin() -> Result<String> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;
    Ok(input)
}

/// Seal `text` as a JSON string if given, otherwise `input` as a JSON document.
pub fn seal_input(envelope: &Envelope, text: Option<&str>, input: &str) -> Result<String, EnvelopeError> {
    match text {
        Some(text) => envelope.seal(text),
        None => {
            let document: Value = serde_json::from_str(input)
                .map_err(|e| EnvelopeError::Parse(format!("input is not a JSON document: {e}")))?;
            envelope.seal(&document)
        }
    }
}

/// Open the record in `input` and render the payload as compact JSON.
pub fn open_input(envelope: &Envelope, input: &str) -> Result<String, EnvelopeError> {
    let payload: Value = envelope.open(input.trim_end())?;
    Ok(payload.to_string())
}

/// Print a machine-readable report for `err` on stderr and pick the exit code.
pub fn report(err: &anyhow::Error) -> ExitCode {
    let (report, code) = describe(err);
    match serde_json::to_string(&report) {
        Ok(line) => eprintln!("{line}"),
        Err(_) => eprintln!("{}: {}", report.code, report.message),
    }
    ExitCode::from(code)
}

fn describe(err: &anyhow::Error) -> (ErrorReport, u8) {
    match err.downcast_ref::<EnvelopeError>() {
        Some(e) => (ErrorReport::from(e), e.exit_code()),
        None => (ErrorReport::new("io", format!("{err:#}")), 1),
    }
}
