//! Logging for the `seal` binary: JSON lines on stderr, so stdout holds
//! nothing but command output.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install the global subscriber. A valid `RUST_LOG` overrides
/// `SEAL_LOG_LEVEL`.
pub fn init(cfg: &Config) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => cfg.log_filter()?,
    };

    tracing_subscriber::fmt()
        .json()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("a tracing subscriber is already installed")
}
