//! `SEAL_*` settings for the binary itself.
//!
//! Envelope settings are loaded separately through
//! [`envelope::EnvelopeOptions::load`].

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// `EnvFilter` directives, from `SEAL_LOG_LEVEL`.
    #[serde(default = "Config::default_log_level")]
    pub log_level: String,
}

impl Config {
    fn default_log_level() -> String {
        "info".into()
    }

    /// Read `SEAL_*` variables and check that the log filter parses.
    pub fn from_env() -> Result<Self> {
        let settings: Config = config::Config::builder()
            .add_source(config::Environment::with_prefix("SEAL"))
            .build()
            .and_then(|built| built.try_deserialize())
            .context("unreadable SEAL_* settings")?;
        settings.log_filter()?;
        Ok(settings)
    }

    /// The parsed log filter. Blank or malformed directives are refused.
    pub fn log_filter(&self) -> Result<EnvFilter> {
        let directives = self.log_level.trim();
        anyhow::ensure!(!directives.is_empty(), "SEAL_LOG_LEVEL is blank");
        EnvFilter::try_new(directives)
            .with_context(|| format!("SEAL_LOG_LEVEL {directives:?} is not a log filter"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_level(level: &str) -> Config {
        Config {
            log_level: level.into(),
        }
    }

    #[test]
    fn level_defaults_to_info() {
        assert_eq!(Config::default_log_level(), "info");
    }

    #[test]
    fn validate_rejects_blank_level() {
        assert!(with_level("  ").log_filter().is_err());
    }

    #[test]
    fn malformed_directive_is_refused() {
        assert!(with_level("envelope=loud").log_filter().is_err());
    }

    #[test]
    fn per_target_directives_parse() {
        assert!(with_level("envelope=debug,info").log_filter().is_ok());
    }
}
