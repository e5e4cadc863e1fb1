//! Logging configuration and subscriber setup

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::domain::errors::DomainError;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Pretty,
    /// JSON format for structured logging
    Json,
}

/// Parse a log level name
pub fn parse_level(level: &str) -> Result<tracing::Level, DomainError> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(tracing::Level::TRACE),
        "debug" => Ok(tracing::Level::DEBUG),
        "info" => Ok(tracing::Level::INFO),
        "warn" => Ok(tracing::Level::WARN),
        "error" => Ok(tracing::Level::ERROR),
        _ => Err(DomainError::BadArgs(format!(
            "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
            level
        ))),
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
/// Logs go to stderr so stdout stays free for command output.
pub fn init_logging(level: &str, format: LogFormat) -> Result<(), DomainError> {
    let level = parse_level(level)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    // a subscriber installed earlier (tests, embedding) wins
    if let Err(e) = result {
        tracing::debug!("Logging already initialized: {}", e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("INFO").unwrap(), tracing::Level::INFO);
        assert_eq!(parse_level(" trace ").unwrap(), tracing::Level::TRACE);
        assert!(parse_level("verbose").is_err());
    }

    #[test]
    fn test_init_twice_is_harmless() {
        assert!(init_logging("warn", LogFormat::Pretty).is_ok());
        assert!(init_logging("debug", LogFormat::Json).is_ok());
    }
}
