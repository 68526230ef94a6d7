//! Logging utilities for the check-mysql-msr crates.
//!
//! Check plugins own stdout for their single result line, so every layer
//! installed here writes to stderr.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::{EnvFilter, fmt as tracing_fmt, prelude::*};

/// Default filter directive when neither RUST_LOG nor a configured level is set.
pub const DEFAULT_LEVEL: &str = "warn";

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(crate::Error::invalid_option(format!(
                "unknown log format {:?} (expected text or json)",
                other
            ))),
        }
    }
}

/// Build the filter: RUST_LOG wins, then `level`, then [`DEFAULT_LEVEL`].
pub fn env_filter(level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(level.unwrap_or(DEFAULT_LEVEL))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
    })
}

/// Initialize tracing with human readable output on stderr.
pub fn init(level: Option<&str>) {
    let _ = tracing_subscriber::registry()
        .with(tracing_fmt::layer().with_writer(std::io::stderr))
        .with(env_filter(level))
        .try_init();
}

/// Initialize tracing with JSON formatting on stderr.
pub fn init_json(level: Option<&str>) {
    let _ = tracing_subscriber::registry()
        .with(tracing_fmt::layer().json().with_writer(std::io::stderr))
        .with(env_filter(level))
        .try_init();
}

/// Initialize tracing in the requested format.
pub fn init_with_format(format: LogFormat, level: Option<&str>) {
    match format {
        LogFormat::Text => init(level),
        LogFormat::Json => init_json(level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_log_format_display_round_trips_serde_name() {
        let yaml = serde_json::to_string(&LogFormat::Json).unwrap();
        assert_eq!(yaml, "\"json\"");
        assert_eq!(LogFormat::Json.to_string(), "json");
    }
}
