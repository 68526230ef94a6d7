//! Common error types for the check-mysql-msr front end.

use std::fmt;

/// A specialized Result type for check-mysql-msr operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised before a check can run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl fmt::Display) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new invalid option error.
    pub fn invalid_option(msg: impl fmt::Display) -> Self {
        Error::InvalidOption(msg.to_string())
    }
}
