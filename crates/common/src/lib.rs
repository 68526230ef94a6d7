//! Common utilities and types shared across the check-mysql-msr crates.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
pub use logging::LogFormat;
