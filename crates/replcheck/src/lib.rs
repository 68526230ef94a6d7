//! Multi-source replication health evaluation for MySQL.
//!
//! This crate turns one replica status query into a single verdict:
//! - Decode the variable-width status result set into channel records
//! - Classify each channel against lag thresholds
//! - Reduce the verdicts into an overall severity and an ordered summary
//!
//! The query itself runs on its own task under a deadline, so a hung
//! server can never stall the check past its timeout.
//!
//! # Example
//!
//! ```no_run
//! use replcheck::{Checker, MysqlConnector, ReplicationChecker, ThresholdConfig};
//! use mysql_wire::ConnectOptions;
//! use std::time::Duration;
//!
//! # async fn example() {
//! let connector = MysqlConnector::new(ConnectOptions {
//!     host: "db1.example.com".to_string(),
//!     ..Default::default()
//! });
//!
//! let checker = ReplicationChecker::new(
//!     connector,
//!     ThresholdConfig::new(30, 300),
//!     Duration::from_secs(5),
//! );
//!
//! let result = checker.check().await;
//! println!("{} {}: {}", checker.name(), result.overall, result.summary);
//! # }
//! ```

pub mod aggregator;
pub mod checker;
pub mod classifier;
pub mod decoder;
pub mod error;
pub mod executor;
pub mod types;

pub use aggregator::{aggregate, evaluate};
pub use checker::{Checker, Connector, MysqlConnector, ReplicationChecker};
pub use classifier::classify;
pub use decoder::{UNNAMED_CHANNEL, decode};
pub use error::CheckError;
pub use executor::{StatusSource, query_with_deadline};
pub use types::{
    ChannelVerdict, CheckResult, ReplicationChannel, Severity, StatusColumns, StatusSyntax,
    ThresholdConfig,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Ok.to_string(), "OK");
        assert_eq!(Severity::Warning.to_string(), "WARNING");
        assert_eq!(Severity::Critical.to_string(), "CRITICAL");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::Warning);
        assert!(Severity::Warning > Severity::Ok);
    }

    #[test]
    fn test_check_result_from_error() {
        let result = CheckResult::from_error(&CheckError::Timeout);
        assert!(!result.is_ok());
        assert_eq!(result.overall, Severity::Critical);
        assert_eq!(result.summary, "Connection or query timeout");
    }

    #[test]
    fn test_status_syntax_parse() {
        assert_eq!("slave".parse::<StatusSyntax>().unwrap(), StatusSyntax::Slave);
        assert_eq!(
            "replica".parse::<StatusSyntax>().unwrap(),
            StatusSyntax::Replica
        );
        assert!("master".parse::<StatusSyntax>().is_err());
        assert_eq!(StatusSyntax::Replica.query(), "SHOW REPLICA STATUS");
    }

    #[test]
    fn test_check_result_serializes_lowercase_severity() {
        let result = CheckResult::new(Severity::Warning, "[Crit] - [Warn] a [ OK ] -");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["overall"], "warning");
        assert_eq!(json["summary"], "[Crit] - [Warn] a [ OK ] -");
    }
}
