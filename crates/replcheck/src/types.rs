//! Replication check types and structures.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CheckError;

/// Check severity, ordered so that the most severe value is the maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// All channels within thresholds
    Ok,
    /// At least one channel over the warning threshold
    Warning,
    /// A channel is stopped, over the critical threshold, or the check failed
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Ok => write!(f, "OK"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// One replication channel as reported by the replica
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationChannel {
    /// Channel name, `"-"` when the server has no channel column
    pub channel_name: String,

    /// Receiver (IO) thread is running
    pub io_running: bool,

    /// Applier (SQL) thread is running
    pub sql_running: bool,

    /// Replication lag in seconds
    pub seconds_behind: i64,
}

impl ReplicationChannel {
    pub fn new(
        channel_name: impl Into<String>,
        io_running: bool,
        sql_running: bool,
        seconds_behind: i64,
    ) -> Self {
        Self {
            channel_name: channel_name.into(),
            io_running,
            sql_running,
            seconds_behind,
        }
    }

    /// Both replication threads are running
    pub fn is_running(&self) -> bool {
        self.io_running && self.sql_running
    }
}

/// Lag thresholds in seconds. Zero disables a threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub warn_seconds: i64,
    pub crit_seconds: i64,
}

impl ThresholdConfig {
    pub fn new(warn_seconds: i64, crit_seconds: i64) -> Self {
        Self {
            warn_seconds,
            crit_seconds,
        }
    }
}

/// Classification of a single channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelVerdict {
    pub channel: ReplicationChannel,
    pub severity: Severity,
    /// `<name>=io:<Yes|No>,sql:<Yes|No>,behind:<seconds>`
    pub message: String,
}

/// Outcome of one replication check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub overall: Severity,
    pub summary: String,
}

impl CheckResult {
    pub fn new(overall: Severity, summary: impl Into<String>) -> Self {
        Self {
            overall,
            summary: summary.into(),
        }
    }

    /// Collapse a failed check into a CRITICAL result carrying the error text
    pub fn from_error(error: &CheckError) -> Self {
        Self::new(error.severity(), error.to_string())
    }

    pub fn is_ok(&self) -> bool {
        self.overall == Severity::Ok
    }
}

/// Column names of one status statement flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusColumns {
    pub io_running: &'static str,
    pub sql_running: &'static str,
    pub seconds_behind: &'static str,
    pub channel_name: &'static str,
}

/// Which replica status statement to issue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusSyntax {
    /// `SHOW SLAVE STATUS` (MySQL 5.x, MariaDB, MySQL 8.0 before 8.0.22)
    #[default]
    Slave,
    /// `SHOW REPLICA STATUS` (MySQL 8.0.22 and later)
    Replica,
}

impl StatusSyntax {
    pub fn query(&self) -> &'static str {
        match self {
            StatusSyntax::Slave => "SHOW SLAVE STATUS",
            StatusSyntax::Replica => "SHOW REPLICA STATUS",
        }
    }

    pub fn columns(&self) -> StatusColumns {
        match self {
            StatusSyntax::Slave => StatusColumns {
                io_running: "Slave_IO_Running",
                sql_running: "Slave_SQL_Running",
                seconds_behind: "Seconds_Behind_Master",
                channel_name: "Channel_Name",
            },
            StatusSyntax::Replica => StatusColumns {
                io_running: "Replica_IO_Running",
                sql_running: "Replica_SQL_Running",
                seconds_behind: "Seconds_Behind_Source",
                channel_name: "Channel_Name",
            },
        }
    }
}

impl fmt::Display for StatusSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusSyntax::Slave => write!(f, "slave"),
            StatusSyntax::Replica => write!(f, "replica"),
        }
    }
}

impl FromStr for StatusSyntax {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slave" => Ok(StatusSyntax::Slave),
            "replica" => Ok(StatusSyntax::Replica),
            other => Err(format!(
                "unknown status syntax {:?} (expected slave or replica)",
                other
            )),
        }
    }
}
