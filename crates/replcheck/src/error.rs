//! Check failure taxonomy.

use crate::types::Severity;

/// Reasons a replication check could not produce per-channel results
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// The server could not be reached or refused the login
    #[error("couldn't connect DB: {0}")]
    Connection(mysql_wire::Error),

    /// The status query failed after connecting
    #[error("{0}")]
    Query(mysql_wire::Error),

    /// A mandatory status column is missing from the result set
    #[error("Could not find {io_running} or {sql_running} or {seconds_behind} in columns")]
    Schema {
        io_running: &'static str,
        sql_running: &'static str,
        seconds_behind: &'static str,
    },

    /// A lag value is not a base-10 integer
    #[error("invalid {column} value {value}: {reason}")]
    Parse {
        column: &'static str,
        value: String,
        reason: String,
    },

    /// The server reports no replication channels
    #[error("No replication settings")]
    NoChannels,

    /// The deadline elapsed before the status query completed
    #[error("Connection or query timeout")]
    Timeout,

    /// The query task panicked or was cancelled
    #[error("status query task failed: {0}")]
    Task(String),
}

impl CheckError {
    /// Every failure is terminal for the invocation and reported as CRITICAL.
    pub fn severity(&self) -> Severity {
        Severity::Critical
    }
}
