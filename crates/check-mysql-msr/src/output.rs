//! Check plugin result line and exit status.

use replcheck::{CheckResult, Severity};
use std::fmt;
use std::process::ExitCode;

/// Plugin status, one per exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    /// The check could not be set up
    Unknown,
}

impl Status {
    pub fn exit_code(&self) -> u8 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "OK"),
            Status::Warning => write!(f, "WARNING"),
            Status::Critical => write!(f, "CRITICAL"),
            Status::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl From<Severity> for Status {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Ok => Status::Ok,
            Severity::Warning => Status::Warning,
            Severity::Critical => Status::Critical,
        }
    }
}

/// One finished check, printed as `<name> <STATUS>: <message>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub name: String,
    pub status: Status,
    pub message: String,
}

impl Outcome {
    pub fn new(name: impl Into<String>, status: Status, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            message: message.into(),
        }
    }

    pub fn from_check(name: impl Into<String>, result: CheckResult) -> Self {
        Self::new(name, result.overall.into(), result.summary)
    }

    pub fn unknown(name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::new(name, Status::Unknown, message.to_string())
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status.exit_code())
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.name, self.status, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Status::Ok.exit_code(), 0);
        assert_eq!(Status::Warning.exit_code(), 1);
        assert_eq!(Status::Critical.exit_code(), 2);
        assert_eq!(Status::Unknown.exit_code(), 3);
    }

    #[test]
    fn test_outcome_line() {
        let result = CheckResult::new(
            Severity::Critical,
            "[Crit] b=io:No,sql:Yes,behind:0 [Warn] - [ OK ] a=io:Yes,sql:Yes,behind:0",
        );
        let outcome = Outcome::from_check("MySQL Multi Source Replication", result);
        assert_eq!(outcome.status, Status::Critical);
        assert_eq!(
            outcome.to_string(),
            "MySQL Multi Source Replication CRITICAL: [Crit] b=io:No,sql:Yes,behind:0 [Warn] - [ OK ] a=io:Yes,sql:Yes,behind:0"
        );
    }

    #[test]
    fn test_unknown_outcome() {
        let outcome = Outcome::unknown("MySQL Multi Source Replication", "bad config");
        assert_eq!(outcome.status, Status::Unknown);
        assert_eq!(
            outcome.to_string(),
            "MySQL Multi Source Replication UNKNOWN: bad config"
        );
    }
}
