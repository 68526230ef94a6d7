//! Replication check implementations.

use crate::aggregator::evaluate;
use crate::error::CheckError;
use crate::executor::{StatusSource, query_with_deadline};
use crate::types::{CheckResult, StatusSyntax, ThresholdConfig};
use async_trait::async_trait;
use mysql_wire::ConnectOptions;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Default checker name shown in the output line
pub const DEFAULT_NAME: &str = "MySQL Multi Source Replication";

/// Checker trait
#[async_trait]
pub trait Checker: Send + Sync {
    /// Run one check
    async fn check(&self) -> CheckResult;

    /// Get the name of this checker
    fn name(&self) -> &str;
}

/// Opens an authenticated status source
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn StatusSource>, CheckError>;

    /// Address used in logs and connection errors
    fn target(&self) -> String;
}

/// Connector for a real MySQL server over TCP or a Unix socket
#[derive(Debug, Clone)]
pub struct MysqlConnector {
    options: ConnectOptions,
}

impl MysqlConnector {
    pub fn new(options: ConnectOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConnectOptions {
        &self.options
    }

    #[cfg(unix)]
    async fn connect_socket(&self) -> Result<Box<dyn StatusSource>, CheckError> {
        let conn = mysql_wire::connect_unix(&self.options)
            .await
            .map_err(CheckError::Connection)?;
        Ok(Box::new(conn))
    }

    #[cfg(not(unix))]
    async fn connect_socket(&self) -> Result<Box<dyn StatusSource>, CheckError> {
        Err(CheckError::Connection(mysql_wire::Error::protocol(
            "unix sockets are not supported on this platform",
        )))
    }
}

#[async_trait]
impl Connector for MysqlConnector {
    async fn connect(&self) -> Result<Box<dyn StatusSource>, CheckError> {
        if self.options.socket.is_some() {
            return self.connect_socket().await;
        }

        let conn = mysql_wire::connect_tcp(&self.options)
            .await
            .map_err(CheckError::Connection)?;
        Ok(Box::new(conn))
    }

    fn target(&self) -> String {
        self.options.address()
    }
}

/// Multi-source replication checker.
///
/// Connects, runs the status query under the deadline, then classifies and
/// aggregates every channel. Any failure collapses to a CRITICAL result
/// carrying the error message.
pub struct ReplicationChecker<C = MysqlConnector> {
    connector: C,
    thresholds: ThresholdConfig,
    timeout_duration: Duration,
    syntax: StatusSyntax,
    name: String,
}

impl<C: Connector> ReplicationChecker<C> {
    /// Create a new replication checker
    pub fn new(connector: C, thresholds: ThresholdConfig, timeout_duration: Duration) -> Self {
        Self {
            connector,
            thresholds,
            timeout_duration,
            syntax: StatusSyntax::default(),
            name: DEFAULT_NAME.to_string(),
        }
    }

    pub fn with_syntax(mut self, syntax: StatusSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Run the check, keeping the failure cause
    pub async fn run(&self) -> Result<CheckResult, CheckError> {
        let target = self.connector.target();

        let source = match timeout(self.timeout_duration, self.connector.connect()).await {
            Ok(source) => source?,
            Err(_) => {
                return Err(CheckError::Connection(mysql_wire::Error::Connect {
                    addr: target,
                    reason: "i/o timeout".to_string(),
                }));
            }
        };

        let channels = query_with_deadline(source, self.syntax, self.timeout_duration).await?;
        evaluate(channels, &self.thresholds)
    }
}

#[async_trait]
impl<C: Connector> Checker for ReplicationChecker<C> {
    async fn check(&self) -> CheckResult {
        let start = Instant::now();

        match self.run().await {
            Ok(result) => {
                debug!(
                    target = %self.connector.target(),
                    severity = %result.overall,
                    duration_ms = start.elapsed().as_millis(),
                    "Replication check finished"
                );
                result
            }
            Err(e) => {
                warn!(
                    target = %self.connector.target(),
                    error = %e,
                    duration_ms = start.elapsed().as_millis(),
                    "Replication check failed"
                );
                CheckResult::from_error(&e)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    #[test]
    fn test_mysql_connector_target() {
        let connector = MysqlConnector::new(ConnectOptions {
            host: "db1".to_string(),
            port: 3307,
            ..Default::default()
        });
        assert_eq!(connector.target(), "db1:3307");

        let socket = MysqlConnector::new(ConnectOptions {
            socket: Some("/var/run/mysqld/mysqld.sock".into()),
            ..Default::default()
        });
        assert_eq!(socket.target(), "unix:/var/run/mysqld/mysqld.sock");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_critical() {
        // port 1 on loopback refuses connections
        let connector = MysqlConnector::new(ConnectOptions {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..Default::default()
        });
        let checker = ReplicationChecker::new(
            connector,
            ThresholdConfig::default(),
            Duration::from_secs(2),
        );

        let result = checker.check().await;
        assert_eq!(result.overall, Severity::Critical);
        assert!(result.summary.starts_with("couldn't connect DB: "));
        assert_eq!(checker.name(), DEFAULT_NAME);
    }
}
