//! check-mysql-msr check plugin
//!
//! Wires flags and the optional YAML file into a [`ReplicationChecker`] and
//! renders its verdict as a single check plugin line.

pub mod cli;
pub mod config;
pub mod output;

pub use cli::Args;
pub use config::{Config, ConfigError};
pub use output::{Outcome, Status};

use replcheck::checker::DEFAULT_NAME;
use replcheck::{Checker, MysqlConnector, ReplicationChecker};

/// Resolve the effective configuration: flags over file over defaults
pub fn resolve_config(args: &Args) -> common::Result<Config> {
    let config = Config::load(args.config.as_deref())?.merge_args(args)?;
    Ok(config)
}

/// Build the checker described by `config`
pub fn build_checker(config: &Config) -> ReplicationChecker<MysqlConnector> {
    ReplicationChecker::new(
        MysqlConnector::new(config.to_connect_options()),
        config.thresholds(),
        config.check.timeout,
    )
    .with_syntax(config.check.status_syntax)
}

/// Run one check and turn it into the plugin outcome
pub async fn run(config: &Config) -> Outcome {
    let checker = build_checker(config);
    tracing::debug!(
        target = %config.to_connect_options().address(),
        syntax = %config.check.status_syntax,
        timeout_ms = config.check.timeout.as_millis(),
        "Running replication check"
    );
    let result = checker.check().await;
    Outcome::from_check(checker.name(), result)
}

/// Outcome for a configuration that could not be resolved
pub fn config_failure(err: &common::Error) -> Outcome {
    Outcome::unknown(DEFAULT_NAME, err)
}
