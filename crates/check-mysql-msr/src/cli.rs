//! Command line flags.
//!
//! Every field is optional so that an unset flag falls through to the
//! configuration file and then to the built-in default.

use clap::{ArgAction, Parser};
use common::LogFormat;
use replcheck::StatusSyntax;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Default, Clone, PartialEq)]
#[command(name = "check-mysql-msr")]
#[command(about = "Check the replication channels of a multi-source MySQL replica")]
#[command(version, disable_version_flag = true)]
pub struct Args {
    /// Hostname of the server
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port of the server
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Username
    #[arg(short, long)]
    pub user: Option<String>,

    /// Password
    #[arg(short = 'P', long, env = "MYSQL_PWD", hide_env_values = true)]
    pub password: Option<String>,

    /// Path to a Unix socket, used instead of host and port
    #[arg(short = 'S', long)]
    pub socket: Option<PathBuf>,

    /// Connect and query deadline (e.g. "5s", "500ms")
    #[arg(long, value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// Critical threshold of Seconds_Behind_Master, 0 disables it
    #[arg(short, long, value_parser = clap::value_parser!(i64).range(0..))]
    pub critical: Option<i64>,

    /// Warning threshold of Seconds_Behind_Master, 0 disables it
    #[arg(short, long, value_parser = clap::value_parser!(i64).range(0..))]
    pub warning: Option<i64>,

    /// Status statement to issue: slave or replica
    #[arg(long)]
    pub status_syntax: Option<StatusSyntax>,

    /// YAML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format: text or json
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    pub version: (),
}

fn parse_timeout(raw: &str) -> Result<Duration, String> {
    let timeout = humantime_serde::re::humantime::parse_duration(raw).map_err(|e| e.to_string())?;
    if timeout.is_zero() {
        return Err("timeout must be greater than zero".to_string());
    }
    Ok(timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_no_flags_leaves_everything_unset() {
        let args = Args::try_parse_from(["check-mysql-msr"]).unwrap();
        assert_eq!(args.host, None);
        assert_eq!(args.port, None);
        assert_eq!(args.timeout, None);
        assert_eq!(args.warning, None);
    }

    #[test]
    fn test_short_and_long_flags() {
        let args = Args::try_parse_from([
            "check-mysql-msr",
            "-H",
            "db1",
            "-p",
            "3307",
            "-u",
            "monitor",
            "-P",
            "secret",
            "-w",
            "30",
            "-c",
            "300",
            "--timeout",
            "1500ms",
            "--status-syntax",
            "replica",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.host.as_deref(), Some("db1"));
        assert_eq!(args.port, Some(3307));
        assert_eq!(args.user.as_deref(), Some("monitor"));
        assert_eq!(args.password.as_deref(), Some("secret"));
        assert_eq!(args.warning, Some(30));
        assert_eq!(args.critical, Some(300));
        assert_eq!(args.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(args.status_syntax, Some(StatusSyntax::Replica));
        assert_eq!(args.log_format, Some(LogFormat::Json));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for argv in [
            &["check-mysql-msr", "-w", "-1"][..],
            &["check-mysql-msr", "-p", "0"],
            &["check-mysql-msr", "--timeout", "soon"],
            &["check-mysql-msr", "--timeout", "0s"],
            &["check-mysql-msr", "--status-syntax", "master"],
        ] {
            assert!(Args::try_parse_from(argv).is_err(), "{argv:?}");
        }
    }

    #[test]
    fn test_short_v_prints_version() {
        let err = Args::try_parse_from(["check-mysql-msr", "-v"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }
}
