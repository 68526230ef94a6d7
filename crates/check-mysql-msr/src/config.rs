//! Configuration loading and validation for check-mysql-msr

use crate::cli::Args;
use common::LogFormat;
use mysql_wire::ConnectOptions;
use replcheck::{StatusSyntax, ThresholdConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationError};

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

impl From<ConfigError> for common::Error {
    fn from(err: ConfigError) -> Self {
        common::Error::config(err)
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mysql: MysqlSettings,

    #[serde(default)]
    pub check: CheckSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Validate for Config {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        self.mysql.validate()?;
        self.check.validate()?;
        Ok(())
    }
}

/// Server connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MysqlSettings {
    #[validate(length(min = 1))]
    pub host: String,

    #[validate(range(min = 1, max = 65535))]
    pub port: u16,

    #[validate(length(min = 1))]
    pub user: String,

    pub password: String,

    #[validate(custom = "validate_socket_path")]
    pub socket: Option<String>,
}

/// Evaluation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CheckSettings {
    #[serde(with = "humantime_serde")]
    #[validate(custom = "validate_timeout")]
    pub timeout: Duration,

    #[validate(range(min = 0))]
    pub warning: i64,

    #[validate(range(min = 0))]
    pub critical: i64,

    pub status_syntax: StatusSyntax,
}

/// Logging settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub format: Option<LogFormat>,
}

// Default implementations

impl Default for MysqlSettings {
    fn default() -> Self {
        let defaults = ConnectOptions::default();
        Self {
            host: defaults.host,
            port: defaults.port,
            user: defaults.user,
            password: defaults.password,
            socket: None,
        }
    }
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            warning: 0,
            critical: 0,
            status_syntax: StatusSyntax::default(),
        }
    }
}

// Custom validators

fn validate_socket_path(path: &str) -> Result<(), ValidationError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("socket_path_empty"));
    }

    if !trimmed.starts_with('/') {
        return Err(ValidationError::new("socket_path_not_absolute"));
    }

    Ok(())
}

fn validate_timeout(timeout: &Duration) -> Result<(), ValidationError> {
    if *timeout < Duration::from_millis(1) || *timeout > Duration::from_secs(600) {
        return Err(ValidationError::new("timeout_out_of_range"));
    }
    Ok(())
}

// Configuration loading implementation

impl Config {
    /// Load the file named on the command line, else the first file found in
    /// the search paths, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit.map(Path::to_path_buf).or_else(Self::find_config_file) {
            Some(path) => {
                tracing::debug!("Loading configuration from: {}", path.display());
                Self::load_from_file(&path)
            }
            None => {
                tracing::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        // an empty file deserializes to null
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut paths = vec![PathBuf::from("/etc/check-mysql-msr/config.yaml")];

        if let Some(home_path) = Self::home_config_path() {
            paths.push(home_path);
        }

        paths.push(PathBuf::from("./check-mysql-msr.yaml"));

        paths.into_iter().find(|p: &PathBuf| p.exists() && p.is_file())
    }

    /// Get home directory config path
    fn home_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config/check-mysql-msr/config.yaml"))
    }

    /// Overlay the flags that were given, then validate the result
    pub fn merge_args(mut self, args: &Args) -> Result<Self, ConfigError> {
        if let Some(host) = &args.host {
            self.mysql.host = host.clone();
        }
        if let Some(port) = args.port {
            self.mysql.port = port;
        }
        if let Some(user) = &args.user {
            self.mysql.user = user.clone();
        }
        if let Some(password) = &args.password {
            self.mysql.password = password.clone();
        }
        if let Some(socket) = &args.socket {
            self.mysql.socket = Some(socket.display().to_string());
        }
        if let Some(timeout) = args.timeout {
            self.check.timeout = timeout;
        }
        if let Some(warning) = args.warning {
            self.check.warning = warning;
        }
        if let Some(critical) = args.critical {
            self.check.critical = critical;
        }
        if let Some(syntax) = args.status_syntax {
            self.check.status_syntax = syntax;
        }
        if let Some(level) = &args.log_level {
            self.logging.level = Some(level.clone());
        }
        if let Some(format) = args.log_format {
            self.logging.format = Some(format);
        }

        self.validate()?;
        Ok(self)
    }

    /// Convert to wire client connection options
    pub fn to_connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            host: self.mysql.host.clone(),
            port: self.mysql.port,
            user: self.mysql.user.clone(),
            password: self.mysql.password.clone(),
            database: None,
            socket: self.mysql.socket.as_ref().map(PathBuf::from),
        }
    }

    pub fn thresholds(&self) -> ThresholdConfig {
        ThresholdConfig::new(self.check.warning, self.check.critical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mysql.host, "localhost");
        assert_eq!(config.mysql.port, 3306);
        assert_eq!(config.mysql.user, "root");
        assert_eq!(config.check.timeout, Duration::from_secs(5));
        assert_eq!(config.check.status_syntax, StatusSyntax::Slave);
    }

    #[test]
    fn test_valid_yaml_parsing() {
        let yaml = r#"
mysql:
  host: "db1.example.com"
  port: 3307
  user: "monitor"
  password: "secret"

check:
  timeout: 2s
  warning: 30
  critical: 300
  status_syntax: replica

logging:
  level: debug
  format: json
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.mysql.host, "db1.example.com");
        assert_eq!(config.mysql.port, 3307);
        assert_eq!(config.check.timeout, Duration::from_secs(2));
        assert_eq!(config.thresholds(), ThresholdConfig::new(30, 300));
        assert_eq!(config.check.status_syntax, StatusSyntax::Replica);
        assert_eq!(config.logging.format, Some(LogFormat::Json));
    }

    #[test]
    fn test_partial_sections_use_defaults() {
        let yaml = r#"
mysql:
  user: "monitor"
check:
  warning: 10
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.mysql.host, "localhost");
        assert_eq!(config.mysql.user, "monitor");
        assert_eq!(config.check.warning, 10);
        assert_eq!(config.check.critical, 0);
        assert_eq!(config.check.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_timeout() {
        let yaml = r#"
check:
  timeout: 0ms  # Invalid: < 1ms
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());

        let yaml = r#"
check:
  timeout: 11m  # Invalid: > 10m
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_threshold_is_invalid() {
        let yaml = r#"
check:
  critical: -5
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_host_is_invalid() {
        let yaml = r#"
mysql:
  host: ""
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_socket_path_validation() {
        assert!(validate_socket_path("/var/run/mysqld/mysqld.sock").is_ok());
        assert!(validate_socket_path("/tmp/mysql.sock").is_ok());

        assert!(validate_socket_path("").is_err());
        assert!(validate_socket_path("   ").is_err());
        assert!(validate_socket_path("mysql.sock").is_err());
        assert!(validate_socket_path("./mysql.sock").is_err());
    }

    #[test]
    fn test_flags_override_file_values() {
        let yaml = r#"
mysql:
  host: "from-file"
  port: 3307
check:
  warning: 10
  critical: 100
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let args = Args {
            host: Some("from-flag".to_string()),
            critical: Some(500),
            ..Default::default()
        };

        let merged = config.merge_args(&args).unwrap();
        assert_eq!(merged.mysql.host, "from-flag");
        assert_eq!(merged.mysql.port, 3307);
        assert_eq!(merged.thresholds(), ThresholdConfig::new(10, 500));
    }

    #[test]
    fn test_merged_result_is_validated() {
        let args = Args {
            user: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            Config::default().merge_args(&args),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_connect_options_conversion() {
        let args = Args {
            socket: Some(PathBuf::from("/var/run/mysqld/mysqld.sock")),
            password: Some("pw".to_string()),
            ..Default::default()
        };
        let options = Config::default().merge_args(&args).unwrap().to_connect_options();

        assert_eq!(options.host, "localhost");
        assert_eq!(options.password, "pw");
        assert_eq!(
            options.socket,
            Some(PathBuf::from("/var/run/mysqld/mysqld.sock"))
        );
        assert_eq!(options.address(), "unix:/var/run/mysqld/mysqld.sock");
    }
}
