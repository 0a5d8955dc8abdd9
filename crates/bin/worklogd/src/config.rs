//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `worklog.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Rule engine tuning.
    pub engine: EngineConfig,
    /// Periodic deadline and budget checks.
    pub scanner: ScannerConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound for one action, unless its handler sets its own.
    pub action_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    /// How far ahead a due date counts as approaching.
    pub deadline_window_hours: u32,
    /// Budget usage (percent) at which a project is reported.
    pub budget_threshold_percent: f64,
}

impl Config {
    /// Load configuration from `worklog.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting values are out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("worklog.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("WORKLOG_HOST") {
            self.server.host = val;
        }
        if let Some(val) = var("WORKLOG_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Some(val) = var("WORKLOG_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("WORKLOG_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("WORKLOG_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("WORKLOG_ACTION_TIMEOUT_SECS")
            && let Ok(secs) = val.parse()
        {
            self.engine.action_timeout_secs = secs;
        }
        if let Some(val) = var("WORKLOG_SCANNER_ENABLED")
            && let Ok(enabled) = val.parse()
        {
            self.scanner.enabled = enabled;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.engine.action_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "engine.action_timeout_secs must be non-zero".to_string(),
            ));
        }
        if self.scanner.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "scanner.interval_secs must be non-zero".to_string(),
            ));
        }
        if !self.scanner.budget_threshold_percent.is_finite()
            || self.scanner.budget_threshold_percent <= 0.0
        {
            return Err(ConfigError::Validation(
                "scanner.budget_threshold_percent must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    #[must_use]
    pub fn action_timeout(&self) -> Duration {
        Duration::from_secs(self.engine.action_timeout_secs)
    }

    #[must_use]
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scanner.interval_secs)
    }

    #[must_use]
    pub fn deadline_window(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.scanner.deadline_window_hours))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:worklog.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "worklogd=info,worklog=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            action_timeout_secs: 5,
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 300,
            deadline_window_hours: 24,
            budget_threshold_percent: 80.0,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value).to_string())
        }
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.url, "sqlite:worklog.db?mode=rwc");
        assert_eq!(config.action_timeout(), Duration::from_secs(5));
        assert!(config.scanner.enabled);
        assert_eq!(config.scan_interval(), Duration::from_secs(300));
        assert_eq!(config.deadline_window(), chrono::Duration::hours(24));
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [database]
            url = 'sqlite:test.db'

            [logging]
            filter = 'debug'

            [engine]
            action_timeout_secs = 2

            [scanner]
            enabled = false
            interval_secs = 60
            deadline_window_hours = 48
            budget_threshold_percent = 90.0
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.url, "sqlite:test.db");
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.engine.action_timeout_secs, 2);
        assert!(!config.scanner.enabled);
        assert_eq!(config.scanner.interval_secs, 60);
        assert_eq!(config.scanner.deadline_window_hours, 48);
        assert!((config.scanner.budget_threshold_percent - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [scanner]
            interval_secs = 30
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.scanner.interval_secs, 30);
        assert!(config.scanner.enabled);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_apply_bind_override_over_host_and_port() {
        let mut config = Config::default();
        config.apply_overrides(overrides(&[
            ("WORKLOG_HOST", "10.0.0.1"),
            ("WORKLOG_BIND", "127.0.0.1:8081"),
        ]));
        assert_eq!(config.bind_addr(), "127.0.0.1:8081");
    }

    #[test]
    fn should_prefer_rust_log_over_worklog_log() {
        let mut config = Config::default();
        config.apply_overrides(overrides(&[("WORKLOG_LOG", "warn"), ("RUST_LOG", "trace")]));
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_apply_engine_and_scanner_overrides() {
        let mut config = Config::default();
        config.apply_overrides(overrides(&[
            ("WORKLOG_ACTION_TIMEOUT_SECS", "9"),
            ("WORKLOG_SCANNER_ENABLED", "false"),
        ]));
        assert_eq!(config.action_timeout(), Duration::from_secs(9));
        assert!(!config.scanner.enabled);
    }

    #[test]
    fn should_ignore_unparsable_overrides() {
        let mut config = Config::default();
        config.apply_overrides(overrides(&[
            ("WORKLOG_PORT", "eighty"),
            ("WORKLOG_SCANNER_ENABLED", "maybe"),
        ]));
        assert_eq!(config.server.port, 3000);
        assert!(config.scanner.enabled);
    }

    #[test]
    fn should_accept_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_action_timeout() {
        let mut config = Config::default();
        config.engine.action_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_scan_interval() {
        let mut config = Config::default();
        config.scanner.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_non_positive_budget_threshold() {
        let mut config = Config::default();
        config.scanner.budget_threshold_percent = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_format_bind_addr() {
        assert_eq!(Config::default().bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn should_return_database_url() {
        assert_eq!(
            Config::default().database_url(),
            "sqlite:worklog.db?mode=rwc"
        );
    }
}
