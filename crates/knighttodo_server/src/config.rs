//! Configuration loading from environment variables.

use knighttodo_core::{default_log_level, LogTarget, RetryPolicy};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DATABASE_PATH: &str = "knighttodo.sqlite3";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_EXPERIENCE_TIMEOUT_MS: u64 = 3000;
const DEFAULT_EXPERIENCE_MAX_ATTEMPTS: u32 = 1;
const DEFAULT_EXPERIENCE_BACKOFF_MS: u64 = 200;

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub experience_url: String,
    /// Per-attempt timeout of the experience call.
    pub experience_timeout: Duration,
    pub experience_retry: RetryPolicy,
    pub log_level: String,
    pub log_target: LogTarget,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `KNIGHTTODO_EXPERIENCE_URL`: experience-award endpoint
    ///
    /// Optional (with defaults):
    /// - `KNIGHTTODO_DATABASE_PATH` (`knighttodo.sqlite3`)
    /// - `KNIGHTTODO_BIND_ADDR` (`127.0.0.1:8080`)
    /// - `KNIGHTTODO_EXPERIENCE_TIMEOUT_MS` (3000)
    /// - `KNIGHTTODO_EXPERIENCE_MAX_ATTEMPTS` (1, no retry)
    /// - `KNIGHTTODO_EXPERIENCE_BACKOFF_MS` (200)
    /// - `KNIGHTTODO_LOG_LEVEL` (`debug` in debug builds, `info` otherwise)
    /// - `KNIGHTTODO_LOG_DIR` (unset logs to stderr)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] over an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &'static str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let experience_url =
            var("KNIGHTTODO_EXPERIENCE_URL").ok_or(ConfigError::Missing("KNIGHTTODO_EXPERIENCE_URL"))?;

        let database_path = var("KNIGHTTODO_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

        let bind_addr: SocketAddr = var("KNIGHTTODO_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("KNIGHTTODO_BIND_ADDR", "must be a socket address like 127.0.0.1:8080")
            })?;

        let timeout_ms: u64 = parse_or(
            var("KNIGHTTODO_EXPERIENCE_TIMEOUT_MS"),
            DEFAULT_EXPERIENCE_TIMEOUT_MS,
            "KNIGHTTODO_EXPERIENCE_TIMEOUT_MS",
            "must be a positive integer of milliseconds",
        )?;
        if timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "KNIGHTTODO_EXPERIENCE_TIMEOUT_MS",
                "must be a positive integer of milliseconds",
            ));
        }

        let max_attempts: u32 = parse_or(
            var("KNIGHTTODO_EXPERIENCE_MAX_ATTEMPTS"),
            DEFAULT_EXPERIENCE_MAX_ATTEMPTS,
            "KNIGHTTODO_EXPERIENCE_MAX_ATTEMPTS",
            "must be a positive integer",
        )?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "KNIGHTTODO_EXPERIENCE_MAX_ATTEMPTS",
                "must be a positive integer",
            ));
        }

        let backoff_ms: u64 = parse_or(
            var("KNIGHTTODO_EXPERIENCE_BACKOFF_MS"),
            DEFAULT_EXPERIENCE_BACKOFF_MS,
            "KNIGHTTODO_EXPERIENCE_BACKOFF_MS",
            "must be a non-negative integer of milliseconds",
        )?;

        let log_level = var("KNIGHTTODO_LOG_LEVEL").unwrap_or_else(|| default_log_level().to_string());
        let log_target = LogTarget::from_dir(var("KNIGHTTODO_LOG_DIR").as_deref())
            .map_err(|_| ConfigError::Invalid("KNIGHTTODO_LOG_DIR", "must be an absolute path"))?;

        Ok(Self {
            database_path,
            bind_addr,
            experience_url,
            experience_timeout: Duration::from_millis(timeout_ms),
            experience_retry: RetryPolicy::new(max_attempts, Duration::from_millis(backoff_ms)),
            log_level,
            log_target,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    default: T,
    key: &'static str,
    expectation: &'static str,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid(key, expectation)),
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is missing.
    Missing(&'static str),
    /// An environment variable has an invalid value.
    Invalid(&'static str, &'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "missing required environment variable: {key}"),
            Self::Invalid(key, expectation) => write!(f, "invalid value for {key}: {expectation}"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{Config, ConfigError};
    use knighttodo_core::{LogTarget, RetryPolicy};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_url_is_set() {
        let config = load(&[("KNIGHTTODO_EXPERIENCE_URL", "http://xp.local/award")]).unwrap();

        assert_eq!(config.experience_url, "http://xp.local/award");
        assert_eq!(config.database_path, PathBuf::from("knighttodo.sqlite3"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.experience_timeout, Duration::from_millis(3000));
        assert_eq!(config.experience_retry, RetryPolicy::default());
        assert_eq!(config.log_target, LogTarget::Stderr);
    }

    #[test]
    fn missing_url_is_rejected() {
        assert_eq!(
            load(&[]).unwrap_err(),
            ConfigError::Missing("KNIGHTTODO_EXPERIENCE_URL")
        );
        assert_eq!(
            load(&[("KNIGHTTODO_EXPERIENCE_URL", "  ")]).unwrap_err(),
            ConfigError::Missing("KNIGHTTODO_EXPERIENCE_URL")
        );
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("KNIGHTTODO_EXPERIENCE_URL", "http://xp.local/award"),
            ("KNIGHTTODO_DATABASE_PATH", "/var/lib/knighttodo/db.sqlite3"),
            ("KNIGHTTODO_BIND_ADDR", "0.0.0.0:9000"),
            ("KNIGHTTODO_EXPERIENCE_TIMEOUT_MS", "750"),
            ("KNIGHTTODO_EXPERIENCE_MAX_ATTEMPTS", "3"),
            ("KNIGHTTODO_EXPERIENCE_BACKOFF_MS", "50"),
            ("KNIGHTTODO_LOG_LEVEL", "warn"),
            ("KNIGHTTODO_LOG_DIR", "/var/log/knighttodo"),
        ])
        .unwrap();

        assert_eq!(
            config.database_path,
            PathBuf::from("/var/lib/knighttodo/db.sqlite3")
        );
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.experience_timeout, Duration::from_millis(750));
        assert_eq!(
            config.experience_retry,
            RetryPolicy::new(3, Duration::from_millis(50))
        );
        assert_eq!(config.log_level, "warn");
        assert_eq!(
            config.log_target,
            LogTarget::Directory(PathBuf::from("/var/log/knighttodo"))
        );
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let base = ("KNIGHTTODO_EXPERIENCE_URL", "http://xp.local/award");
        for (key, value) in [
            ("KNIGHTTODO_BIND_ADDR", "localhost"),
            ("KNIGHTTODO_EXPERIENCE_TIMEOUT_MS", "0"),
            ("KNIGHTTODO_EXPERIENCE_TIMEOUT_MS", "soon"),
            ("KNIGHTTODO_EXPERIENCE_MAX_ATTEMPTS", "0"),
            ("KNIGHTTODO_EXPERIENCE_BACKOFF_MS", "-5"),
            ("KNIGHTTODO_LOG_DIR", "relative/logs"),
        ] {
            match load(&[base, (key, value)]) {
                Err(ConfigError::Invalid(invalid_key, _)) => assert_eq!(invalid_key, key),
                other => panic!("{key}={value} should be invalid, got {other:?}"),
            }
        }
    }
}
