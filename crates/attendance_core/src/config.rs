//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve store path, webhook endpoint, HTTP timeout and log level.
//! - Build the matching `RemoteSync` adapter.
//!
//! # Invariants
//! - A blank or absent webhook URL selects offline mode.
//! - Resolution never reads process env directly when `from_lookup` is used.

use crate::logging::default_log_level;
use crate::sync::{OfflineRemoteSync, RemoteSync, WebhookRemoteSync};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

pub const ENV_DB_PATH: &str = "ATTENDANCE_DB_PATH";
pub const ENV_WEBHOOK_URL: &str = "ATTENDANCE_WEBHOOK_URL";
pub const ENV_HTTP_TIMEOUT_MS: &str = "ATTENDANCE_HTTP_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "ATTENDANCE_LOG_LEVEL";

const DEFAULT_DB_FILE_NAME: &str = "attendance.sqlite3";
const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => write!(f, "invalid value for {key}: `{value}`"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceConfig {
    pub db_path: PathBuf,
    pub webhook_url: Option<String>,
    pub http_timeout_ms: u64,
    pub log_level: String,
}

impl AttendanceConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = non_blank(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));

        let http_timeout_ms = match non_blank(ENV_HTTP_TIMEOUT_MS) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(value) if value > 0 => value,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_HTTP_TIMEOUT_MS,
                        value: raw,
                    })
                }
            },
            None => DEFAULT_HTTP_TIMEOUT_MS,
        };

        let log_level =
            non_blank(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string());

        Ok(Self {
            db_path,
            webhook_url: non_blank(ENV_WEBHOOK_URL),
            http_timeout_ms,
            log_level,
        })
    }

    pub fn is_offline(&self) -> bool {
        self.webhook_url.is_none()
    }

    /// Builds the remote adapter for this configuration.
    pub fn remote_sync(&self) -> Arc<dyn RemoteSync> {
        match self.webhook_url.as_deref() {
            Some(url) => Arc::new(WebhookRemoteSync::new(url, self.http_timeout_ms)),
            None => Arc::new(OfflineRemoteSync::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AttendanceConfig, ConfigError, ENV_DB_PATH, ENV_HTTP_TIMEOUT_MS, ENV_LOG_LEVEL,
        ENV_WEBHOOK_URL,
    };
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_offline_temp_store() {
        let config = AttendanceConfig::from_lookup(lookup(&[])).expect("defaults");
        assert!(config.is_offline());
        assert_eq!(config.http_timeout_ms, 10_000);
        assert!(config.db_path.ends_with("attendance.sqlite3"));
        assert_eq!(config.remote_sync().adapter_id(), "offline");
    }

    #[test]
    fn reads_explicit_values_and_treats_blank_url_as_offline() {
        let config = AttendanceConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/var/lib/kiosk/attendance.db"),
            (ENV_WEBHOOK_URL, "   "),
            (ENV_HTTP_TIMEOUT_MS, "2500"),
            (ENV_LOG_LEVEL, "warn"),
        ]))
        .expect("config");
        assert_eq!(config.db_path, PathBuf::from("/var/lib/kiosk/attendance.db"));
        assert!(config.is_offline());
        assert_eq!(config.http_timeout_ms, 2500);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn webhook_url_selects_webhook_adapter() {
        let config =
            AttendanceConfig::from_lookup(lookup(&[(ENV_WEBHOOK_URL, "https://example.com/hook")]))
                .expect("config");
        assert!(!config.is_offline());
        assert_eq!(config.remote_sync().adapter_id(), "webhook");
    }

    #[test]
    fn rejects_zero_or_non_numeric_timeout() {
        for raw in ["0", "soon"] {
            let err = AttendanceConfig::from_lookup(lookup(&[(ENV_HTTP_TIMEOUT_MS, raw)]))
                .expect_err("invalid timeout");
            assert_eq!(
                err,
                ConfigError::InvalidValue {
                    key: ENV_HTTP_TIMEOUT_MS,
                    value: raw.to_string()
                }
            );
        }
    }
}
