//! Configuration loading and startup validation

use crate::host::SafeAreaInsets;
use crate::stats::Quota;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fs, io, path::PathBuf, time::Duration};
use thiserror::Error;

pub const CONFIG_ENV_VAR: &str = "ACORN_TRACKER_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("daily_allowance must be a positive integer, got {0}")]
    NonPositiveQuota(i64),

    #[error("start_date {value:?} is not an RFC 3339 timestamp: {source}")]
    InvalidStartDate {
        value: String,
        source: chrono::ParseError,
    },

    #[error("refresh_interval_ms must be greater than zero")]
    ZeroRefreshInterval,

    #[error("reset_hour_utc must be in 0..=23, got {0}")]
    InvalidResetHour(u32),

    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Identity the local frame host reports as its context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub fid: Option<u64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub added: bool,
    #[serde(default)]
    pub safe_area: SafeAreaInsets,
}

/// Raw on-disk configuration. Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_title")]
    pub project_title: String,
    #[serde(default = "default_description")]
    pub project_description: String,
    #[serde(default = "default_start_date")]
    pub start_date: String,
    #[serde(default = "default_daily_allowance")]
    pub daily_allowance: i64,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_profile_base_url")]
    pub profile_base_url: String,
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    #[serde(default = "default_reset_hour_utc")]
    pub reset_hour_utc: u32,
    #[serde(default)]
    pub host: HostConfig,
}

fn default_title() -> String {
    "Acorn Tracker".to_string()
}

fn default_description() -> String {
    "Track and manage your acorn transactions across Farcaster networks".to_string()
}

fn default_start_date() -> String {
    "2025-02-01T00:00:00Z".to_string()
}

fn default_daily_allowance() -> i64 {
    30
}

fn default_api_url() -> String {
    "https://api.acorn-tracker.xyz".to_string()
}

fn default_profile_base_url() -> String {
    "https://warpcast.com".to_string()
}

fn default_refresh_interval_ms() -> u64 {
    1000
}

fn default_reset_hour_utc() -> u32 {
    11
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_title: default_title(),
            project_description: default_description(),
            start_date: default_start_date(),
            daily_allowance: default_daily_allowance(),
            api_url: default_api_url(),
            profile_base_url: default_profile_base_url(),
            refresh_interval_ms: default_refresh_interval_ms(),
            reset_hour_utc: default_reset_hour_utc(),
            host: HostConfig::default(),
        }
    }
}

/// Validated configuration consumed by the rest of the app.
#[derive(Debug, Clone)]
pub struct Settings {
    pub project_title: String,
    pub project_description: String,
    pub epoch: DateTime<Utc>,
    pub quota: Quota,
    pub api_url: String,
    pub profile_base_url: String,
    pub refresh_interval: Duration,
    pub reset_hour_utc: u32,
    pub host: HostConfig,
}

impl Config {
    /// Resolve the config path: env override, then XDG config dir.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }
        let config_dir = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            format!("{}/.config", home)
        });
        PathBuf::from(config_dir)
            .join("acorn-tracker")
            .join("config.json")
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        let config = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<Settings, ConfigError> {
        let quota = Quota::new(self.daily_allowance)
            .ok_or(ConfigError::NonPositiveQuota(self.daily_allowance))?;

        let epoch = DateTime::parse_from_rfc3339(&self.start_date)
            .map_err(|source| ConfigError::InvalidStartDate {
                value: self.start_date.clone(),
                source,
            })?
            .with_timezone(&Utc);

        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::ZeroRefreshInterval);
        }
        if self.reset_hour_utc > 23 {
            return Err(ConfigError::InvalidResetHour(self.reset_hour_utc));
        }

        Ok(Settings {
            project_title: self.project_title.clone(),
            project_description: self.project_description.clone(),
            epoch,
            quota,
            api_url: self.api_url.trim_end_matches('/').to_string(),
            profile_base_url: self.profile_base_url.trim_end_matches('/').to_string(),
            refresh_interval: Duration::from_millis(self.refresh_interval_ms),
            reset_hour_utc: self.reset_hour_utc,
            host: self.host.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_defaults_validate() {
        let settings = Config::default().validate().unwrap();
        assert_eq!(settings.quota.get(), 30);
        assert_eq!(settings.epoch, Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(settings.refresh_interval, Duration::from_millis(1000));
        assert_eq!(settings.reset_hour_utc, 11);
        assert_eq!(settings.api_url, "https://api.acorn-tracker.xyz");
    }

    #[test]
    fn test_zero_quota_is_rejected() {
        let config = Config {
            daily_allowance: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveQuota(0))
        ));
    }

    #[test]
    fn test_negative_quota_is_rejected() {
        let config = Config {
            daily_allowance: -5,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveQuota(-5))
        ));
    }

    #[test]
    fn test_bad_start_date() {
        let config = Config {
            start_date: "Feb 1, 2025".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidStartDate { .. })
        ));
    }

    #[test]
    fn test_interval_and_reset_hour_bounds() {
        let config = Config {
            refresh_interval_ms: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroRefreshInterval)
        ));

        let config = Config {
            reset_hour_utc: 24,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidResetHour(24))
        ));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config = serde_json::from_str(
            r#"{ "daily_allowance": 12, "host": { "fid": 977233, "username": "acorns" } }"#,
        )
        .unwrap();
        assert_eq!(config.daily_allowance, 12);
        assert_eq!(config.project_title, "Acorn Tracker");
        assert_eq!(config.host.fid, Some(977233));
        assert!(!config.host.added);

        let settings = config.validate().unwrap();
        assert_eq!(settings.quota.get(), 12);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = Config {
            api_url: "https://example.test/".to_string(),
            ..Config::default()
        };
        assert_eq!(config.validate().unwrap().api_url, "https://example.test");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("acorn-tracker-does-not-exist.json");
        let config = Config::load(path).unwrap();
        assert_eq!(config.daily_allowance, 30);
    }
}
