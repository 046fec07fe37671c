use serde::{Deserialize, Serialize};

use crate::common::types::AnyResult;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub cleanup: CleanupConfig,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

/// Idle-session reaping. The player-update broadcast interval is fixed at
/// five seconds and is deliberately not configurable.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CleanupConfig {
    /// Seconds a session must sit idle before it is reclaimed.
    #[serde(default = "default_cleanup_threshold_secs")]
    pub threshold_secs: u64,
    /// Seconds between sweeps.
    #[serde(default = "default_cleanup_interval_secs")]
    pub interval_secs: u64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            threshold_secs: default_cleanup_threshold_secs(),
            interval_secs: default_cleanup_interval_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub filters: Option<String>,
}

fn default_cleanup_threshold_secs() -> u64 {
    600
}

fn default_cleanup_interval_secs() -> u64 {
    60
}

impl Config {
    pub fn load() -> AnyResult<Self> {
        let config_path = if std::path::Path::new("config.toml").exists() {
            "config.toml"
        } else if std::path::Path::new("config.default.toml").exists() {
            "config.default.toml"
        } else {
            return Err("config.toml or config.default.toml not found".into());
        };

        tracing::info!("Loading configuration from: {}", config_path);

        let config_str = std::fs::read_to_string(config_path)?;
        if config_str.is_empty() {
            return Err(format!("{} is empty", config_path).into());
        }

        let config: Config = toml::from_str(&config_str)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.cleanup.threshold_secs, 600);
        assert_eq!(config.cleanup.interval_secs, 60);
        assert!(config.logging.is_none());
    }

    #[test]
    fn parse_partial_cleanup_section() {
        let config: Config = toml::from_str("[cleanup]\nthreshold_secs = 120\n").unwrap();
        assert_eq!(config.cleanup.threshold_secs, 120);
        assert_eq!(config.cleanup.interval_secs, 60);
    }

    #[test]
    fn parse_logging_section() {
        let config: Config =
            toml::from_str("[logging]\nlevel = \"debug\"\nfilters = \"playnode=trace\"\n").unwrap();
        let logging = config.logging.unwrap();
        assert_eq!(logging.level.as_deref(), Some("debug"));
        assert_eq!(logging.filters.as_deref(), Some("playnode=trace"));
    }
}
