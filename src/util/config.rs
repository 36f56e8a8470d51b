//! Engine configuration.
//!
//! Stored as `config.json` in the platform config directory; every field is
//! optional on disk and environment variables win over the file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infra::fmcsa::DEFAULT_BASE_URL;

pub const APP_QUALIFIER: &str = "com";
pub const APP_ORG: &str = "FreightRateEngine";
pub const APP_DIR: &str = "FreightRateEngine";

pub const ENV_FMCSA_WEB_KEY: &str = "FREIGHT_FMCSA_WEB_KEY";
pub const ENV_FMCSA_BASE_URL: &str = "FREIGHT_FMCSA_BASE_URL";
pub const ENV_FUEL_CACHE_TTL_HOURS: &str = "FREIGHT_FUEL_CACHE_TTL_HOURS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config directory unavailable")]
    StorageUnavailable,
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_base_url")]
    pub fmcsa_base_url: String,

    /// QCMobile web key. Carrier verification is unavailable without one.
    #[serde(default)]
    pub fmcsa_web_key: Option<String>,

    #[serde(default = "default_ttl_hours")]
    pub fuel_cache_ttl_hours: u64,

    /// Settings store override; defaults to the platform config directory.
    #[serde(default)]
    pub settings_path: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_ttl_hours() -> u64 {
    6
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fmcsa_base_url: default_base_url(),
            fmcsa_web_key: None,
            fuel_cache_ttl_hours: default_ttl_hours(),
            settings_path: None,
        }
    }
}

impl EngineConfig {
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_DIR)
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or(ConfigError::StorageUnavailable)
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Loads the config file (defaults if absent) and applies environment
    /// overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_FMCSA_WEB_KEY).filter(|v| !v.trim().is_empty()) {
            self.fmcsa_web_key = Some(key.trim().to_string());
        }
        if let Some(url) = lookup(ENV_FMCSA_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.fmcsa_base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_FUEL_CACHE_TTL_HOURS) {
            self.fuel_cache_ttl_hours =
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: ENV_FUEL_CACHE_TTL_HOURS,
                        value: raw.clone(),
                    })?;
        }
        Ok(())
    }

    pub fn fuel_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.fuel_cache_ttl_hours * 60 * 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = EngineConfig {
            fmcsa_web_key: Some("from-file".into()),
            ..EngineConfig::default()
        };
        config
            .apply_overrides(env(&[
                (ENV_FMCSA_WEB_KEY, " from-env "),
                (ENV_FUEL_CACHE_TTL_HOURS, "12"),
            ]))
            .unwrap();
        assert_eq!(config.fmcsa_web_key.as_deref(), Some("from-env"));
        assert_eq!(config.fmcsa_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.fuel_cache_ttl(), Duration::from_secs(12 * 3600));
    }

    #[test]
    fn bad_ttl_is_reported() {
        let mut config = EngineConfig::default();
        let err = config
            .apply_overrides(env(&[(ENV_FUEL_CACHE_TTL_HOURS, "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{ "fmcsa_web_key": "abc" }"#).unwrap();
        assert_eq!(config.fuel_cache_ttl_hours, 6);
        assert_eq!(config.fmcsa_base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        assert_eq!(EngineConfig::load_from(&path).unwrap(), EngineConfig::default());

        let config = EngineConfig {
            fuel_cache_ttl_hours: 3,
            ..EngineConfig::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(EngineConfig::load_from(&path).unwrap(), config);
    }
}
