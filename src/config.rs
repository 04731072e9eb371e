//! Application configuration
//!
//! Loaded from `$XDG_CONFIG_HOME/pkf-manager/config.json` when present,
//! then overridden by environment variables, then by CLI flags in `main`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::prefs::JsonPreferenceStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root that node locations are resolved against
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: PathBuf,

    /// Preference file, defaults to the user's config dir
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences_path: Option<PathBuf>,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_sysfs_root() -> PathBuf {
    PathBuf::from(constants::paths::SYSFS_ROOT)
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Default for Config {
    fn default() -> Self {
        Self {
            sysfs_root: default_sysfs_root(),
            preferences_path: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(constants::config::APP_DIR);
        path.push(constants::config::FILENAME);
        path
    }

    /// Load from the default location with env overrides applied
    ///
    /// Runs before logging is set up, so nothing here logs; call
    /// [`Config::validate`] once all overrides are in.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::path())?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Missing file yields defaults, a broken one is an error
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: Config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config JSON from {:?}", path))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        fs::write(path, json).with_context(|| format!("Failed to write config to {:?}", path))?;
        Ok(())
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.preferences_path
            .clone()
            .unwrap_or_else(JsonPreferenceStore::default_path)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(root) = env::var(constants::env::SYSFS_ROOT) {
            self.sysfs_root = PathBuf::from(root);
        }
        if let Ok(path) = env::var(constants::env::PREFS_PATH) {
            self.preferences_path = Some(PathBuf::from(path));
        }
        if let Ok(level) = env::var(constants::env::LOG_LEVEL) {
            self.log_level = level;
        }
    }

    /// Unknown log levels fall back to info, the rejected level is returned
    pub fn validate(&mut self) -> Option<String> {
        self.log_level = self.log_level.to_lowercase();
        if LOG_LEVELS.contains(&self.log_level.as_str()) {
            return None;
        }
        Some(std::mem::replace(&mut self.log_level, default_log_level()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.sysfs_root, PathBuf::from("/sys/kernel"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "sysfs_root": "/tmp/fake" }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.sysfs_root, PathBuf::from("/tmp/fake"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.preferences_path, None);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.json");
        let config = Config {
            sysfs_root: PathBuf::from("/tmp/root"),
            preferences_path: Some(PathBuf::from("/tmp/prefs.json")),
            log_level: "debug".to_string(),
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_broken_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "sysfs_root = 1").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = Config {
            log_level: "LOUD".to_string(),
            ..Config::default()
        };
        assert_eq!(config.validate(), Some("loud".to_string()));
        assert_eq!(config.log_level, "info");

        config.log_level = "WARN".to_string();
        assert_eq!(config.validate(), None);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_explicit_preferences_path_wins() {
        let config = Config {
            preferences_path: Some(PathBuf::from("/tmp/p.json")),
            ..Config::default()
        };
        assert_eq!(config.preferences_path(), PathBuf::from("/tmp/p.json"));
    }
}
