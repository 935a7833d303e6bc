// SPDX-License-Identifier: MPL-2.0
//! This module handles toast timing configuration, including loading and saving
//! it from a `toast.toml` file.
//!
//! # Examples
//!
//! ```no_run
//! use toastline::config::{self, Config};
//!
//! // Load existing configuration
//! let mut config = config::load().unwrap_or_default();
//!
//! // Slow down the exit animation
//! config.close_duration_ms = Some(400);
//!
//! // Timings used by toast instances
//! let timings = config.timings();
//! assert_eq!(timings.close_duration.as_millis(), 400);
//! ```

pub mod defaults;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use defaults::{
    DEFAULT_CLOSE_DURATION_MS, DEFAULT_DURATION_MS, DEFAULT_OPEN_SETTLE_MS, MAX_ANIMATION_MS,
};

const CONFIG_FILE: &str = "toast.toml";
const APP_NAME: &str = "toastline";

/// On-disk form of the toast timings. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub default_duration_ms: Option<u64>,
    #[serde(default)]
    pub open_settle_ms: Option<u64>,
    #[serde(default)]
    pub close_duration_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_duration_ms: Some(DEFAULT_DURATION_MS),
            open_settle_ms: Some(DEFAULT_OPEN_SETTLE_MS),
            close_duration_ms: Some(DEFAULT_CLOSE_DURATION_MS),
        }
    }
}

impl Config {
    /// Resolves the file values into [`Timings`], falling back to defaults
    /// and clamping animation lengths to [`MAX_ANIMATION_MS`].
    #[must_use]
    pub fn timings(&self) -> Timings {
        let animation = |value: Option<u64>, default: u64| {
            Duration::from_millis(value.unwrap_or(default).min(MAX_ANIMATION_MS))
        };
        Timings {
            default_duration: Duration::from_millis(
                self.default_duration_ms.unwrap_or(DEFAULT_DURATION_MS),
            ),
            open_settle: animation(self.open_settle_ms, DEFAULT_OPEN_SETTLE_MS),
            close_duration: animation(self.close_duration_ms, DEFAULT_CLOSE_DURATION_MS),
        }
    }
}

/// Lifecycle timings shared by every toast of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Lifetime used when neither the instance nor the call sets one.
    pub default_duration: Duration,
    /// Delay before `is_opening` is cleared.
    pub open_settle: Duration,
    /// Delay between close and removal.
    pub close_duration: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            default_duration: Duration::from_millis(DEFAULT_DURATION_MS),
            open_settle: Duration::from_millis(DEFAULT_OPEN_SETTLE_MS),
            close_duration: Duration::from_millis(DEFAULT_CLOSE_DURATION_MS),
        }
    }
}

fn get_default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

pub fn load() -> Result<Config> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

pub fn save(config: &Config) -> Result<()> {
    if let Some(path) = get_default_config_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Reads a config file. Unparseable content falls back to the defaults.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    match toml::from_str(&content) {
        Ok(config) => Ok(config),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "invalid toast config, using defaults");
            Ok(Config::default())
        }
    }
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_round_trip_preserves_timings() {
        let config = Config {
            default_duration_ms: Some(0),
            open_settle_ms: Some(80),
            close_duration_ms: Some(350),
        };
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("toast.toml");

        save_to_path(&config, &config_path).expect("failed to save config");
        let loaded = load_from_path(&config_path).expect("failed to load config");

        assert_eq!(loaded, config);
    }

    #[test]
    fn load_from_path_returns_default_on_invalid_toml() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("toast.toml");
        fs::write(&config_path, "not = valid = toml").expect("failed to write invalid toml");

        let loaded = load_from_path(&config_path).expect("load should not error");
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn load_from_missing_path_is_an_io_error() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let result = load_from_path(&temp_dir.path().join("absent.toml"));
        assert!(matches!(result, Err(crate::error::Error::Io(_))));
    }

    #[test]
    fn partial_file_keeps_missing_fields_unset() {
        let config: Config = toml::from_str("close_duration_ms = 500").expect("valid toml");
        assert_eq!(config.close_duration_ms, Some(500));
        assert_eq!(config.default_duration_ms, None);

        let timings = config.timings();
        assert_eq!(timings.close_duration, Duration::from_millis(500));
        assert_eq!(timings.default_duration, Duration::from_millis(DEFAULT_DURATION_MS));
        assert_eq!(timings.open_settle, Duration::from_millis(DEFAULT_OPEN_SETTLE_MS));
    }

    #[test]
    fn animation_timings_are_clamped() {
        let config = Config {
            open_settle_ms: Some(MAX_ANIMATION_MS * 2),
            ..Config::default()
        };
        assert_eq!(
            config.timings().open_settle,
            Duration::from_millis(MAX_ANIMATION_MS)
        );
    }

    #[test]
    fn default_config_matches_default_timings() {
        assert_eq!(Config::default().timings(), Timings::default());
    }
}
