//! Configuration management for breathe

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Global breathe configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Settings used when nothing has been saved yet
    #[serde(default)]
    pub defaults: Defaults,

    /// Colorize terminal output (still only when stdout is a TTY)
    #[serde(default = "default_color")]
    pub color: bool,
}

/// Fallback exercise settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default = "default_inhale_seconds")]
    pub inhale_seconds: u32,

    #[serde(default = "default_exhale_seconds")]
    pub exhale_seconds: u32,

    #[serde(default = "default_training_minutes")]
    pub training_minutes: u32,
}

fn default_color() -> bool {
    true
}

fn default_inhale_seconds() -> u32 {
    5
}

fn default_exhale_seconds() -> u32 {
    5
}

fn default_training_minutes() -> u32 {
    3
}

impl Default for Config {
    fn default() -> Self {
        Self {
            defaults: Defaults::default(),
            color: default_color(),
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            inhale_seconds: default_inhale_seconds(),
            exhale_seconds: default_exhale_seconds(),
            training_minutes: default_training_minutes(),
        }
    }
}

impl Config {
    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = env::temp_dir().join(format!("breathe_config_missing_{}.json", std::process::id()));
        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.defaults.inhale_seconds, 5);
        assert_eq!(config.defaults.exhale_seconds, 5);
        assert_eq!(config.defaults.training_minutes, 3);
        assert!(config.color);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"defaults":{"inhale_seconds":4}}"#).unwrap();
        assert_eq!(config.defaults.inhale_seconds, 4);
        assert_eq!(config.defaults.exhale_seconds, 5);
        assert!(config.color);
    }

    #[test]
    fn test_load_from_file() {
        let dir = env::temp_dir().join(format!("breathe_config_load_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(
            &path,
            r#"{"color": false, "defaults": {"inhale_seconds": 4, "exhale_seconds": 6, "training_minutes": 10}}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert!(!config.color);
        assert_eq!(config.defaults.inhale_seconds, 4);
        assert_eq!(config.defaults.exhale_seconds, 6);
        assert_eq!(config.defaults.training_minutes, 10);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = env::temp_dir().join(format!("breathe_config_corrupt_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(Config::load(&path).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
