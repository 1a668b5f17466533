//! User configuration and preferences

use crate::domain::{DeleteMode, SortOrder};
use crate::error::{Result, TriageError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// How photos are presented while reviewing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InteractionMode {
    /// One photo at a time
    #[default]
    Swipe,
    /// Photo plus a list of the photos still to review
    Browse,
}

impl InteractionMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Swipe => Self::Browse,
            Self::Browse => Self::Swipe,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UserConfig {
    pub sort_order: SortOrder,
    pub delete_mode: DeleteMode,
    pub interaction_mode: InteractionMode,
    /// Whether the welcome dialog has been shown
    pub welcome_shown: bool,
    /// Version that last showed the welcome dialog
    pub last_seen_version: Option<String>,
}

impl UserConfig {
    /// Get the config file path (~/.config/pswp/config.json)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pswp").join("config.json"))
    }

    /// Load config from the default location, or defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path().ok_or_else(|| {
            TriageError::ConfigError("Could not determine config directory".to_string())
        })?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            TriageError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            TriageError::ConfigError(format!("Failed to parse config file: {}", e))
        })
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().ok_or_else(|| {
            TriageError::ConfigError("Could not determine config directory".to_string())
        })?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                TriageError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            TriageError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, contents).map_err(|e| {
            TriageError::ConfigError(format!("Failed to write config file: {}", e))
        })
    }

    /// Whether the welcome dialog should be shown for this build
    pub fn should_show_welcome(&self, version: &str) -> bool {
        !self.welcome_shown || self.last_seen_version.as_deref() != Some(version)
    }

    pub fn mark_welcome_shown(&mut self, version: &str) {
        self.welcome_shown = true;
        self.last_seen_version = Some(version.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = UserConfig::default();
        assert!(!config.welcome_shown);
        assert_eq!(config.sort_order, SortOrder::NewestFirst);
        assert_eq!(config.delete_mode, DeleteMode::Immediate);
        assert_eq!(config.interaction_mode, InteractionMode::Swipe);
        assert!(config.last_seen_version.is_none());
    }

    #[test]
    fn test_round_trip_through_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.json");

        let config = UserConfig {
            sort_order: SortOrder::OldestFirst,
            delete_mode: DeleteMode::Queued,
            interaction_mode: InteractionMode::Browse,
            welcome_shown: true,
            last_seen_version: Some("0.1.0".to_string()),
        };
        config.save_to(&path).unwrap();

        assert_eq!(UserConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = UserConfig::load_from(&temp_dir.path().join("absent.json")).unwrap();
        assert_eq!(config, UserConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"welcome_shown": true}"#).unwrap();

        let config = UserConfig::load_from(&path).unwrap();
        assert!(config.welcome_shown);
        assert_eq!(config.delete_mode, DeleteMode::Immediate);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            UserConfig::load_from(&path),
            Err(TriageError::ConfigError(_))
        ));
    }

    #[test]
    fn test_welcome_shown_again_after_upgrade() {
        let mut config = UserConfig::default();
        assert!(config.should_show_welcome("0.1.0"));

        config.mark_welcome_shown("0.1.0");
        assert!(!config.should_show_welcome("0.1.0"));
        assert!(config.should_show_welcome("0.2.0"));
    }
}
