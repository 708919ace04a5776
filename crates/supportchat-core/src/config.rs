use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::format::{FormatOptions, NumberedListStyle};
use crate::widget::Theme;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const BASE_URL_ENV: &str = "SUPPORTCHAT_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Saved theme preference; absent means "use the default".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default)]
    pub numbered_lists: NumberedListStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Persist just the theme preference, keeping whatever else is on disk.
    pub fn save_theme(theme: Theme) -> Result<(), ConfigError> {
        Self::save_theme_to(&Self::config_path()?, theme)
    }

    /// An unreadable file is left alone rather than replaced with defaults.
    pub fn save_theme_to(path: &Path, theme: Theme) -> Result<(), ConfigError> {
        let mut config = Self::load_from(path)?;
        config.theme = Some(theme);
        config.save_to(path)
    }

    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("supportchat"))
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Environment first, then the file, then the default.
    pub fn resolved_base_url(&self) -> String {
        std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|url| !url.is_empty())
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn log_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.log_file {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("supportchat.log")),
        }
    }

    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            numbered_lists: self.numbered_lists,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.numbered_lists, NumberedListStyle::Bare);
        assert!(config.theme.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            base_url: Some("https://help.example.com".to_string()),
            theme: Some(Theme::Dark),
            numbered_lists: NumberedListStyle::Ordered,
            log_file: None,
        };

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();

        assert_eq!(loaded, config);
        assert_eq!(loaded.format_options().numbered_lists, NumberedListStyle::Ordered);
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.theme, Some(Theme::Dark));
        assert_eq!(config.base_url, None);
    }

    #[test]
    fn test_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_save_theme_keeps_other_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"base_url":"https://help.example.com","numbered_lists":"ordered"}"#)
            .unwrap();

        Config::save_theme_to(&path, Theme::Dark).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.theme, Some(Theme::Dark));
        assert_eq!(config.base_url.as_deref(), Some("https://help.example.com"));
        assert_eq!(config.numbered_lists, NumberedListStyle::Ordered);
    }

    #[test]
    fn test_save_theme_leaves_broken_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"base_url": "https://help.example.com",,}"#).unwrap();

        let result = Config::save_theme_to(&path, Theme::Dark);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            r#"{"base_url": "https://help.example.com",,}"#
        );
    }

    #[test]
    fn test_explicit_log_file() {
        let config = Config {
            log_file: Some(PathBuf::from("/tmp/chat.log")),
            ..Config::new()
        };
        assert_eq!(config.log_path().unwrap(), PathBuf::from("/tmp/chat.log"));
    }
}
