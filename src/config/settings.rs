//! Configuration settings for Lese.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub catalog: CatalogSettings,
    pub assistant: AssistantSettings,
    pub covers: CoverSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.lese".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Catalog storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Path to the SQLite catalog database.
    pub sqlite_path: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            sqlite_path: "~/.lese/library.db".to_string(),
        }
    }
}

/// Assistant / chat settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    /// LLM model for the chat session.
    pub model: String,
    /// Maximum tool-dispatch iterations per turn.
    pub max_tool_iterations: usize,
    /// Timeout for model API requests, in seconds.
    pub request_timeout_seconds: u64,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tool_iterations: 10,
            request_timeout_seconds: 60,
        }
    }
}

/// Cover art lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverSettings {
    /// Enable cover lookups during search.
    pub enabled: bool,
    /// Book metadata search endpoint.
    pub endpoint: String,
    /// Timeout for cover lookups, in seconds.
    pub timeout_seconds: u64,
}

impl Default for CoverSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://www.googleapis.com/books/v1/volumes".to_string(),
            timeout_seconds: 5,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::LeseError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lese")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.catalog.sqlite_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.assistant.model, "gpt-4o-mini");
        assert_eq!(settings.assistant.max_tool_iterations, 10);
        assert!(settings.covers.enabled);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [assistant]
            model = "gpt-4o"
            "#,
        )
        .unwrap();
        assert_eq!(settings.assistant.model, "gpt-4o");
        assert_eq!(settings.assistant.max_tool_iterations, 10);
        assert_eq!(settings.catalog.sqlite_path, "~/.lese/library.db");
    }
}
