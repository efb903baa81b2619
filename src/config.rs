//! User configuration
//!
//! A small TOML file in the platform config directory. Every field has a
//! default, so a missing file or a partially filled one both work.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::template::TemplateLibrary;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Template library root. Defaults to the platform data directory.
    pub template_library_dir: Option<PathBuf>,
    /// Fill missing canonical components with placeholders by default.
    pub complete_missing: bool,
    /// Mermaid CLI command used for diagram rendering.
    pub mermaid_command: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            template_library_dir: None,
            complete_missing: false,
            mermaid_command: "mmdc".to_string(),
        }
    }
}

impl Config {
    /// Load config from the config directory, falling back to defaults.
    pub fn load() -> Result<Self> {
        if let Some(config_path) = Self::get_config_path() {
            if config_path.exists() {
                let content = fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&content)?;
                return Ok(config);
            }
        }
        Ok(Config::default())
    }

    /// Save config to the config directory.
    pub fn save(&self) -> Result<()> {
        if let Some(config_path) = Self::get_config_path() {
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(self)?;
            fs::write(&config_path, content)?;
        }
        Ok(())
    }

    /// Path to the config file.
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mdocx").join("config.toml"))
    }

    /// Effective template library root.
    pub fn library_root(&self) -> PathBuf {
        self.template_library_dir
            .clone()
            .unwrap_or_else(TemplateLibrary::default_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_partial_files() {
        let config: Config = toml::from_str("complete_missing = true").unwrap();
        assert!(config.complete_missing);
        assert_eq!(config.mermaid_command, "mmdc");
        assert!(config.template_library_dir.is_none());
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = Config::default();
        config.template_library_dir = Some(PathBuf::from("/srv/templates"));
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.library_root(), PathBuf::from("/srv/templates"));
    }
}
