//! Configuration file support for Ficha.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/ficha/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub editor: EditorConfig,

    #[serde(default)]
    pub taxonomy: TaxonomyConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Defaults used while authoring plans
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default = "default_set_count")]
    pub default_set_count: u32,

    #[serde(default = "default_rest_seconds")]
    pub default_rest_seconds: u32,

    /// Technique given to exercises when their Bi-Set is dissolved
    #[serde(default)]
    pub default_technique: Option<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_set_count: default_set_count(),
            default_rest_seconds: default_rest_seconds(),
            default_technique: None,
        }
    }
}

/// Muscle groups accepted on top of the built-in vocabulary
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct TaxonomyConfig {
    #[serde(default)]
    pub extra_muscle_groups: Vec<String>,
}

// Default value functions
fn home_or_cwd() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| home_or_cwd().join(".local/share"));
    base.join("ficha")
}

fn default_set_count() -> u32 {
    3
}

fn default_rest_seconds() -> u32 {
    60
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.check()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| home_or_cwd().join(".config"));
        base.join("ficha").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    fn check(&self) -> Result<()> {
        if self.editor.default_set_count == 0 {
            return Err(Error::Config(
                "editor.default_set_count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.editor.default_set_count, 3);
        assert_eq!(config.editor.default_rest_seconds, 60);
        assert!(config.editor.default_technique.is_none());
        assert!(config.taxonomy.extra_muscle_groups.is_empty());
        assert!(config.data.data_dir.ends_with("ficha"));
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[editor]
default_rest_seconds = 90
default_technique = "Normal"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.editor.default_rest_seconds, 90);
        assert_eq!(config.editor.default_set_count, 3); // default
        assert_eq!(config.editor.default_technique.as_deref(), Some("Normal"));
    }

    #[test]
    fn test_save_and_load_from() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.taxonomy.extra_muscle_groups = vec!["Adutores".into()];
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.taxonomy.extra_muscle_groups, vec!["Adutores"]);
        assert_eq!(loaded.data.data_dir, config.data.data_dir);
    }

    #[test]
    fn test_zero_default_sets_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[editor]\ndefault_set_count = 0\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
