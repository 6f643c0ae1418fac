//! Bridge configuration, loaded from `.tfbridge/config.toml` under the
//! workspace root. Missing file means defaults; a malformed file is a
//! configuration error, not a silent fallback.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_DIR: &str = ".tfbridge";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Executable name or path of the external version-control client.
    pub tool_path: String,
    /// Master toggle for automatic checkout on edit.
    pub auto_checkout: bool,
    /// Restrict auto-checkout triggering to save signals only.
    pub auto_checkout_on_save_only: bool,
    /// Forward credential environment variables into tool subprocesses.
    pub use_integrated_credentials: bool,
    /// Whether collaborating UIs should display per-file status.
    pub show_file_status: bool,
    /// Log verbosity, an env-filter directive string.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool_path: "tf".to_string(),
            auto_checkout: true,
            auto_checkout_on_save_only: false,
            use_integrated_credentials: false,
            show_file_status: true,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn config_path(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&text)
            .map_err(|e| Error::Configuration(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = Self::config_path(root);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(self)
            .map_err(|e| Error::Configuration(e.to_string()))?;
        std::fs::write(&path, text)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.tool_path.trim().is_empty() {
            return Err(Error::Configuration(
                "tool_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.tool_path, "tf");
        assert!(config.auto_checkout);
        assert!(!config.auto_checkout_on_save_only);
        assert!(!config.use_integrated_credentials);
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(temp_dir.path()).unwrap();
        assert_eq!(config.tool_path, "tf");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.tool_path = "/opt/tee/tf".to_string();
        config.auto_checkout_on_save_only = true;
        config.save(temp_dir.path()).unwrap();

        let loaded = Config::load(temp_dir.path()).unwrap();
        assert_eq!(loaded.tool_path, "/opt/tee/tf");
        assert!(loaded.auto_checkout_on_save_only);
    }

    #[test]
    fn test_malformed_file_is_a_configuration_error() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILE), "tool_path = [not toml").unwrap();

        let err = Config::load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_empty_tool_path_rejected() {
        let config = Config {
            tool_path: "  ".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::Configuration(_))
        ));
    }
}
