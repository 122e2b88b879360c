//! Configuration handling for the editor

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::version::PublishPolicy;

/// Environment variable overriding the configuration store directory
pub const STORE_DIR_ENV: &str = "FORMWRIGHT_STORE_DIR";

/// Default tracing filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "formwright=info";

/// User configuration for the editor
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Directory holding one JSON document per form configuration
    pub store_dir: Option<PathBuf>,
    /// Behaviour when publishing without changes
    pub publish_policy: Option<PublishPolicy>,
    /// Template whose configuration is served when none is given
    pub default_template: Option<String>,
}

impl EditorConfig {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "formwright", "formwright")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the platform config file
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a file, defaulting when it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to the platform config file
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Store directory, honouring the environment override
    pub fn store_dir(&self) -> PathBuf {
        self.resolve_store_dir(std::env::var_os(STORE_DIR_ENV).map(PathBuf::from))
    }

    fn resolve_store_dir(&self, env_override: Option<PathBuf>) -> PathBuf {
        env_override
            .or_else(|| self.store_dir.clone())
            .or_else(|| {
                ProjectDirs::from("io", "formwright", "formwright")
                    .map(|dirs| dirs.data_dir().join("configurations"))
            })
            .unwrap_or_else(|| PathBuf::from("formwright-configurations"))
    }

    pub fn publish_policy(&self) -> PublishPolicy {
        self.publish_policy.unwrap_or_default()
    }
}
