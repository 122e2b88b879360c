//! One JSON document per configuration in a directory

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::ConfigurationStore;
use crate::error::{FormError, Result};
use crate::schema::FormConfiguration;

/// Directory-backed store writing `<id>.json` files
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        if id.is_empty() || id.starts_with('.') || id.contains(['/', '\\']) {
            return Err(FormError::InvalidOperation(format!(
                "'{id}' is not a valid configuration id"
            )));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }

    async fn read(path: &Path) -> Result<FormConfiguration> {
        let content = fs::read_to_string(path).await?;
        let mut config: FormConfiguration = serde_json::from_str(&content)?;
        config.restore_missing_baseline();
        if !config.has_published_baseline() {
            tracing::warn!(id = %config.id, "draft stored without a published baseline");
        }
        config.refresh_metadata();
        Ok(config)
    }
}

#[async_trait]
impl ConfigurationStore for JsonFileStore {
    async fn load_configuration(&self, id: &str) -> Result<FormConfiguration> {
        let path = self.path_for(id)?;
        match Self::read(&path).await {
            Err(FormError::Io(err)) if err.kind() == ErrorKind::NotFound => {
                Err(FormError::NotFound(format!("configuration '{id}'")))
            }
            other => other,
        }
    }

    async fn save_configuration(&mut self, config: &FormConfiguration) -> Result<()> {
        let path = self.path_for(&config.id)?;
        fs::create_dir_all(&self.dir).await?;

        // Write beside the target and rename so a crash never leaves a torn file
        let tmp = self.dir.join(format!(".{}.json.tmp", config.id));
        let content = serde_json::to_string_pretty(config)?;
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &path).await?;

        tracing::debug!(id = %config.id, path = %path.display(), "configuration saved");
        Ok(())
    }

    async fn find_by_template(&self, template_id: &str) -> Result<Option<FormConfiguration>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_document = path.extension().is_some_and(|ext| ext == "json")
                && !entry.file_name().to_string_lossy().starts_with('.');
            if is_document {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            // One unreadable document must not hide the others
            let config = match Self::read(&path).await {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable configuration");
                    continue;
                }
            };
            if config.template_id.as_deref() == Some(template_id) {
                return Ok(Some(config));
            }
        }
        Ok(None)
    }
}
