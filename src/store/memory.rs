//! Process-local configuration store

use async_trait::async_trait;
use std::collections::BTreeMap;

use super::ConfigurationStore;
use crate::error::{FormError, Result};
use crate::schema::FormConfiguration;

/// Process-local store, used by tests and embedding callers
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    configurations: BTreeMap<String, FormConfiguration>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the given configurations
    pub fn with_configurations(configurations: impl IntoIterator<Item = FormConfiguration>) -> Self {
        Self {
            configurations: configurations
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }
}

#[async_trait]
impl ConfigurationStore for InMemoryStore {
    async fn load_configuration(&self, id: &str) -> Result<FormConfiguration> {
        self.configurations
            .get(id)
            .cloned()
            .ok_or_else(|| FormError::NotFound(format!("configuration '{id}'")))
    }

    async fn save_configuration(&mut self, config: &FormConfiguration) -> Result<()> {
        self.configurations.insert(config.id.clone(), config.clone());
        Ok(())
    }

    async fn find_by_template(&self, template_id: &str) -> Result<Option<FormConfiguration>> {
        Ok(self
            .configurations
            .values()
            .find(|c| c.template_id.as_deref() == Some(template_id))
            .cloned())
    }
}
