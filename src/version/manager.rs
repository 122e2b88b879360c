//! Store-backed version lifecycle

use chrono::Utc;
use tracing::{debug, info, warn};

use super::transitions::{self, PublishPolicy};
use crate::error::{FormError, Result};
use crate::schema::{FormConfiguration, SchemaMutation, DEFAULT_CONFIGURATION_ID};
use crate::store::ConfigurationStore;

/// Runs lifecycle transitions against a store
///
/// Every operation computes the complete next configuration first and then
/// saves it in a single call, so a rejected operation never writes.
pub struct VersionManager<S> {
    store: S,
    policy: PublishPolicy,
}

impl<S: ConfigurationStore> VersionManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            policy: PublishPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PublishPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> PublishPolicy {
        self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub async fn load(&self, id: &str) -> Result<FormConfiguration> {
        self.store.load_configuration(id).await
    }

    /// Load the system default configuration, seeding it on first use
    pub async fn ensure_default(&mut self) -> Result<FormConfiguration> {
        match self.store.load_configuration(DEFAULT_CONFIGURATION_ID).await {
            Err(FormError::NotFound(_)) => {
                let config =
                    FormConfiguration::seeded(DEFAULT_CONFIGURATION_ID, "Default Configuration");
                self.store.save_configuration(&config).await?;
                info!(id = %config.id, version = %config.version, "seeded default configuration");
                Ok(config)
            }
            other => other,
        }
    }

    /// The schema end users are served
    ///
    /// A configuration bound to `template_id` wins; otherwise the system
    /// default is used. `NotFound` when neither exists. Open drafts are never
    /// served: the result is the published baseline.
    pub async fn get_active_schema(&self, template_id: Option<&str>) -> Result<FormConfiguration> {
        if let Some(template_id) = template_id {
            if let Some(config) = self.store.find_by_template(template_id).await? {
                debug!(%template_id, id = %config.id, "using template configuration");
                return Ok(config.live_schema());
            }
        }
        self.store
            .load_configuration(DEFAULT_CONFIGURATION_ID)
            .await
            .map(|config| config.live_schema())
            .map_err(|err| match err {
                FormError::NotFound(_) => FormError::NotFound(match template_id {
                    Some(template_id) => format!(
                        "no configuration for template '{template_id}' and no default configuration"
                    ),
                    None => "no default configuration".to_string(),
                }),
                other => other,
            })
    }

    /// Apply a mutation and persist the resulting draft
    pub async fn apply_mutation(
        &mut self,
        config: &FormConfiguration,
        mutation: &SchemaMutation,
    ) -> Result<FormConfiguration> {
        let next = transitions::mutate(config, mutation).inspect_err(|err| {
            warn!(id = %config.id, %mutation, error = %err, "mutation rejected");
        })?;
        self.store.save_configuration(&next).await?;
        info!(id = %next.id, %mutation, "mutation applied");
        Ok(next)
    }

    /// Persist the working sections of a draft; a no-op while published
    pub async fn save_draft(&mut self, config: &FormConfiguration) -> Result<FormConfiguration> {
        match transitions::save_draft(config)? {
            Some(next) => {
                self.store.save_configuration(&next).await?;
                info!(id = %next.id, version = %next.version, "draft saved");
                Ok(next)
            }
            None => {
                debug!(id = %config.id, "no draft to save");
                Ok(config.clone())
            }
        }
    }

    pub async fn publish(&mut self, config: &FormConfiguration) -> Result<FormConfiguration> {
        let next = transitions::publish(config, Utc::now(), self.policy).inspect_err(|err| {
            warn!(id = %config.id, error = %err, "publish rejected");
        })?;
        self.store.save_configuration(&next).await?;
        info!(
            id = %next.id,
            from = %config.version,
            to = %next.version,
            "configuration published"
        );
        Ok(next)
    }

    pub async fn discard_draft(&mut self, config: &FormConfiguration) -> Result<FormConfiguration> {
        let next = transitions::discard_draft(config)?;
        self.store.save_configuration(&next).await?;
        info!(id = %next.id, version = %next.version, "draft discarded");
        Ok(next)
    }

    pub async fn rollback(&mut self, config: &FormConfiguration) -> Result<FormConfiguration> {
        let next = transitions::rollback(config).inspect_err(|err| {
            warn!(id = %config.id, error = %err, "rollback rejected");
        })?;
        self.store.save_configuration(&next).await?;
        info!(
            id = %next.id,
            from = %config.version,
            to = %next.version,
            "configuration rolled back"
        );
        Ok(next)
    }

    /// Reload the persisted configuration, dropping any in-memory edits
    pub async fn restore_default(&self, id: &str) -> Result<FormConfiguration> {
        let config = self.store.load_configuration(id).await?;
        debug!(%id, version = %config.version, "configuration restored from store");
        Ok(config)
    }
}
