//! Trait abstraction for configuration persistence to enable mocking in tests

use async_trait::async_trait;

use crate::error::Result;
use crate::schema::FormConfiguration;

/// Persistence seam for form configurations
///
/// Implementations must replace a configuration atomically on save; readers
/// never observe a half-written document.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfigurationStore: Send + Sync {
    /// Load a configuration by id, `NotFound` when absent
    async fn load_configuration(&self, id: &str) -> Result<FormConfiguration>;

    /// Replace (or create) the stored configuration with the same id
    async fn save_configuration(&mut self, config: &FormConfiguration) -> Result<()>;

    /// Find the configuration bound to a template, if any
    async fn find_by_template(&self, template_id: &str) -> Result<Option<FormConfiguration>>;
}
