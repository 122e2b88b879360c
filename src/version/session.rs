//! Administrator editing session over one configuration

use tracing::debug;

use super::{transitions, VersionManager};
use crate::engine::FieldValues;
use crate::error::Result;
use crate::render::{render_form, RenderMode, RenderedForm};
use crate::schema::{FormConfiguration, SchemaMutation};
use crate::store::ConfigurationStore;

/// Working copy of a configuration plus the manager that persists it
///
/// `edit` only changes the working copy; nothing reaches the store until
/// `save_draft` or `publish`.
pub struct EditorSession<S> {
    manager: VersionManager<S>,
    working: FormConfiguration,
    pending_edits: usize,
}

impl<S: ConfigurationStore> EditorSession<S> {
    pub async fn open(manager: VersionManager<S>, id: &str) -> Result<Self> {
        let working = manager.load(id).await?;
        Ok(Self {
            manager,
            working,
            pending_edits: 0,
        })
    }

    pub fn working_copy(&self) -> &FormConfiguration {
        &self.working
    }

    pub fn pending_edits(&self) -> usize {
        self.pending_edits
    }

    pub fn has_pending_edits(&self) -> bool {
        self.pending_edits > 0
    }

    pub fn manager(&self) -> &VersionManager<S> {
        &self.manager
    }

    pub fn into_manager(self) -> VersionManager<S> {
        self.manager
    }

    /// Apply a validated mutation to the working copy only
    pub fn edit(&mut self, mutation: &SchemaMutation) -> Result<()> {
        self.working = transitions::mutate(&self.working, mutation)?;
        self.pending_edits += 1;
        debug!(id = %self.working.id, %mutation, pending = self.pending_edits, "edit staged");
        Ok(())
    }

    pub async fn save_draft(&mut self) -> Result<()> {
        self.working = self.manager.save_draft(&self.working).await?;
        self.pending_edits = 0;
        Ok(())
    }

    pub async fn publish(&mut self) -> Result<()> {
        self.working = self.manager.publish(&self.working).await?;
        self.pending_edits = 0;
        Ok(())
    }

    pub async fn discard_draft(&mut self) -> Result<()> {
        self.working = self.manager.discard_draft(&self.working).await?;
        self.pending_edits = 0;
        Ok(())
    }

    pub async fn rollback(&mut self) -> Result<()> {
        self.working = self.manager.rollback(&self.working).await?;
        self.pending_edits = 0;
        Ok(())
    }

    /// Drop local edits and reload the last persisted state
    pub async fn restore_default(&mut self) -> Result<()> {
        self.working = self.manager.restore_default(&self.working.id).await?;
        self.pending_edits = 0;
        Ok(())
    }

    /// Read-only rendering of the working copy
    pub fn preview(&self, values: &FieldValues) -> RenderedForm {
        render_form(&self.working, values, RenderMode::Preview)
    }

    pub fn render(&self, values: &FieldValues) -> RenderedForm {
        render_form(&self.working, values, RenderMode::Editable)
    }
}
