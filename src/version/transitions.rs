//! Pure lifecycle transitions over a configuration
//!
//! Each function takes the current configuration by reference and returns
//! the next one. Nothing here performs I/O; persisting the result is the
//! caller's job, and an `Err` means there is nothing to persist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Transition, VersionState};
use crate::error::{FormError, Result};
use crate::schema::{validate, FormConfiguration, SchemaMutation};

/// What to do when publishing a configuration with no changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PublishPolicy {
    /// Publish anyway, advancing the version
    #[default]
    AlwaysAdvance,
    /// Fail with `InvalidOperation`
    RejectUnchanged,
}

/// Apply a structural edit, opening (or continuing) a draft
pub fn mutate(config: &FormConfiguration, mutation: &SchemaMutation) -> Result<FormConfiguration> {
    VersionState::of(config).next(Transition::Mutate)?;
    let mut next = mutation.apply(config)?;
    next.is_draft = true;
    Ok(next)
}

/// The configuration to persist as a draft, or `None` when there is no draft
pub fn save_draft(config: &FormConfiguration) -> Result<Option<FormConfiguration>> {
    let state = VersionState::of(config);
    state.next(Transition::SaveDraft)?;
    if state == VersionState::Published {
        return Ok(None);
    }
    ensure_valid(config)?;

    let mut next = config.clone();
    next.refresh_metadata();
    Ok(Some(next))
}

/// Promote the working sections to the published baseline
///
/// The previous baseline becomes the rollback snapshot and the minor version
/// advances by one.
pub fn publish(
    config: &FormConfiguration,
    now: DateTime<Utc>,
    policy: PublishPolicy,
) -> Result<FormConfiguration> {
    VersionState::of(config).next(Transition::Publish)?;

    if !config.is_draft && !config.has_unpublished_changes() {
        match policy {
            PublishPolicy::RejectUnchanged => {
                return Err(FormError::InvalidOperation(format!(
                    "configuration '{}' has no changes to publish",
                    config.id
                )));
            }
            PublishPolicy::AlwaysAdvance => {
                tracing::warn!(
                    id = %config.id,
                    version = %config.version,
                    "publishing configuration with no changes"
                );
            }
        }
    }
    ensure_valid(config)?;

    let mut next = config.clone();
    next.last_published_sections =
        std::mem::replace(&mut next.published_sections, next.sections.clone());
    next.version = next.version.next_minor();
    next.published_version = next.version;
    next.is_draft = false;
    next.last_published_at = Some(now);
    next.refresh_metadata();
    Ok(next)
}

/// Revert the working sections to the published baseline
pub fn discard_draft(config: &FormConfiguration) -> Result<FormConfiguration> {
    VersionState::of(config).next(Transition::DiscardDraft)?;
    if !config.has_published_baseline() {
        return Err(FormError::NotAvailable(format!(
            "configuration '{}' has no published baseline to revert to",
            config.id
        )));
    }

    let mut next = config.clone();
    next.sections = next.published_sections.clone();
    next.is_draft = false;
    next.refresh_metadata();
    Ok(next)
}

/// Restore the baseline superseded by the last publish
///
/// The snapshot is consumed, so only one level of undo exists.
pub fn rollback(config: &FormConfiguration) -> Result<FormConfiguration> {
    VersionState::of(config).next(Transition::Rollback)?;
    if !config.has_rollback_snapshot() {
        return Err(FormError::NotAvailable(format!(
            "configuration '{}' has no previous version to roll back to",
            config.id
        )));
    }

    let mut next = config.clone();
    let snapshot = std::mem::take(&mut next.last_published_sections);
    next.sections = snapshot.clone();
    next.published_sections = snapshot;
    next.version = next.version.previous_minor();
    next.published_version = next.version;
    next.refresh_metadata();
    Ok(next)
}

fn ensure_valid(config: &FormConfiguration) -> Result<()> {
    let violations = validate(config);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(FormError::Validation(violations))
    }
}
