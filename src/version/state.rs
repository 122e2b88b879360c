//! Lifecycle states of a configuration and the legal transitions between them

use serde::Serialize;
use std::fmt;

use crate::error::{FormError, Result};
use crate::schema::FormConfiguration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VersionState {
    /// Sections equal the published baseline
    Published,
    /// Persisted edits not yet published
    Draft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Transition {
    Mutate,
    SaveDraft,
    Publish,
    DiscardDraft,
    Rollback,
}

impl Transition {
    pub const ALL: [Transition; 5] = [
        Transition::Mutate,
        Transition::SaveDraft,
        Transition::Publish,
        Transition::DiscardDraft,
        Transition::Rollback,
    ];
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mutate => "mutate",
            Self::SaveDraft => "save draft",
            Self::Publish => "publish",
            Self::DiscardDraft => "discard draft",
            Self::Rollback => "rollback",
        };
        f.write_str(name)
    }
}

impl VersionState {
    pub fn of(config: &FormConfiguration) -> Self {
        if config.is_draft {
            Self::Draft
        } else {
            Self::Published
        }
    }

    /// State after `transition`, or `InvalidOperation` when it is not allowed
    ///
    /// Preconditions that depend on more than the state (a rollback snapshot,
    /// a valid schema) are checked by the transition itself.
    pub fn next(self, transition: Transition) -> Result<Self> {
        use Transition::*;
        use VersionState::*;

        match (self, transition) {
            (_, Mutate) => Ok(Draft),
            (state, SaveDraft) => Ok(state),
            (_, Publish) => Ok(Published),
            (Draft, DiscardDraft) => Ok(Published),
            (Published, DiscardDraft) => Err(FormError::InvalidOperation(
                "there is no draft to discard".to_string(),
            )),
            (Published, Rollback) => Ok(Published),
            (Draft, Rollback) => Err(FormError::InvalidOperation(
                "cannot roll back while a draft is open; publish or discard it first".to_string(),
            )),
        }
    }
}

impl fmt::Display for VersionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Published => f.write_str("published"),
            Self::Draft => f.write_str("draft"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn outcome(state: VersionState, transition: Transition) -> Option<VersionState> {
        state.next(transition).ok()
    }

    #[test]
    fn test_transition_table() {
        use Transition::*;
        use VersionState::*;

        let table = [
            (Published, Mutate, Some(Draft)),
            (Published, SaveDraft, Some(Published)),
            (Published, Publish, Some(Published)),
            (Published, DiscardDraft, None),
            (Published, Rollback, Some(Published)),
            (Draft, Mutate, Some(Draft)),
            (Draft, SaveDraft, Some(Draft)),
            (Draft, Publish, Some(Published)),
            (Draft, DiscardDraft, Some(Published)),
            (Draft, Rollback, None),
        ];
        for (from, transition, expected) in table {
            assert_eq!(outcome(from, transition), expected, "{from} --{transition}-->");
        }
    }

    #[test]
    fn test_rejections_are_invalid_operation() {
        assert!(matches!(
            VersionState::Published.next(Transition::DiscardDraft),
            Err(FormError::InvalidOperation(_))
        ));
        assert!(matches!(
            VersionState::Draft.next(Transition::Rollback),
            Err(FormError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_state_of_configuration() {
        let mut config = FormConfiguration::seeded("default", "Default");
        assert_eq!(VersionState::of(&config), VersionState::Published);
        config.is_draft = true;
        assert_eq!(VersionState::of(&config), VersionState::Draft);
    }
}
