//! Draft / publish / rollback lifecycle
//!
//! `state` holds the transition table, `transitions` the pure operations,
//! `manager` persists their results and `session` stages edits for an
//! administrator.

mod manager;
mod session;
mod state;
pub mod transitions;

pub use manager::VersionManager;
pub use session::EditorSession;
pub use state::{Transition, VersionState};
pub use transitions::PublishPolicy;
