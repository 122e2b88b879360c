//! formwright - versioned form schemas
//!
//! Administrators edit a form's sections and fields as drafts, publish them
//! as numbered versions and roll back one step; end users are served the
//! published schema, rendered through a visibility & validation engine that
//! shows and checks fields as dependent answers change.

pub mod config;
pub mod engine;
pub mod error;
pub mod render;
pub mod schema;
pub mod store;
pub mod version;

pub use error::{FormError, Result};
