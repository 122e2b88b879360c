//! Configuration persistence

mod file;
mod memory;
mod traits;

pub use file::JsonFileStore;
pub use memory::InMemoryStore;
pub use traits::ConfigurationStore;

#[cfg(test)]
pub use traits::MockConfigurationStore;
