//! Adapter implementations for registry persistence and handler launching.

pub mod memory;

mod json_file;
mod process;

pub use json_file::{JsonFileRegistryStore, REGISTRY_FILE_NAME};
pub use process::SpawnLauncher;
