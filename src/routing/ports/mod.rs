//! Port contracts for link routing.

mod launcher;
mod store;

pub use launcher::{LaunchError, LaunchRequest, LaunchResult, ProcessLauncher};
pub use store::{RegistryStore, RegistryStoreError, RegistryStoreResult};
