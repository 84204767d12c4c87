//! In-memory routing adapters for tests and deterministic flows.

mod launcher;
mod store;

pub use launcher::RecordingLauncher;
pub use store::InMemoryRegistryStore;
