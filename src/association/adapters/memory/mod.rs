//! In-memory association adapters for tests and deterministic flows.

mod association;
mod consent;

pub use association::InMemorySchemeAssociation;
pub use consent::FixedConsent;
