//! Domain model for scheme ownership.
//!
//! Holds this installation's identity, the classification of the current
//! scheme owner, and the consent questions asked before changing it.

mod consent;
mod error;
mod identity;
mod ownership;

pub use consent::{ConsentAnswer, ConsentQuestion};
pub use error::AssociationDomainError;
pub use identity::InstallationIdentity;
pub use ownership::OwnershipState;
