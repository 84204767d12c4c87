//! Port contracts for scheme ownership.

mod association;
mod prompt;

pub use association::{AssociationError, AssociationResult, SchemeAssociation};
pub use prompt::ConsentPrompt;
