//! Domain model for link routing.
//!
//! Categories, parsed scheme links, and the per-installation handler table
//! live here together with the path helpers used to compare installations.
//! Persistence and process launching remain outside this boundary.

mod category;
mod command_line;
mod error;
mod link;
mod table;

pub use category::{Category, HandlerTarget};
pub use command_line::{same_location, stripped_command_line, stripped_command_line_with};
pub use error::RoutingDomainError;
pub use link::SchemeLink;
pub use table::{HandlerEntry, HandlerTable, RegistrationOutcome};
