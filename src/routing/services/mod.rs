//! Application services for handler registration and link dispatch.

mod dispatch;
mod registry;

pub use dispatch::{DispatchError, DispatchOutcome, Dispatcher, HandlerSource};
pub use registry::{HandlerRegistry, HandlerRegistryError, HandlerRegistryResult};
