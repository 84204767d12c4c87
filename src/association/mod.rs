//! OS scheme ownership for linkhandler.
//!
//! Decides at startup whether this installation owns the link scheme, asks
//! for consent before taking it over, and wires the installation into the
//! owner's proxy list when another compatible installation already owns it.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
