//! Link routing for linkhandler.
//!
//! This module turns an incoming scheme link into a launched handler
//! executable: parsing the link into a category, keeping the per-installation
//! category-to-handler registry, and resolving handlers through proxy
//! installations. The module follows hexagonal architecture:
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
