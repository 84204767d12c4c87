//! linkhandler: routes URL-scheme links to per-category handler executables.
//!
//! An installation claims a custom URL scheme (`nxm` by default) with the
//! operating system, keeps a registry mapping link categories to handler
//! executables, and launches the matching handler when a link arrives.
//! Several installations cooperate through proxies: an installation that
//! does not own the scheme registers itself with the owner, which then
//! falls back to it for categories it does not map.
//!
//! # Architecture
//!
//! linkhandler follows hexagonal architecture principles:
//!
//! - **Domain**: Pure rules with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (files, OS association,
//!   processes, in-memory fakes)
//!
//! # Modules
//!
//! - [`routing`]: Link parsing, handler registries, and dispatch
//! - [`association`]: OS scheme ownership and startup reconciliation
//! - [`app`]: One invocation wired end to end
//! - [`config`]: Environment configuration
//! - [`cli`]: Command-line surface

pub mod app;
pub mod association;
pub mod cli;
pub mod config;
pub mod routing;
