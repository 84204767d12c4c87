//! Step definitions for dispatch delegation scenarios.

mod given;
mod then;
mod when;
pub mod world;
