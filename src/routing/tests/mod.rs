//! Unit tests for the routing module.

mod dispatch_tests;
mod domain_tests;
