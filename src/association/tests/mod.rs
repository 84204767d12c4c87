//! Unit tests for the association module.
