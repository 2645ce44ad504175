//! Common test utilities for adapter integration tests

pub mod fixtures;

pub use fixtures::TestFixtures;
