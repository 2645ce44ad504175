//! Common test utilities and infrastructure for engine test suites

pub mod fixtures;
pub mod helpers;

pub use fixtures::TestFixtures;
pub use helpers::{ScriptedFactory, TestHelpers};
