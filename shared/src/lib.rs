//! Shared types for the scenario runner
//!
//! Holds the scenario data model, the assertion engine used by every
//! adapter, feature-file loading, and logging setup.

pub mod assertion;
pub mod errors;
pub mod loader;
pub mod logging;
pub mod types;

pub use assertion::{
    Assertion, AssertionCall, AssertionStatus, Comparison, PendingAssertion, UnorderedDiff,
};
pub use errors::*;
pub use types::*;
