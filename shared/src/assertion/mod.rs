//! Assertion engine: expected-vs-actual evaluation per field

pub mod call;
pub mod diff;

pub use call::{Assertion, AssertionCall, AssertionStatus, Comparison, PendingAssertion, evaluate};
pub use diff::{DiffEntry, UnorderedDiff};
