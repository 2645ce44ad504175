//! Scenario execution engine
//!
//! Drives features through their executors, aggregates phase results into a
//! run verdict, and reports progress.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod reporter;
pub mod result_set;

pub use config::{DEFAULT_POOL_SIZE, EngineConfig, Scheduling};
pub use engine::{Engine, PhaseVerdict, RunReport};
pub use error::{EngineError, EngineResult};
pub use reporter::{ConsoleReporter, RecordingReporter, ReportEvent, Reporter};
pub use result_set::ResultSet;
