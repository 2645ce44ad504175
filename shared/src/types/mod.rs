//! Core types describing a scenario run

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod feature;
pub mod payload;
pub mod run;
pub mod task;

pub use feature::{Feature, ScenarioGroup};
pub use payload::Payload;
pub use run::{RunFlags, RunInfo};
pub use task::{
    Assertions, BrokerTask, NoOpTask, RequestBatchTask, RequestTask, TaskSpec,
    DEFAULT_TIMEOUT_AFTER_SECS,
};

/// Which half of a scenario a task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Produce side effects (send requests, publish messages)
    #[default]
    Simulating,
    /// Observe outcomes and check them against expectations
    Validating,
}

impl ExecutionMode {
    pub fn represent(&self) -> &'static str {
        match self {
            ExecutionMode::Simulating => "simulating",
            ExecutionMode::Validating => "validating",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.represent())
    }
}

/// Transport a task is executed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdapterKind {
    #[serde(rename = "request/http")]
    RequestHttp,
    #[serde(rename = "request/http/events")]
    RequestHttpEvents,
    #[serde(rename = "broker/kafka")]
    BrokerKafka,
    #[serde(rename = "noop")]
    NoOp,
}

impl AdapterKind {
    pub fn tag(&self) -> &'static str {
        match self {
            AdapterKind::RequestHttp => "request/http",
            AdapterKind::RequestHttpEvents => "request/http/events",
            AdapterKind::BrokerKafka => "broker/kafka",
            AdapterKind::NoOp => "noop",
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "adapter: {}", self.tag())
    }
}
