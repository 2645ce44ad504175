//! Task specifications: one adapter action plus its expected outcomes

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

use super::{AdapterKind, ExecutionMode, Payload};

/// Consumption window used when a broker task sets no `timeout_after`
pub const DEFAULT_TIMEOUT_AFTER_SECS: f64 = 2.0;

/// Expected values keyed by field name.
///
/// A field present in the map is evaluated; a missing field is skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assertions(BTreeMap<String, Value>);

impl Assertions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for constructing specs in code
    pub fn with(mut self, field: impl Into<String>, expected: impl Into<Value>) -> Self {
        self.0.insert(field.into(), expected.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Broker consumption window from the `timeout_after` field (seconds).
    ///
    /// Values that are not a representable duration fall back to the default.
    pub fn timeout_after(&self) -> Duration {
        let default = Duration::from_secs_f64(DEFAULT_TIMEOUT_AFTER_SECS);
        self.get("timeout_after")
            .and_then(Value::as_f64)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or(default)
    }
}

impl From<BTreeMap<String, Value>> for Assertions {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Assertions {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A single HTTP request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestTask {
    #[serde(default)]
    pub execution_mode: ExecutionMode,
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<Payload>,
    #[serde(default)]
    pub assertions: Assertions,
}

/// Ordered HTTP requests run as one logical unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBatchTask {
    #[serde(default)]
    pub execution_mode: ExecutionMode,
    #[serde(default)]
    pub requests: Vec<RequestTask>,
}

/// Publish to, or consume from, a broker topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerTask {
    #[serde(default)]
    pub execution_mode: ExecutionMode,
    pub topic: String,
    #[serde(default)]
    pub events: Vec<Payload>,
    #[serde(default)]
    pub assertions: Assertions,
}

/// Transport-free task; `reported` holds the values it pretends to observe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoOpTask {
    #[serde(default)]
    pub execution_mode: ExecutionMode,
    #[serde(default)]
    pub assertions: Assertions,
    #[serde(default)]
    pub reported: BTreeMap<String, Value>,
}

/// Unit of work, tagged by the adapter that executes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "adapter")]
pub enum TaskSpec {
    #[serde(rename = "request/http")]
    Request(RequestTask),
    #[serde(rename = "request/http/events")]
    RequestBatch(RequestBatchTask),
    #[serde(rename = "broker/kafka")]
    Broker(BrokerTask),
    #[serde(rename = "noop")]
    NoOp(NoOpTask),
}

impl TaskSpec {
    pub fn adapter(&self) -> AdapterKind {
        match self {
            TaskSpec::Request(_) => AdapterKind::RequestHttp,
            TaskSpec::RequestBatch(_) => AdapterKind::RequestHttpEvents,
            TaskSpec::Broker(_) => AdapterKind::BrokerKafka,
            TaskSpec::NoOp(_) => AdapterKind::NoOp,
        }
    }

    pub fn execution_mode(&self) -> ExecutionMode {
        match self {
            TaskSpec::Request(task) => task.execution_mode,
            TaskSpec::RequestBatch(task) => task.execution_mode,
            TaskSpec::Broker(task) => task.execution_mode,
            TaskSpec::NoOp(task) => task.execution_mode,
        }
    }

    /// Assertions mapping of the task; batches have none of their own
    pub fn assertions(&self) -> Option<&Assertions> {
        match self {
            TaskSpec::Request(task) => Some(&task.assertions),
            TaskSpec::RequestBatch(_) => None,
            TaskSpec::Broker(task) => Some(&task.assertions),
            TaskSpec::NoOp(task) => Some(&task.assertions),
        }
    }

    /// Batches always count as configured; their inner requests are checked when run.
    pub fn has_assertions(&self) -> bool {
        self.assertions().is_none_or(|assertions| !assertions.is_empty())
    }

    /// Returns the task bound to `mode`. Batches pass the mode on to their requests.
    pub fn with_execution_mode(self, mode: ExecutionMode) -> Self {
        match self {
            TaskSpec::Request(task) => TaskSpec::Request(RequestTask {
                execution_mode: mode,
                ..task
            }),
            TaskSpec::RequestBatch(task) => TaskSpec::RequestBatch(RequestBatchTask {
                execution_mode: mode,
                requests: task
                    .requests
                    .into_iter()
                    .map(|request| RequestTask {
                        execution_mode: mode,
                        ..request
                    })
                    .collect(),
            }),
            TaskSpec::Broker(task) => TaskSpec::Broker(BrokerTask {
                execution_mode: mode,
                ..task
            }),
            TaskSpec::NoOp(task) => TaskSpec::NoOp(NoOpTask {
                execution_mode: mode,
                ..task
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_timeout_after_defaults_to_two_seconds() {
        let assertions = Assertions::new().with("total_events", 1);
        assert_eq!(assertions.timeout_after(), Duration::from_secs(2));
    }

    #[test]
    fn test_timeout_after_reads_fractional_seconds() {
        let assertions = Assertions::new().with("timeout_after", 0.5);
        assert_eq!(assertions.timeout_after(), Duration::from_millis(500));
    }

    #[test]
    fn test_timeout_after_ignores_negative_values() {
        let assertions = Assertions::new().with("timeout_after", -3);
        assert_eq!(assertions.timeout_after(), Duration::from_secs(2));
    }

    #[test]
    fn test_timeout_after_out_of_range_falls_back_to_default() {
        let feature = crate::Feature::from_json_str(
            r#"{
                "feature": "huge window",
                "scenarios": [{
                    "description": "consume",
                    "validate": [{
                        "adapter": "broker/kafka",
                        "topic": "orders",
                        "assertions": { "total_events": 1, "timeout_after": 1e20 }
                    }]
                }]
            }"#,
        )
        .unwrap();

        let TaskSpec::Broker(task) = &feature.scenarios[0].validate_tasks[0] else {
            panic!("expected a broker task");
        };
        assert_eq!(task.assertions.timeout_after(), Duration::from_secs(2));
    }

    #[test]
    fn test_batch_counts_as_configured_even_when_empty() {
        let batch = TaskSpec::RequestBatch(RequestBatchTask {
            execution_mode: ExecutionMode::Simulating,
            requests: vec![],
        });
        assert!(batch.has_assertions());
        assert!(batch.assertions().is_none());
    }

    #[test]
    fn test_empty_assertions_are_not_configured() {
        let task = TaskSpec::NoOp(NoOpTask::default());
        assert!(!task.has_assertions());
    }

    #[test]
    fn test_mode_propagates_into_batch_requests() {
        let spec: TaskSpec = serde_json::from_value(json!({
            "adapter": "request/http/events",
            "requests": [
                { "method": "GET", "url": "http://localhost/a" },
                { "method": "GET", "url": "http://localhost/b" }
            ]
        }))
        .unwrap();

        let TaskSpec::RequestBatch(batch) = spec.with_execution_mode(ExecutionMode::Validating)
        else {
            panic!("expected a batch");
        };
        assert_eq!(batch.execution_mode, ExecutionMode::Validating);
        assert!(
            batch
                .requests
                .iter()
                .all(|r| r.execution_mode == ExecutionMode::Validating)
        );
    }

    #[test]
    fn test_adapter_tag_selects_variant() {
        let spec: TaskSpec = serde_json::from_value(json!({
            "adapter": "broker/kafka",
            "topic": "orders",
            "events": ["a", {"b": 1}],
            "assertions": { "events_produced": 2 }
        }))
        .unwrap();

        assert_eq!(spec.adapter(), AdapterKind::BrokerKafka);
        let TaskSpec::Broker(task) = spec else {
            panic!("expected a broker task");
        };
        assert_eq!(task.events[0].as_bytes(), b"a");
        assert_eq!(task.events[1].as_bytes(), br#"{"b":1}"#);
    }
}
