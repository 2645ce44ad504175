//! Transport-free executor, used for dry runs and engine tests

use async_trait::async_trait;
use serde_json::Value;

use shared::{Assertion, AssertionCall, NoOpTask};

use crate::error::AdapterResult;
use crate::traits::Executor;

pub struct NoOp {
    task: NoOpTask,
}

impl NoOp {
    pub fn new(task: NoOpTask) -> Self {
        Self { task }
    }
}

#[async_trait]
impl Executor for NoOp {
    fn has_assertions(&self) -> bool {
        !self.task.assertions.is_empty()
    }

    /// Each configured field is compared against its `reported` value (null when absent)
    async fn execute(&self) -> AdapterResult<Vec<AssertionCall>> {
        Ok(self
            .task
            .assertions
            .iter()
            .map(|(field, _)| {
                let actual = self.task.reported.get(field).cloned().unwrap_or(Value::Null);
                Assertion::equal(field, &self.task.assertions, "noop reported value")
                    .evaluate(actual)
            })
            .collect())
    }

    fn represent(&self) -> String {
        format!("NoOp {}", self.task.execution_mode.represent())
    }
}
