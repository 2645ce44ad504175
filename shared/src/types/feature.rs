//! Features and their scenario groups

use super::{ExecutionMode, TaskSpec};

/// Top-level collection of scenario groups run together
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub description: String,
    pub scenarios: Vec<ScenarioGroup>,
}

impl Feature {
    pub fn new(description: impl Into<String>, scenarios: Vec<ScenarioGroup>) -> Self {
        Self {
            description: description.into(),
            scenarios,
        }
    }

    pub fn total_scenarios(&self) -> usize {
        self.scenarios.len()
    }
}

/// One scenario: simulate tasks followed by validate tasks
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioGroup {
    pub description: String,
    pub simulate_tasks: Vec<TaskSpec>,
    pub validate_tasks: Vec<TaskSpec>,
}

impl ScenarioGroup {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            simulate_tasks: Vec::new(),
            validate_tasks: Vec::new(),
        }
    }

    /// Append a simulate task, binding it to [`ExecutionMode::Simulating`]
    pub fn simulate(mut self, task: TaskSpec) -> Self {
        self.simulate_tasks
            .push(task.with_execution_mode(ExecutionMode::Simulating));
        self
    }

    /// Append a validate task, binding it to [`ExecutionMode::Validating`]
    pub fn validate(mut self, task: TaskSpec) -> Self {
        self.validate_tasks
            .push(task.with_execution_mode(ExecutionMode::Validating));
        self
    }
}
