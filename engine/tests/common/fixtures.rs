//! Features and task specs used across engine tests

use serde_json::json;
use shared::{Assertions, Feature, NoOpTask, ScenarioGroup, TaskSpec};

pub struct TestFixtures;

impl TestFixtures {
    /// Task that passes: reports exactly what it expects
    pub fn passing(label: &str) -> TaskSpec {
        Self::task(label, Assertions::new().with("value", 1), 1)
    }

    /// Task whose only assertion evaluates false
    pub fn failing_assertion(label: &str) -> TaskSpec {
        Self::task(label, Assertions::new().with("value", 1), 2)
    }

    /// Task with nothing configured; its executor refuses to run
    pub fn unconfigured(label: &str) -> TaskSpec {
        Self::task(label, Assertions::new(), 1)
    }

    fn task(label: &str, assertions: Assertions, reported_value: i64) -> TaskSpec {
        TaskSpec::NoOp(NoOpTask {
            assertions,
            reported: [
                ("label".to_string(), json!(label)),
                ("value".to_string(), json!(reported_value)),
            ]
            .into_iter()
            .collect(),
            ..NoOpTask::default()
        })
    }

    pub fn group(
        description: &str,
        simulate: Vec<TaskSpec>,
        validate: Vec<TaskSpec>,
    ) -> ScenarioGroup {
        let group = ScenarioGroup::new(description);
        let group = simulate.into_iter().fold(group, ScenarioGroup::simulate);
        validate.into_iter().fold(group, ScenarioGroup::validate)
    }

    /// Groups `s0..sN` with one passing simulate and validate task each
    pub fn passing_feature(groups: usize) -> Feature {
        let scenarios = (0..groups)
            .map(|i| {
                Self::group(
                    &format!("s{i}"),
                    vec![Self::passing(&format!("s{i}-sim"))],
                    vec![Self::passing(&format!("s{i}-val"))],
                )
            })
            .collect();
        Feature::new("passing feature", scenarios)
    }

    pub fn empty_feature() -> Feature {
        Feature::new("nothing here", vec![])
    }
}
