//! Loading features from JSON scenario files

use serde::Deserialize;
use std::path::Path;

use crate::errors::{SharedError, SharedResult};
use crate::types::{Feature, ScenarioGroup, TaskSpec};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FeatureFile {
    feature: String,
    #[serde(default)]
    scenarios: Vec<ScenarioFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    description: String,
    #[serde(default)]
    simulate: Vec<TaskSpec>,
    #[serde(default)]
    validate: Vec<TaskSpec>,
}

impl From<ScenarioFile> for ScenarioGroup {
    fn from(file: ScenarioFile) -> Self {
        let group = ScenarioGroup::new(file.description);
        let group = file.simulate.into_iter().fold(group, ScenarioGroup::simulate);
        file.validate.into_iter().fold(group, ScenarioGroup::validate)
    }
}

impl Feature {
    /// Parse a feature from the JSON scenario format.
    ///
    /// Execution modes come from placement: tasks listed under `simulate`
    /// simulate, tasks under `validate` validate.
    pub fn from_json_str(source: &str) -> SharedResult<Self> {
        let file: FeatureFile =
            serde_json::from_str(source).map_err(|e| SharedError::InvalidScenario {
                message: e.to_string(),
            })?;

        Ok(Feature::new(
            file.feature,
            file.scenarios.into_iter().map(ScenarioGroup::from).collect(),
        ))
    }

    /// Read and parse a scenario file
    pub fn load(path: impl AsRef<Path>) -> SharedResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| SharedError::ScenarioRead {
            path: path.display().to_string(),
            source,
        })?;
        let feature = Self::from_json_str(&source)?;
        tracing::debug!(
            path = %path.display(),
            scenarios = feature.total_scenarios(),
            "loaded feature"
        );
        Ok(feature)
    }
}
