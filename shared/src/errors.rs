//! Shared error types for the scenario runner

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Failed to read scenario file {path}: {source}")]
    ScenarioRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid scenario file: {message}")]
    InvalidScenario { message: String },

    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },

    #[error("Logging initialisation failed: {message}")]
    LoggingInit { message: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
