//! Engine-specific error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {field} = {value}")]
    Configuration { field: String, value: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
