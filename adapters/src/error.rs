//! Adapter error types

use shared::SharedError;
use std::time::Duration;
use thiserror::Error;

/// Result type for adapter operations
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Adapter error types
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("zero assertions specified for executor")]
    ZeroAssertions,

    #[error("zero events specified for executor")]
    ZeroEvents,

    #[error("HTTP request {method} {url} failed: {message}")]
    Transport {
        method: String,
        url: String,
        message: String,
    },

    #[error("Broker setup failed: {message}")]
    BrokerSetup { message: String },

    #[error("{detail} (watermark probe timeout {}s)", .timeout.as_secs_f64())]
    TopicNotFound {
        topic: String,
        timeout: Duration,
        detail: String,
    },

    #[error("Broker error: {message}")]
    Broker { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] SharedError),
}

impl AdapterError {
    /// Configuration problems are detected before any I/O happens
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AdapterError::ZeroAssertions | AdapterError::ZeroEvents | AdapterError::Config(_)
        )
    }
}
