//! Tracing setup for the scenario runner
//!
//! Library crates only emit events through `tracing` macros. The binary calls
//! [`init_tracing`] once at start-up; nothing is initialised implicitly.

use chrono::{DateTime, Utc};
use tracing_subscriber::{EnvFilter, fmt};

use crate::errors::{SharedError, SharedResult};

/// Logging options resolved from the command line
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base level for the runner's own crates (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: String,
    /// Also show debug output from transport libraries
    pub verbose: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            verbose: false,
        }
    }
}

impl LogConfig {
    /// Filter directives: runner crates at `level`, transports quieter unless verbose
    pub fn filter_directives(&self) -> String {
        let level = self.level.as_str();
        let transport_level = if self.verbose { "debug" } else { "warn" };
        format!(
            "engine={level},adapters={level},shared={level},scenario_runner={level},\
             reqwest={transport_level},hyper={transport_level},rdkafka={transport_level}"
        )
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_tracing(config: &LogConfig) -> SharedResult<()> {
    let filter =
        EnvFilter::try_new(config.filter_directives()).map_err(|e| SharedError::InvalidConfig {
            field: "log_level".to_string(),
            value: format!("{} ({e})", config.level),
        })?;

    fmt()
        .with_env_filter(filter)
        .with_target(config.verbose)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|e| SharedError::LoggingInit {
            message: e.to_string(),
        })
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%H:%M:%S%.3f").to_string()
}
