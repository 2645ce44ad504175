//! Command-line interface of the `scenario-runner` binary

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use shared::RunFlags;
use shared::logging::LogConfig;

use crate::config::{DEFAULT_POOL_SIZE, EngineConfig, Scheduling};
use crate::error::EngineResult;

/// Run integration scenarios against HTTP services and message brokers
#[derive(Parser, Debug)]
#[command(name = "scenario-runner", version)]
#[command(about = "Runs simulate/validate integration scenarios from a feature file")]
#[command(group(ArgGroup::new("mode").args(["simulate", "validate", "e2e", "describe"])))]
pub struct Args {
    /// Feature file (JSON) describing the scenarios
    pub feature_file: PathBuf,

    /// Only run the simulate phase of every scenario
    #[arg(long)]
    pub simulate: bool,

    /// Only run the validate phase of every scenario
    #[arg(long)]
    pub validate: bool,

    /// Simulate, then validate (default)
    #[arg(long)]
    pub e2e: bool,

    /// Print the scenarios and tasks without executing anything
    #[arg(long)]
    pub describe: bool,

    /// Run scenario groups concurrently
    #[arg(long)]
    pub concurrent: bool,

    /// Maximum scenario groups in flight with --concurrent
    #[arg(long, default_value_t = DEFAULT_POOL_SIZE)]
    pub pool_size: usize,

    /// Broker properties file (overrides KAFKA_PROPERTIES)
    #[arg(long)]
    pub kafka_properties: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Also log transport library internals
    #[arg(long)]
    pub verbose: bool,
}

impl Args {
    pub fn run_flags(&self) -> RunFlags {
        if self.describe {
            RunFlags::describe_only()
        } else if self.simulate {
            RunFlags::simulate_only()
        } else if self.validate {
            RunFlags::validate_only()
        } else {
            RunFlags::e2e()
        }
    }

    /// `--pool-size` is only validated when `--concurrent` asks for a pool
    pub fn scheduling(&self) -> EngineResult<Scheduling> {
        if self.concurrent {
            Scheduling::pooled(self.pool_size)
        } else {
            Ok(Scheduling::Sequential)
        }
    }

    pub fn engine_config(&self) -> EngineResult<EngineConfig> {
        Ok(EngineConfig::new(self.run_flags()).with_scheduling(self.scheduling()?))
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level.clone(),
            verbose: self.verbose,
        }
    }
}
