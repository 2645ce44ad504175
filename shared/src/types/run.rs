//! Run selection flags and run summaries

use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

/// Which phases of each scenario a run executes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunFlags {
    pub describe: bool,
    pub simulate: bool,
    pub validate: bool,
}

impl RunFlags {
    pub fn simulate_only() -> Self {
        Self {
            simulate: true,
            ..Self::default()
        }
    }

    pub fn validate_only() -> Self {
        Self {
            validate: true,
            ..Self::default()
        }
    }

    /// Simulate, then validate, every scenario
    pub fn e2e() -> Self {
        Self {
            simulate: true,
            validate: true,
            ..Self::default()
        }
    }

    /// Announce structure without executing anything
    pub fn describe_only() -> Self {
        Self {
            describe: true,
            ..Self::default()
        }
    }

    pub fn has_simulate(&self) -> bool {
        self.simulate
    }

    pub fn has_validate(&self) -> bool {
        self.validate
    }

    pub fn is_describe(&self) -> bool {
        self.describe && !self.simulate && !self.validate
    }
}

/// Summary handed to reporters once a run is over
#[derive(Debug, Clone, PartialEq)]
pub struct RunInfo {
    pub run_id: Uuid,
    pub total_scenarios: usize,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl RunInfo {
    /// Close a run that started at `started_at`
    pub fn finish(run_id: Uuid, started_at: DateTime<Utc>, total_scenarios: usize) -> Self {
        let elapsed = (Utc::now() - started_at).to_std().unwrap_or_default();
        Self {
            run_id,
            total_scenarios,
            started_at,
            elapsed,
        }
    }
}
