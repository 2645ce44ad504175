//! Engine configuration

use shared::RunFlags;

use crate::error::{EngineError, EngineResult};

/// Scenario groups run at once in pooled mode unless configured otherwise
pub const DEFAULT_POOL_SIZE: usize = 5;

/// How scenario groups are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheduling {
    /// One group after another, reporting live
    #[default]
    Sequential,
    /// Up to `pool_size` groups at once; reports are replayed in feature order
    Pooled { pool_size: usize },
}

impl Scheduling {
    pub fn pooled(pool_size: usize) -> EngineResult<Self> {
        if pool_size == 0 {
            return Err(EngineError::Configuration {
                field: "pool_size".to_string(),
                value: pool_size.to_string(),
            });
        }
        Ok(Scheduling::Pooled { pool_size })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub flags: RunFlags,
    pub scheduling: Scheduling,
}

impl EngineConfig {
    pub fn new(flags: RunFlags) -> Self {
        Self {
            flags,
            scheduling: Scheduling::Sequential,
        }
    }

    pub fn with_scheduling(mut self, scheduling: Scheduling) -> Self {
        self.scheduling = scheduling;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(RunFlags::e2e())
    }
}
