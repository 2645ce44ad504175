//! Broker configuration, clients and the consumption protocol

pub mod config;
#[cfg(feature = "kafka")]
pub mod kafka;
pub mod protocol;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;

pub use config::{BrokerConfig, ConfigSource};
#[cfg(feature = "kafka")]
pub use kafka::KafkaBrokerClient;
pub use protocol::{ConsumeOutcome, ConsumeSettings, Consumption, ConsumerState, consume};

use crate::error::{AdapterError, AdapterResult};
use crate::traits::{BrokerClient, BrokerConsumer, BrokerPublisher};
use crate::types::AssignmentSignal;

/// Stand-in used when the crate is built without broker support.
/// Every operation fails with a setup error naming the missing feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableBrokerClient;

impl UnavailableBrokerClient {
    fn error() -> AdapterError {
        AdapterError::BrokerSetup {
            message: "broker support requires the `kafka` feature".to_string(),
        }
    }
}

#[async_trait]
impl BrokerClient for UnavailableBrokerClient {
    async fn check_connection(&self) -> AdapterResult<()> {
        Err(Self::error())
    }

    async fn publisher(&self) -> AdapterResult<Box<dyn BrokerPublisher>> {
        Err(Self::error())
    }

    async fn subscribe(
        &self,
        _topic: &str,
        _signal: AssignmentSignal,
    ) -> AdapterResult<Box<dyn BrokerConsumer>> {
        Err(Self::error())
    }
}
