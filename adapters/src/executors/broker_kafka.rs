//! Broker executor: publish events when simulating, consume and compare when validating

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use shared::{Assertion, AssertionCall, BrokerTask, ExecutionMode};

use crate::broker::{ConsumeOutcome, ConsumeSettings, consume};
use crate::error::{AdapterError, AdapterResult};
use crate::traits::{BrokerClient, Executor};

pub struct BrokerKafka {
    task: BrokerTask,
    client: Arc<dyn BrokerClient>,
    settings: ConsumeSettings,
}

impl BrokerKafka {
    pub fn new(task: BrokerTask, client: Arc<dyn BrokerClient>, settings: ConsumeSettings) -> Self {
        Self {
            task,
            client,
            settings,
        }
    }

    async fn simulate(&self) -> AdapterResult<Vec<AssertionCall>> {
        if self.task.events.is_empty() {
            return Err(AdapterError::ZeroEvents);
        }
        self.client.check_connection().await?;

        let publisher = self.client.publisher().await?;
        let mut produced = 0u64;
        for event in &self.task.events {
            match publisher.produce(&self.task.topic, event.as_bytes()).await {
                Ok(()) => produced += 1,
                Err(e) => warn!(topic = %self.task.topic, error = %e, "Event not delivered"),
            }
        }
        info!(topic = %self.task.topic, produced, "Events produced");

        Ok(vec![
            Assertion::equal("events_produced", &self.task.assertions, "number of events produced")
                .evaluate(produced),
        ])
    }

    async fn validate(&self) -> AdapterResult<Vec<AssertionCall>> {
        self.client.check_connection().await?;

        let timeout = self.task.assertions.timeout_after();
        let consumption =
            consume(self.client.as_ref(), &self.task.topic, timeout, &self.settings).await?;
        if consumption.outcome != ConsumeOutcome::Drained {
            warn!(
                topic = %self.task.topic,
                outcome = ?consumption.outcome,
                "Consumption ended early"
            );
        }

        let received: Vec<Value> = consumption
            .messages
            .iter()
            .map(|payload| Value::String(String::from_utf8_lossy(payload).into_owned()))
            .collect();

        let assertions = &self.task.assertions;
        Ok(vec![
            Assertion::equal("total_events", assertions, "number of events received")
                .evaluate(received.len()),
            Assertion::unordered("unordered", assertions, "events received in any order")
                .evaluate(Value::Array(received)),
        ])
    }
}

#[async_trait]
impl Executor for BrokerKafka {
    fn has_assertions(&self) -> bool {
        !self.task.assertions.is_empty()
    }

    async fn execute(&self) -> AdapterResult<Vec<AssertionCall>> {
        match self.task.execution_mode {
            ExecutionMode::Simulating => self.simulate().await,
            ExecutionMode::Validating => self.validate().await,
        }
    }

    fn represent(&self) -> String {
        format!(
            "BrokerKafka {} to {}",
            self.task.execution_mode.represent(),
            self.task.topic
        )
    }
}
