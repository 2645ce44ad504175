//! Kafka implementation of the broker traits, backed by librdkafka

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use rdkafka::client::ClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{BaseConsumer, Consumer, ConsumerContext, Rebalance, StreamConsumer};
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::message::Message;
use rdkafka::producer::{FutureProducer, FutureRecord};

use super::config::{BrokerConfig, PROBE_TOPIC};
use crate::error::{AdapterError, AdapterResult};
use crate::traits::{BrokerClient, BrokerConsumer, BrokerPublisher};
use crate::types::{AssignmentSignal, WatermarkError};

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);
const PROBE_DELIVERY_TIMEOUT: Duration = Duration::from_secs(3);
const PROBE_MESSAGE: &[u8] = b"scenario-runner connection check";

fn client_config(properties: &BTreeMap<String, String>) -> ClientConfig {
    let mut config = ClientConfig::new();
    for (key, value) in properties {
        config.set(key, value);
    }
    config
}

fn setup_error(e: KafkaError) -> AdapterError {
    AdapterError::BrokerSetup {
        message: e.to_string(),
    }
}

/// Maps the error code of a failed watermark fetch onto the probe verdict
fn classify(code: Option<RDKafkaErrorCode>, message: String) -> WatermarkError {
    match code {
        Some(RDKafkaErrorCode::LeaderNotAvailable) => WatermarkError::LeaderNotAvailable,
        Some(RDKafkaErrorCode::UnknownTopicOrPartition | RDKafkaErrorCode::UnknownTopic) => {
            WatermarkError::UnknownTopic
        }
        Some(RDKafkaErrorCode::OperationTimedOut | RDKafkaErrorCode::RequestTimedOut) => {
            WatermarkError::TimedOut
        }
        _ => WatermarkError::Other(message),
    }
}

pub struct KafkaBrokerClient {
    config: BrokerConfig,
}

impl KafkaBrokerClient {
    pub fn new(config: BrokerConfig) -> Self {
        Self { config }
    }
}

fn create_producer(properties: &BTreeMap<String, String>) -> AdapterResult<FutureProducer> {
    client_config(properties).create().map_err(setup_error)
}

#[async_trait]
impl BrokerClient for KafkaBrokerClient {
    async fn check_connection(&self) -> AdapterResult<()> {
        create_producer(&self.config.probe_producer_properties())?
            .send(
                FutureRecord::<(), [u8]>::to(PROBE_TOPIC).payload(PROBE_MESSAGE),
                PROBE_DELIVERY_TIMEOUT,
            )
            .await
            .map_err(|(e, _)| AdapterError::BrokerSetup {
                message: format!(
                    "broker at {} is unreachable: {e}",
                    self.config.bootstrap_servers().unwrap_or("<unset>")
                ),
            })?;
        debug!("Broker connection check delivered");
        Ok(())
    }

    async fn publisher(&self) -> AdapterResult<Box<dyn BrokerPublisher>> {
        let producer = create_producer(&self.config.producer_properties())?;
        Ok(Box::new(KafkaPublisher { producer }))
    }

    async fn subscribe(
        &self,
        topic: &str,
        signal: AssignmentSignal,
    ) -> AdapterResult<Box<dyn BrokerConsumer>> {
        let consumer: StreamConsumer<AssignmentContext> =
            client_config(&self.config.consumer_properties())
                .create_with_context(AssignmentContext { signal })
                .map_err(setup_error)?;
        consumer.subscribe(&[topic]).map_err(setup_error)?;
        info!(topic, "Subscribed");
        Ok(Box::new(KafkaConsumer {
            consumer: Arc::new(consumer),
        }))
    }
}

/// Idempotent producer shared by every event of one simulate call
struct KafkaPublisher {
    producer: FutureProducer,
}

#[async_trait]
impl BrokerPublisher for KafkaPublisher {
    async fn produce(&self, topic: &str, payload: &[u8]) -> AdapterResult<()> {
        let (partition, offset) = self
            .producer
            .send(FutureRecord::<(), [u8]>::to(topic).payload(payload), DELIVERY_TIMEOUT)
            .await
            .map_err(|(e, _)| AdapterError::Broker {
                message: format!("delivery to {topic} failed: {e}"),
            })?;
        debug!(topic, partition, offset, "Message delivered");
        Ok(())
    }
}

/// Raises the assignment signal from the rebalance callback
struct AssignmentContext {
    signal: AssignmentSignal,
}

impl ClientContext for AssignmentContext {}

impl ConsumerContext for AssignmentContext {
    fn post_rebalance(&self, _consumer: &BaseConsumer<Self>, rebalance: &Rebalance<'_>) {
        match rebalance {
            Rebalance::Assign(partitions) => {
                info!(count = partitions.count(), "Partitions assigned");
                self.signal.notify_assigned();
            }
            Rebalance::Revoke(_) => debug!("Partitions revoked"),
            Rebalance::Error(e) => warn!(error = %e, "Rebalance failed"),
        }
    }
}

struct KafkaConsumer {
    consumer: Arc<StreamConsumer<AssignmentContext>>,
}

#[async_trait]
impl BrokerConsumer for KafkaConsumer {
    async fn poll_batch(&mut self, timeout: Duration) -> AdapterResult<Vec<Vec<u8>>> {
        let deadline = Instant::now() + timeout;
        let mut batch = Vec::new();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, self.consumer.recv()).await {
                Err(_) => return Ok(batch),
                Ok(Ok(message)) => batch.push(message.payload().unwrap_or_default().to_vec()),
                Ok(Err(e)) => {
                    return Err(AdapterError::Broker {
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    async fn fetch_watermarks(
        &mut self,
        topic: &str,
        partition: i32,
        timeout: Duration,
    ) -> Result<(i64, i64), WatermarkError> {
        let consumer = Arc::clone(&self.consumer);
        let topic = topic.to_string();
        let fetched = tokio::task::spawn_blocking(move || {
            consumer.fetch_watermarks(&topic, partition, timeout)
        })
        .await
        .map_err(|e| WatermarkError::Other(e.to_string()))?;

        fetched.map_err(|e| classify(e.rdkafka_error_code(), e.to_string()))
    }

    async fn close(&mut self) {
        self.consumer.unsubscribe();
        debug!("Consumer closed");
    }
}
