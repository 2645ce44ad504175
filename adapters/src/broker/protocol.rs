//! Bounded-time consumption from a broker topic
//!
//! A consumption call moves through three states:
//!
//! ```text
//! Unassigned --(assignment callback)--> Assigned --(window reset)--> TimeoutActive
//! ```
//!
//! Two timers are tracked independently. While `Unassigned`, the call waits
//! at most `assignment_ceiling` for the cluster to assign partitions. On
//! assignment the elapsed wait is discarded and the caller's own timeout
//! starts from zero, so slow group coordination never eats into the
//! validation budget. The topic's existence is probed once, on the first
//! poll cycle, through its watermark offsets.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::{AdapterError, AdapterResult};
use crate::traits::{BrokerClient, BrokerConsumer};
use crate::types::{AssignmentSignal, WatermarkError};

/// Longest wait for partition assignment
pub const ASSIGNMENT_CEILING: Duration = Duration::from_secs(60);
/// Length of a single poll
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Budget for the topic-existence probe
pub const WATERMARK_TIMEOUT: Duration = Duration::from_millis(1500);

/// Timing knobs of the consumption protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumeSettings {
    pub assignment_ceiling: Duration,
    pub poll_interval: Duration,
    pub watermark_timeout: Duration,
}

impl Default for ConsumeSettings {
    fn default() -> Self {
        Self {
            assignment_ceiling: ASSIGNMENT_CEILING,
            poll_interval: POLL_INTERVAL,
            watermark_timeout: WATERMARK_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    Unassigned,
    Assigned,
    TimeoutActive,
}

/// How a consumption call ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// The validation window elapsed after assignment
    Drained,
    /// The assignment ceiling elapsed before any partition was assigned
    NoPartitionAssignment,
    /// Messages showed up before assignment; they were not accepted
    ProtocolAnomaly { discarded: usize },
    /// Polling failed; messages gathered so far are kept
    Interrupted { reason: String },
}

/// Messages gathered by one call and how the call ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consumption {
    pub messages: Vec<Vec<u8>>,
    pub outcome: ConsumeOutcome,
    pub final_state: ConsumerState,
}

/// Consume `topic` until `timeout` has passed since partition assignment.
///
/// Only a missing topic (or a failed subscription) is an error. Running out
/// of time before assignment is reported through [`ConsumeOutcome`] so the
/// caller's assertions decide pass or fail from the (possibly empty) result.
/// The consumer is closed on every exit path.
pub async fn consume(
    client: &dyn BrokerClient,
    topic: &str,
    timeout: Duration,
    settings: &ConsumeSettings,
) -> AdapterResult<Consumption> {
    let signal = AssignmentSignal::new();
    let mut consumer = client.subscribe(topic, signal.clone()).await?;
    info!(
        topic,
        ceiling_secs = settings.assignment_ceiling.as_secs_f64(),
        "Waiting for partition assignment"
    );

    let started = Instant::now();
    let result = ConsumptionRun::new(topic, timeout, settings, signal)
        .drive(consumer.as_mut())
        .await;
    consumer.close().await;

    debug!(topic, elapsed_secs = started.elapsed().as_secs_f64(), "Consumption cycle finished");
    result
}

struct ConsumptionRun<'a> {
    topic: &'a str,
    timeout: Duration,
    settings: &'a ConsumeSettings,
    signal: AssignmentSignal,
    state: ConsumerState,
    window_started: Instant,
    window: Duration,
    probed: bool,
    messages: Vec<Vec<u8>>,
}

impl<'a> ConsumptionRun<'a> {
    fn new(
        topic: &'a str,
        timeout: Duration,
        settings: &'a ConsumeSettings,
        signal: AssignmentSignal,
    ) -> Self {
        Self {
            topic,
            timeout,
            settings,
            signal,
            state: ConsumerState::Unassigned,
            window_started: Instant::now(),
            window: settings.assignment_ceiling,
            probed: false,
            messages: Vec::new(),
        }
    }

    async fn drive(mut self, consumer: &mut dyn BrokerConsumer) -> AdapterResult<Consumption> {
        let outcome = loop {
            if self.window_started.elapsed() >= self.window {
                break self.window_elapsed();
            }

            let batch = match consumer.poll_batch(self.settings.poll_interval).await {
                Ok(batch) => batch,
                Err(e) => {
                    error!(topic = self.topic, error = %e, "Broker error while consuming");
                    break ConsumeOutcome::Interrupted {
                        reason: e.to_string(),
                    };
                }
            };

            if !self.probed {
                self.probe_topic(consumer).await?;
                self.probed = true;
            }

            if self.state == ConsumerState::Unassigned {
                if !self.signal.is_assigned() {
                    if !batch.is_empty() {
                        error!(
                            topic = self.topic,
                            count = batch.len(),
                            "Messages consumed before partition assignment"
                        );
                        break ConsumeOutcome::ProtocolAnomaly {
                            discarded: batch.len(),
                        };
                    }
                    continue;
                }
                self.state = ConsumerState::Assigned;
            }

            if self.state == ConsumerState::Assigned {
                self.open_validation_window();
            }

            if batch.is_empty() {
                debug!(
                    topic = self.topic,
                    waited_secs = self.window_started.elapsed().as_secs_f64(),
                    max_secs = self.window.as_secs_f64(),
                    "No messages"
                );
            } else {
                debug!(topic = self.topic, count = batch.len(), "Messages consumed");
                self.messages.extend(batch);
            }
        };

        Ok(Consumption {
            messages: self.messages,
            outcome,
            final_state: self.state,
        })
    }

    fn window_elapsed(&self) -> ConsumeOutcome {
        match self.state {
            ConsumerState::Unassigned => {
                error!(
                    topic = self.topic,
                    collected = self.messages.len(),
                    "No partition assignment received in time"
                );
                ConsumeOutcome::NoPartitionAssignment
            }
            ConsumerState::Assigned | ConsumerState::TimeoutActive => ConsumeOutcome::Drained,
        }
    }

    // The assignment wait is discarded; the scenario's timeout starts now,
    // still capped by the ceiling.
    fn open_validation_window(&mut self) {
        self.window_started = Instant::now();
        self.window = self.timeout.min(self.settings.assignment_ceiling);
        self.state = ConsumerState::TimeoutActive;
        info!(
            topic = self.topic,
            timeout_secs = self.window.as_secs_f64(),
            "Partitions assigned, consuming"
        );
    }

    async fn probe_topic(&self, consumer: &mut dyn BrokerConsumer) -> AdapterResult<()> {
        let timeout = self.settings.watermark_timeout;
        let probe = tokio::time::timeout(timeout, consumer.fetch_watermarks(self.topic, 0, timeout))
            .await
            .unwrap_or(Err(WatermarkError::TimedOut));

        match probe {
            Ok((low, high)) => {
                debug!(topic = self.topic, low, high, "Topic watermarks");
                Ok(())
            }
            Err(WatermarkError::LeaderNotAvailable | WatermarkError::UnknownTopic) => {
                Err(AdapterError::TopicNotFound {
                    topic: self.topic.to_string(),
                    timeout,
                    detail: format!(
                        "Topic {} does not exist or leader unavailable for topic-partition 0",
                        self.topic
                    ),
                })
            }
            Err(WatermarkError::TimedOut) => Err(AdapterError::TopicNotFound {
                topic: self.topic.to_string(),
                timeout,
                detail: format!(
                    "Failed to get watermark offsets of topic {} in time. Does the topic exist?",
                    self.topic
                ),
            }),
            Err(WatermarkError::Other(message)) => {
                warn!(topic = self.topic, %message, "Watermark probe inconclusive");
                Ok(())
            }
        }
    }
}
