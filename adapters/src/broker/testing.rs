//! Scripted broker doubles for time-driven tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{AdapterError, AdapterResult};
use crate::traits::{BrokerClient, BrokerConsumer, BrokerPublisher};
use crate::types::{AssignmentSignal, WatermarkError};

/// What one poll of the scripted consumer does
#[derive(Debug, Clone)]
pub enum Step {
    Empty,
    /// Fire the assignment callback, return nothing
    Assign,
    Messages(Vec<&'static str>),
    Fail(&'static str),
}

#[derive(Debug, Clone)]
enum Watermarks {
    Reply(Result<(i64, i64), WatermarkError>),
    Hang,
}

/// Broker whose single consumer follows a fixed script, one step per poll.
/// Every poll waits its full timeout first, so paused-clock tests advance.
pub struct ScriptedBroker {
    script: Mutex<Option<VecDeque<Step>>>,
    watermarks: Watermarks,
    closed: Arc<AtomicBool>,
    pub produced: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    pub subscriptions: AtomicUsize,
}

impl ScriptedBroker {
    pub fn new(script: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(Some(script.into())),
            watermarks: Watermarks::Reply(Ok((0, 0))),
            closed: Arc::new(AtomicBool::new(false)),
            produced: Arc::new(Mutex::new(Vec::new())),
            subscriptions: AtomicUsize::new(0),
        }
    }

    pub fn with_watermarks(mut self, reply: Result<(i64, i64), WatermarkError>) -> Self {
        self.watermarks = Watermarks::Reply(reply);
        self
    }

    pub fn with_hanging_watermarks(mut self) -> Self {
        self.watermarks = Watermarks::Hang;
        self
    }

    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn produced_count(&self) -> usize {
        self.produced.lock().unwrap().len()
    }
}

#[async_trait]
impl BrokerClient for ScriptedBroker {
    async fn check_connection(&self) -> AdapterResult<()> {
        Ok(())
    }

    async fn publisher(&self) -> AdapterResult<Box<dyn BrokerPublisher>> {
        Ok(Box::new(ScriptedPublisher {
            produced: Arc::clone(&self.produced),
        }))
    }

    async fn subscribe(
        &self,
        _topic: &str,
        signal: AssignmentSignal,
    ) -> AdapterResult<Box<dyn BrokerConsumer>> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        let script = self.script.lock().unwrap().take().unwrap_or_default();
        Ok(Box::new(ScriptedConsumer {
            script,
            signal,
            watermarks: self.watermarks.clone(),
            closed: self.closed.clone(),
        }))
    }
}

struct ScriptedPublisher {
    produced: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

#[async_trait]
impl BrokerPublisher for ScriptedPublisher {
    async fn produce(&self, topic: &str, payload: &[u8]) -> AdapterResult<()> {
        self.produced
            .lock()
            .unwrap()
            .push((topic.to_string(), payload.to_vec()));
        Ok(())
    }
}

struct ScriptedConsumer {
    script: VecDeque<Step>,
    signal: AssignmentSignal,
    watermarks: Watermarks,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl BrokerConsumer for ScriptedConsumer {
    async fn poll_batch(&mut self, timeout: Duration) -> AdapterResult<Vec<Vec<u8>>> {
        tokio::time::sleep(timeout).await;
        match self.script.pop_front().unwrap_or(Step::Empty) {
            Step::Empty => Ok(Vec::new()),
            Step::Assign => {
                self.signal.notify_assigned();
                Ok(Vec::new())
            }
            Step::Messages(messages) => {
                Ok(messages.iter().map(|m| m.as_bytes().to_vec()).collect())
            }
            Step::Fail(message) => Err(AdapterError::Broker {
                message: message.to_string(),
            }),
        }
    }

    async fn fetch_watermarks(
        &mut self,
        _topic: &str,
        _partition: i32,
        _timeout: Duration,
    ) -> Result<(i64, i64), WatermarkError> {
        match &self.watermarks {
            Watermarks::Reply(reply) => reply.clone(),
            Watermarks::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(WatermarkError::TimedOut)
            }
        }
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
