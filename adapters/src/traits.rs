//! Adapter trait definitions for dependency injection

use async_trait::async_trait;
use std::time::Duration;

use shared::{AssertionCall, TaskSpec};

use crate::error::{AdapterError, AdapterResult};
use crate::types::{AssignmentSignal, HttpRequest, HttpResponse, WatermarkError};

/// Runs one task and yields its assertion outcomes
#[async_trait]
pub trait Executor: Send + Sync {
    /// Whether the task configures anything to check
    fn has_assertions(&self) -> bool;

    /// Adapter-specific body; only performs the action valid for the task's mode
    async fn execute(&self) -> AdapterResult<Vec<AssertionCall>>;

    /// One-line description of what this executor will do
    fn represent(&self) -> String;

    /// Refuses to touch any transport when no assertions are configured
    async fn run(&self) -> AdapterResult<Vec<AssertionCall>> {
        if !self.has_assertions() {
            return Err(AdapterError::ZeroAssertions);
        }
        self.execute().await
    }
}

/// Resolves a task spec to the executor for its adapter
pub trait ExecutorFactory: Send + Sync {
    fn executor_for(&self, spec: &TaskSpec) -> Box<dyn Executor>;
}

/// HTTP transport
#[mockall::automock]
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Send a request; non-2xx statuses are responses, not errors
    async fn send(&self, request: &HttpRequest) -> AdapterResult<HttpResponse>;
}

/// Broker transport: connectivity probe, publishing and subscriptions
#[mockall::automock]
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Publish a marker message to prove the broker is reachable
    async fn check_connection(&self) -> AdapterResult<()>;

    /// Open a producer connection, owned by a single simulate call
    async fn publisher(&self) -> AdapterResult<Box<dyn BrokerPublisher>>;

    /// Open a consumer on `topic`; `signal` is raised when partitions are assigned
    async fn subscribe(
        &self,
        topic: &str,
        signal: AssignmentSignal,
    ) -> AdapterResult<Box<dyn BrokerConsumer>>;
}

/// One open producer connection
#[mockall::automock]
#[async_trait]
pub trait BrokerPublisher: Send + Sync {
    /// Publish one message and wait for its delivery report
    async fn produce(&self, topic: &str, payload: &[u8]) -> AdapterResult<()>;
}

/// One open consumer connection, owned by a single consumption call
#[mockall::automock]
#[async_trait]
pub trait BrokerConsumer: Send {
    /// Wait up to `timeout` for a batch of message payloads
    async fn poll_batch(&mut self, timeout: Duration) -> AdapterResult<Vec<Vec<u8>>>;

    /// Low and high offsets of a partition
    async fn fetch_watermarks(
        &mut self,
        topic: &str,
        partition: i32,
        timeout: Duration,
    ) -> Result<(i64, i64), WatermarkError>;

    /// Leave the group and release the connection
    async fn close(&mut self);
}
