//! Ordered sequence of HTTP requests run as one task

use async_trait::async_trait;
use std::sync::Arc;

use shared::{AssertionCall, RequestBatchTask};

use super::RequestHttp;
use crate::error::{AdapterError, AdapterResult};
use crate::traits::{Executor, HttpClient};

pub struct RequestHttpEvents {
    task: RequestBatchTask,
    client: Arc<dyn HttpClient>,
}

impl RequestHttpEvents {
    pub fn new(task: RequestBatchTask, client: Arc<dyn HttpClient>) -> Self {
        Self { task, client }
    }
}

#[async_trait]
impl Executor for RequestHttpEvents {
    // Each inner request checks its own assertions when it runs
    fn has_assertions(&self) -> bool {
        true
    }

    async fn execute(&self) -> AdapterResult<Vec<AssertionCall>> {
        let mut calls = Vec::new();
        for request in &self.task.requests {
            let executor = RequestHttp::new(request.clone(), Arc::clone(&self.client));
            calls.extend(executor.run().await?);
        }
        Ok(calls)
    }

    fn represent(&self) -> String {
        format!(
            "RequestHttpEvents {} {} events",
            self.task.execution_mode.represent(),
            self.task.requests.len()
        )
    }

    async fn run(&self) -> AdapterResult<Vec<AssertionCall>> {
        if self.task.requests.is_empty() {
            return Err(AdapterError::ZeroEvents);
        }
        self.execute().await
    }
}
