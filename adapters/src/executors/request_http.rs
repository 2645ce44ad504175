//! Single HTTP request executor

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use shared::{Assertion, AssertionCall, RequestTask};

use crate::error::AdapterResult;
use crate::traits::{Executor, HttpClient};
use crate::types::{HttpRequest, HttpResponse};

pub const USER_AGENT: &str = concat!("scenario-runner/", env!("CARGO_PKG_VERSION"));

pub struct RequestHttp {
    task: RequestTask,
    client: Arc<dyn HttpClient>,
}

impl RequestHttp {
    pub fn new(task: RequestTask, client: Arc<dyn HttpClient>) -> Self {
        Self { task, client }
    }

    fn request(&self) -> HttpRequest {
        let mut headers = self.task.headers.clone();
        headers
            .entry("User-Agent".to_string())
            .or_insert_with(|| USER_AGENT.to_string());
        HttpRequest {
            method: self.task.method.to_uppercase(),
            url: self.task.url.clone(),
            headers,
            body: self.task.body.as_ref().map(|body| body.as_bytes().to_vec()),
        }
    }

    /// Body as text; decoded as JSON when the expectation is structured
    fn body_value(expected: Option<&Value>, response: &HttpResponse) -> Value {
        let text = response.body_text();
        match expected {
            Some(Value::String(_)) | None => Value::String(text),
            Some(_) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        }
    }
}

#[async_trait]
impl Executor for RequestHttp {
    fn has_assertions(&self) -> bool {
        !self.task.assertions.is_empty()
    }

    // Runs in both modes: simulate triggers the side effect, validate reads it back.
    async fn execute(&self) -> AdapterResult<Vec<AssertionCall>> {
        let response = self.client.send(&self.request()).await?;
        debug!(
            method = %self.task.method,
            url = %self.task.url,
            status = response.status,
            bytes = response.body.len(),
            "Response received"
        );

        let assertions = &self.task.assertions;
        let status = Assertion::equal("status_code", assertions, "http response status code")
            .evaluate(response.status);
        let body = Assertion::equal("body", assertions, "http response body")
            .evaluate(Self::body_value(assertions.get("body"), &response));

        Ok(vec![status, body])
    }

    fn represent(&self) -> String {
        format!(
            "RequestHttp {} {} to {}",
            self.task.execution_mode.represent(),
            self.task.method.to_uppercase(),
            self.task.url
        )
    }
}
