//! Task specs and factories shared by adapter test suites

use std::sync::Arc;

use adapters::broker::UnavailableBrokerClient;
use adapters::services::ReqwestHttpClient;
use adapters::TransportFactory;
use serde_json::Value;
use shared::{Assertions, ExecutionMode, Payload, RequestBatchTask, RequestTask, TaskSpec};

pub struct TestFixtures;

impl TestFixtures {
    pub const USERS_PATH: &'static str = "/users";
    pub const USER_BODY: &'static str = r#"{"foo":"bar"}"#;

    /// Real HTTP transport; broker tasks are not exercised here
    pub fn http_factory() -> TransportFactory {
        TransportFactory::new(Arc::new(ReqwestHttpClient::new()), Arc::new(UnavailableBrokerClient))
    }

    pub fn post_user(base_url: &str, assertions: Assertions) -> RequestTask {
        RequestTask {
            execution_mode: ExecutionMode::Simulating,
            method: "POST".to_string(),
            url: format!("{base_url}{}", Self::USERS_PATH),
            headers: [("Content-Type".to_string(), "application/json".to_string())]
                .into_iter()
                .collect(),
            body: Some(Payload::from(Self::USER_BODY)),
            assertions,
        }
    }

    pub fn expecting(field: &str, value: impl Into<Value>) -> Assertions {
        Assertions::new().with(field, value)
    }

    pub fn batch(requests: Vec<RequestTask>) -> TaskSpec {
        TaskSpec::RequestBatch(RequestBatchTask {
            execution_mode: ExecutionMode::Simulating,
            requests,
        })
    }
}
