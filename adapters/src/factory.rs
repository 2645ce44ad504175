//! Resolves task specs to executors

use std::sync::Arc;

use shared::TaskSpec;

use crate::broker::{BrokerConfig, ConsumeSettings};
use crate::executors::{BrokerKafka, NoOp, RequestHttp, RequestHttpEvents};
use crate::services::ReqwestHttpClient;
use crate::traits::{BrokerClient, Executor, ExecutorFactory, HttpClient};

/// Factory wiring every executor to shared transport clients
#[derive(Clone)]
pub struct TransportFactory {
    http: Arc<dyn HttpClient>,
    broker: Arc<dyn BrokerClient>,
    settings: ConsumeSettings,
}

impl TransportFactory {
    pub fn new(http: Arc<dyn HttpClient>, broker: Arc<dyn BrokerClient>) -> Self {
        Self {
            http,
            broker,
            settings: ConsumeSettings::default(),
        }
    }

    /// Real transports: reqwest for HTTP, the configured broker client
    pub fn from_broker_config(config: BrokerConfig) -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new()), broker_client(config))
    }

    pub fn with_consume_settings(mut self, settings: ConsumeSettings) -> Self {
        self.settings = settings;
        self
    }
}

impl ExecutorFactory for TransportFactory {
    fn executor_for(&self, spec: &TaskSpec) -> Box<dyn Executor> {
        match spec {
            TaskSpec::Request(task) => {
                Box::new(RequestHttp::new(task.clone(), Arc::clone(&self.http)))
            }
            TaskSpec::RequestBatch(task) => {
                Box::new(RequestHttpEvents::new(task.clone(), Arc::clone(&self.http)))
            }
            TaskSpec::Broker(task) => Box::new(BrokerKafka::new(
                task.clone(),
                Arc::clone(&self.broker),
                self.settings,
            )),
            TaskSpec::NoOp(task) => Box::new(NoOp::new(task.clone())),
        }
    }
}

#[cfg(feature = "kafka")]
fn broker_client(config: BrokerConfig) -> Arc<dyn BrokerClient> {
    Arc::new(crate::broker::KafkaBrokerClient::new(config))
}

#[cfg(not(feature = "kafka"))]
fn broker_client(config: BrokerConfig) -> Arc<dyn BrokerClient> {
    tracing::debug!(
        bootstrap_servers = config.bootstrap_servers().unwrap_or("<unset>"),
        "Built without the `kafka` feature; broker tasks will fail"
    );
    Arc::new(crate::broker::UnavailableBrokerClient)
}
