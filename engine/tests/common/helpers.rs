//! Scripted executors that record what ran and when

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use adapters::executors::NoOp;
use adapters::{AdapterError, AdapterResult, Executor, ExecutorFactory};
use engine::{Engine, EngineConfig, ReportEvent};
use shared::{AssertionCall, NoOpTask, RunFlags, TaskSpec};

/// Factory whose executors log their label, track concurrency, then behave like `NoOp`
#[derive(Clone, Default)]
pub struct ScriptedFactory {
    pub log: Arc<Mutex<Vec<String>>>,
    pub in_flight: Arc<AtomicUsize>,
    pub max_in_flight: Arc<AtomicUsize>,
    delay: Duration,
    errors: Arc<HashSet<String>>,
    panics: Arc<HashSet<String>>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Executors for these labels fail with a broker error
    pub fn erroring(mut self, labels: &[&str]) -> Self {
        self.errors = Arc::new(labels.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn panicking(mut self, labels: &[&str]) -> Self {
        self.panics = Arc::new(labels.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl ExecutorFactory for ScriptedFactory {
    fn executor_for(&self, spec: &TaskSpec) -> Box<dyn Executor> {
        let TaskSpec::NoOp(task) = spec else {
            panic!("engine tests only use noop tasks");
        };
        Box::new(ScriptedExecutor {
            label: task.reported["label"].as_str().unwrap_or_default().to_string(),
            task: task.clone(),
            factory: self.clone(),
        })
    }
}

struct ScriptedExecutor {
    label: String,
    task: NoOpTask,
    factory: ScriptedFactory,
}

#[async_trait]
impl Executor for ScriptedExecutor {
    fn has_assertions(&self) -> bool {
        !self.task.assertions.is_empty()
    }

    async fn execute(&self) -> AdapterResult<Vec<AssertionCall>> {
        self.factory.log.lock().unwrap().push(self.label.clone());

        let now = self.factory.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.factory.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.factory.delay).await;
        self.factory.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.factory.panics.contains(&self.label) {
            panic!("scripted panic in {}", self.label);
        }
        if self.factory.errors.contains(&self.label) {
            return Err(AdapterError::Broker {
                message: format!("scripted failure in {}", self.label),
            });
        }
        NoOp::new(self.task.clone()).execute().await
    }

    fn represent(&self) -> String {
        format!("Scripted {}", self.label)
    }
}

pub struct TestHelpers;

impl TestHelpers {
    pub fn engine(factory: &ScriptedFactory, config: EngineConfig) -> Engine {
        Engine::new(Arc::new(factory.clone()), config)
    }

    pub fn e2e() -> EngineConfig {
        EngineConfig::new(RunFlags::e2e())
    }

    /// Recorded events minus the run summary, which differs between runs
    pub fn without_summary(events: Vec<ReportEvent>) -> Vec<ReportEvent> {
        events
            .into_iter()
            .filter(|event| !matches!(event, ReportEvent::Finished(_)))
            .collect()
    }
}
