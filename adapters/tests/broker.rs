//! Broker executor wiring through the factory

use adapters::{AdapterError, ExecutorFactory};
use assert_matches::assert_matches;
use shared::{BrokerTask, ExecutionMode, TaskSpec};

mod common;
use common::TestFixtures;

fn broker_task(mode: ExecutionMode) -> TaskSpec {
    TaskSpec::Broker(BrokerTask {
        execution_mode: mode,
        topic: "users".to_string(),
        events: vec![TestFixtures::USER_BODY.into()],
        assertions: TestFixtures::expecting("events_produced", 1),
    })
}

#[tokio::test]
async fn test_without_broker_support_tasks_fail_with_setup_error() {
    let executor =
        TestFixtures::http_factory().executor_for(&broker_task(ExecutionMode::Simulating));

    let result = executor.run().await;

    assert_matches!(result, Err(AdapterError::BrokerSetup { .. }));
}

#[tokio::test]
async fn test_represent_names_mode_and_topic() {
    let factory = TestFixtures::http_factory();

    assert_eq!(
        factory.executor_for(&broker_task(ExecutionMode::Simulating)).represent(),
        "BrokerKafka simulating to users"
    );
    assert_eq!(
        factory.executor_for(&broker_task(ExecutionMode::Validating)).represent(),
        "BrokerKafka validating to users"
    );
}
