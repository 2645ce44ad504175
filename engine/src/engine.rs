//! Scenario execution engine
//!
//! Every scenario group runs its simulate tasks before its validate tasks,
//! each phase into its own [`ResultSet`]. A failing phase never aborts the
//! run; it only fails the aggregate verdict.

use chrono::Utc;
use futures_util::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};
use uuid::Uuid;

use adapters::ExecutorFactory;
use shared::{ExecutionMode, Feature, RunFlags, RunInfo, ScenarioGroup, TaskSpec};

use crate::config::{EngineConfig, Scheduling};
use crate::reporter::{RecordingReporter, ReportEvent, Reporter, replay, report_call};
use crate::result_set::ResultSet;

/// Verdict of one phase of one scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseVerdict {
    pub scenario: String,
    pub mode: ExecutionMode,
    pub passed: bool,
    pub assertions: usize,
}

/// Outcome of a whole run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub info: RunInfo,
    pub phase_verdicts: Vec<PhaseVerdict>,
    pub passed: bool,
}

pub struct Engine {
    factory: Arc<dyn ExecutorFactory>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(factory: Arc<dyn ExecutorFactory>, config: EngineConfig) -> Self {
        Self { factory, config }
    }

    /// Run the feature; true iff every phase result set passed
    pub async fn run(&self, feature: &Feature, reporter: &dyn Reporter) -> bool {
        self.execute(feature, reporter).await.passed
    }

    pub async fn execute(&self, feature: &Feature, reporter: &dyn Reporter) -> RunReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(
            %run_id,
            feature = %feature.description,
            scenarios = feature.total_scenarios(),
            scheduling = ?self.config.scheduling,
            "Starting run"
        );

        reporter.feature(&feature.description);
        let phase_verdicts = match self.config.scheduling {
            Scheduling::Sequential => self.run_sequential(feature, reporter).await,
            Scheduling::Pooled { pool_size } => {
                self.run_pooled(feature, reporter, pool_size).await
            }
        };

        let info = RunInfo::finish(run_id, started_at, feature.total_scenarios());
        reporter.finished(&info);
        reporter.print_failures();

        // Zero phases (e.g. an empty feature) is a failed run, not a vacuous pass
        let passed =
            !phase_verdicts.is_empty() && phase_verdicts.iter().all(|verdict| verdict.passed);
        info!(
            %run_id,
            passed,
            phases = phase_verdicts.len(),
            elapsed_secs = info.elapsed.as_secs_f64(),
            "Run finished"
        );

        RunReport {
            info,
            phase_verdicts,
            passed,
        }
    }

    /// Announce the feature and its scenarios without executing anything
    pub fn describe(&self, feature: &Feature, reporter: &dyn Reporter) -> RunInfo {
        let started_at = Utc::now();
        reporter.feature(&feature.description);
        for group in &feature.scenarios {
            reporter.scenario(&group.description);
            describe_phase(group, ExecutionMode::Simulating, reporter, self.factory.as_ref());
            describe_phase(group, ExecutionMode::Validating, reporter, self.factory.as_ref());
        }
        let info = RunInfo::finish(Uuid::new_v4(), started_at, feature.total_scenarios());
        reporter.finished(&info);
        info
    }

    async fn run_sequential(
        &self,
        feature: &Feature,
        reporter: &dyn Reporter,
    ) -> Vec<PhaseVerdict> {
        let mut verdicts = Vec::new();
        for group in &feature.scenarios {
            let flags = self.config.flags;
            verdicts.extend(run_group(self.factory.as_ref(), flags, group, reporter).await);
        }
        verdicts
    }

    async fn run_pooled(
        &self,
        feature: &Feature,
        reporter: &dyn Reporter,
        pool_size: usize,
    ) -> Vec<PhaseVerdict> {
        let permits = Arc::new(Semaphore::new(pool_size.max(1)));

        let handles: Vec<_> = feature
            .scenarios
            .iter()
            .cloned()
            .map(|group| {
                let factory = Arc::clone(&self.factory);
                let permits = Arc::clone(&permits);
                let flags = self.config.flags;
                tokio::spawn(async move {
                    // The semaphore is never closed, so acquiring cannot fail
                    let _permit = permits.acquire_owned().await.ok();
                    let recorder = RecordingReporter::new();
                    let verdicts = run_group(factory.as_ref(), flags, &group, &recorder).await;
                    (recorder.into_events(), verdicts)
                })
            })
            .collect();

        // Join barrier: nothing is reported or aggregated until every group is done
        let results = join_all(handles).await;

        let mut verdicts = Vec::new();
        for (group, result) in feature.scenarios.iter().zip(results) {
            match result {
                Ok((events, group_verdicts)) => {
                    replay(&events, reporter);
                    verdicts.extend(group_verdicts);
                }
                Err(e) => {
                    error!(
                        scenario = %group.description,
                        error = %e,
                        "Scenario task did not complete"
                    );
                    replay(&panicked_group_events(group, &e.to_string()), reporter);
                    verdicts.push(PhaseVerdict {
                        scenario: group.description.clone(),
                        mode: ExecutionMode::Simulating,
                        passed: false,
                        assertions: 0,
                    });
                }
            }
        }
        verdicts
    }
}

fn panicked_group_events(group: &ScenarioGroup, reason: &str) -> Vec<ReportEvent> {
    vec![
        ReportEvent::Scenario(group.description.clone()),
        ReportEvent::TaskFailed {
            representation: format!("Scenario {}", group.description),
            reason: reason.to_string(),
        },
    ]
}

fn describe_phase(
    group: &ScenarioGroup,
    mode: ExecutionMode,
    reporter: &dyn Reporter,
    factory: &dyn ExecutorFactory,
) {
    let tasks = phase_tasks(group, mode);
    if tasks.is_empty() {
        return;
    }
    announce_phase(mode, reporter);
    for spec in tasks {
        reporter.run_task(&factory.executor_for(spec).represent());
    }
}

fn phase_tasks(group: &ScenarioGroup, mode: ExecutionMode) -> &[TaskSpec] {
    match mode {
        ExecutionMode::Simulating => &group.simulate_tasks,
        ExecutionMode::Validating => &group.validate_tasks,
    }
}

fn announce_phase(mode: ExecutionMode, reporter: &dyn Reporter) {
    match mode {
        ExecutionMode::Simulating => reporter.simulate(),
        ExecutionMode::Validating => reporter.validate(),
    }
}

/// Simulate then validate one group, strictly in order
async fn run_group(
    factory: &dyn ExecutorFactory,
    flags: RunFlags,
    group: &ScenarioGroup,
    reporter: &dyn Reporter,
) -> Vec<PhaseVerdict> {
    reporter.scenario(&group.description);

    let mut verdicts = Vec::new();
    for (enabled, mode) in [
        (flags.has_simulate(), ExecutionMode::Simulating),
        (flags.has_validate(), ExecutionMode::Validating),
    ] {
        if !enabled {
            continue;
        }
        announce_phase(mode, reporter);
        let results = run_phase(factory, phase_tasks(group, mode), reporter).await;
        debug!(
            scenario = %group.description,
            mode = %mode,
            passed = results.passed(),
            skipped = results.skipped(),
            failed = results.failed(),
            "Phase finished"
        );
        verdicts.push(PhaseVerdict {
            scenario: group.description.clone(),
            mode,
            passed: results.all(),
            assertions: results.len(),
        });
    }
    verdicts
}

/// Run tasks in order into a fresh result set; the first executor error ends the phase
async fn run_phase(
    factory: &dyn ExecutorFactory,
    tasks: &[TaskSpec],
    reporter: &dyn Reporter,
) -> ResultSet {
    let mut results = ResultSet::new();
    for spec in tasks {
        let executor = factory.executor_for(spec);
        let representation = executor.represent();
        reporter.run_task(&representation);

        match executor.run().await {
            Ok(calls) => {
                for call in &calls {
                    report_call(reporter, call);
                    results.add_call(call);
                }
            }
            Err(e) => {
                error!(
                    task = %representation,
                    configuration = e.is_configuration(),
                    error = %e,
                    "Task failed"
                );
                reporter.task_failed(&representation, &e.to_string());
                results.add_task_failure();
                break;
            }
        }
    }
    results
}
