//! Progress reporting for scenario runs
//!
//! The engine drives a [`Reporter`] in a fixed order: `feature`, then per
//! scenario `scenario`, the `simulate`/`validate` phase markers, `run_task`
//! before each executor runs, one assertion callback per outcome (or
//! `task_failed` when the executor errors), and finally `finished` followed
//! by `print_failures`.

use std::io::{self, Write};
use std::sync::Mutex;

use shared::{AssertionCall, RunInfo};

#[mockall::automock]
pub trait Reporter: Send + Sync {
    fn feature(&self, description: &str);
    fn scenario(&self, description: &str);
    fn simulate(&self);
    fn validate(&self);
    fn run_task(&self, representation: &str);
    fn assertion_passed(&self, call: &AssertionCall);
    /// The call's display line carries the failure reason
    fn assertion_failed(&self, call: &AssertionCall);
    fn assertion_skipped(&self, call: &AssertionCall);
    /// An executor errored before producing assertions
    fn task_failed(&self, representation: &str, reason: &str);
    fn finished(&self, info: &RunInfo);
    fn print_failures(&self);
}

/// Route an assertion outcome to the matching reporter callback
pub fn report_call(reporter: &dyn Reporter, call: &AssertionCall) {
    if call.skipped() {
        reporter.assertion_skipped(call);
    } else if call.passed() {
        reporter.assertion_passed(call);
    } else {
        reporter.assertion_failed(call);
    }
}

#[derive(Default)]
struct ConsoleState {
    scenario: String,
    failures: Vec<String>,
}

/// Human-readable report written to a terminal (or any writer)
pub struct ConsoleReporter<W: Write + Send> {
    out: Mutex<W>,
    state: Mutex<ConsoleState>,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            state: Mutex::new(ConsoleState::default()),
        }
    }

    /// Give back the writer, e.g. to inspect captured output
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn line(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writeln!(out, "{text}") {
            tracing::warn!(error = %e, "Failed to write report line");
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut ConsoleState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut state)
    }

    fn record_failure(&self, reason: String) {
        self.with_state(|state| {
            let entry = format!("{}: {reason}", state.scenario);
            state.failures.push(entry);
        });
    }
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn feature(&self, description: &str) {
        self.line(&format!("Feature: {description}"));
    }

    fn scenario(&self, description: &str) {
        self.with_state(|state| state.scenario = description.to_string());
        self.line(&format!("  - Scenario {description}"));
    }

    fn simulate(&self) {
        self.line("    - Simulate");
    }

    fn validate(&self) {
        self.line("    - Validate");
    }

    fn run_task(&self, representation: &str) {
        self.line(&format!("      {representation}"));
    }

    fn assertion_passed(&self, call: &AssertionCall) {
        self.line(&format!("      - {call}"));
    }

    fn assertion_failed(&self, call: &AssertionCall) {
        self.line(&format!("      - {call}"));
        self.record_failure(call.to_string());
    }

    fn assertion_skipped(&self, call: &AssertionCall) {
        self.line(&format!("      - {call}"));
    }

    fn task_failed(&self, representation: &str, reason: &str) {
        self.line(&format!("      - task failed: {reason}"));
        self.record_failure(format!("{representation} failed: {reason}"));
    }

    fn finished(&self, info: &RunInfo) {
        self.line(&format!(
            "completed running {} scenarios in {:.2}s",
            info.total_scenarios,
            info.elapsed.as_secs_f64()
        ));
    }

    fn print_failures(&self) {
        let failures = self.with_state(|state| state.failures.clone());
        if failures.is_empty() {
            return;
        }
        self.line("Failures:");
        for failure in failures {
            self.line(&format!("  - {failure}"));
        }
    }
}

/// One reporter callback, as recorded
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    Feature(String),
    Scenario(String),
    Simulate,
    Validate,
    RunTask(String),
    AssertionPassed(AssertionCall),
    AssertionFailed(AssertionCall),
    AssertionSkipped(AssertionCall),
    TaskFailed { representation: String, reason: String },
    Finished(RunInfo),
    PrintFailures,
}

/// Buffers callbacks so a concurrently run scenario can be reported later, in order
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.lock().clone()
    }

    pub fn into_events(self) -> Vec<ReportEvent> {
        self.events.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Forward every recorded callback to `target`, in recording order
    pub fn replay(&self, target: &dyn Reporter) {
        replay(&self.events(), target);
    }

    fn push(&self, event: ReportEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ReportEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub fn replay(events: &[ReportEvent], target: &dyn Reporter) {
    for event in events {
        match event {
            ReportEvent::Feature(description) => target.feature(description),
            ReportEvent::Scenario(description) => target.scenario(description),
            ReportEvent::Simulate => target.simulate(),
            ReportEvent::Validate => target.validate(),
            ReportEvent::RunTask(representation) => target.run_task(representation),
            ReportEvent::AssertionPassed(call) => target.assertion_passed(call),
            ReportEvent::AssertionFailed(call) => target.assertion_failed(call),
            ReportEvent::AssertionSkipped(call) => target.assertion_skipped(call),
            ReportEvent::TaskFailed {
                representation,
                reason,
            } => target.task_failed(representation, reason),
            ReportEvent::Finished(info) => target.finished(info),
            ReportEvent::PrintFailures => target.print_failures(),
        }
    }
}

impl Reporter for RecordingReporter {
    fn feature(&self, description: &str) {
        self.push(ReportEvent::Feature(description.to_string()));
    }

    fn scenario(&self, description: &str) {
        self.push(ReportEvent::Scenario(description.to_string()));
    }

    fn simulate(&self) {
        self.push(ReportEvent::Simulate);
    }

    fn validate(&self) {
        self.push(ReportEvent::Validate);
    }

    fn run_task(&self, representation: &str) {
        self.push(ReportEvent::RunTask(representation.to_string()));
    }

    fn assertion_passed(&self, call: &AssertionCall) {
        self.push(ReportEvent::AssertionPassed(call.clone()));
    }

    fn assertion_failed(&self, call: &AssertionCall) {
        self.push(ReportEvent::AssertionFailed(call.clone()));
    }

    fn assertion_skipped(&self, call: &AssertionCall) {
        self.push(ReportEvent::AssertionSkipped(call.clone()));
    }

    fn task_failed(&self, representation: &str, reason: &str) {
        self.push(ReportEvent::TaskFailed {
            representation: representation.to_string(),
            reason: reason.to_string(),
        });
    }

    fn finished(&self, info: &RunInfo) {
        self.push(ReportEvent::Finished(info.clone()));
    }

    fn print_failures(&self) {
        self.push(ReportEvent::PrintFailures);
    }
}
