//! Test execution runner
//!
//! Executes units one at a time, isolating each body in its own task.

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::body::{join_error_message, run_body};
use super::{Registry, UnitFailure};
use crate::models::{TestResult, TestUnit};
use crate::report::{ReportAggregator, RunSummary};
use crate::utils::Timer;

/// Runner for test units
#[derive(Clone, Debug)]
pub struct ExecutionRunner {
    registry: Arc<Registry>,
    default_timeout: Option<Duration>,
}

impl ExecutionRunner {
    /// Create a new runner resolving builtins against `registry`
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(registry),
            default_timeout: None,
        }
    }

    /// Timeout applied to units that do not set their own
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    fn timeout_for(&self, unit: &TestUnit) -> Option<Duration> {
        unit.timeout_ms
            .map(Duration::from_millis)
            .or(self.default_timeout)
    }

    /// Execute a single unit
    ///
    /// Always returns exactly one result; faults, panics and timeouts inside
    /// the body are folded into the outcome.
    pub async fn execute(&self, unit: &TestUnit) -> TestResult {
        let timer = Timer::start(unit.qualified_name.as_str());
        let mut handle = tokio::spawn(run_body(unit.body.clone(), self.registry.clone()));

        let joined = match self.timeout_for(unit) {
            Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    handle.abort();
                    warn!("{} timed out after {}ms", unit.qualified_name, limit.as_millis());
                    return TestResult::error(
                        unit.clone(),
                        timer.stop(),
                        format!("timed out after {}ms", limit.as_millis()),
                    );
                }
            },
            None => handle.await,
        };

        let duration_ms = timer.stop();
        match joined {
            Ok(Ok(())) => TestResult::pass(unit.clone(), duration_ms),
            Ok(Err(UnitFailure::Assertion(message))) => {
                TestResult::fail(unit.clone(), duration_ms, message)
            }
            Ok(Err(UnitFailure::Fault(message))) => {
                TestResult::error(unit.clone(), duration_ms, message)
            }
            Err(e) => {
                error!("{} aborted: {}", unit.qualified_name, e);
                TestResult::error(unit.clone(), duration_ms, join_error_message(e))
            }
        }
    }

    /// Run units sequentially as one round
    pub async fn run_round(&self, units: &[TestUnit], round: u32) -> RunSummary {
        info!("Running {} units (round {})", units.len(), round);

        let mut aggregator = ReportAggregator::new(round);
        for unit in units {
            let result = self.execute(unit).await;
            info!("  {}", result);
            aggregator.record(result);
        }

        let summary = aggregator.finish();
        info!(
            "Round {} completed in {}ms - Pass: {}/{} ({:.1}%)",
            round,
            summary.elapsed_ms,
            summary.passed,
            summary.total,
            summary.pass_rate()
        );
        summary
    }

    /// Run all units `rounds` times
    pub async fn run_rounds(&self, units: &[TestUnit], rounds: u32) -> Vec<RunSummary> {
        let mut summaries = Vec::new();
        for round in 1..=rounds {
            info!("=== Round {}/{} ===", round, rounds);
            summaries.push(self.run_round(units, round).await);
        }
        summaries
    }
}

impl Default for ExecutionRunner {
    fn default() -> Self {
        Self::new(Registry::with_builtins())
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::models::{Outcome, SizeCategory, Step};

    fn sample() -> TestUnit {
        TestUnit::new(
            "org.chromium.chrome.browser.test_health.healthy_tests.SampleTest",
            "testTrueIsTrue",
        )
        .with_size(SizeCategory::Small)
        .with_runner("BaseJUnit4ClassRunner")
        .with_step(Step::AssertTrue(true))
    }

    #[tokio::test]
    async fn test_true_is_true_passes() {
        let runner = ExecutionRunner::default();
        for _ in 0..3 {
            let result = runner.execute(&sample()).await;
            assert_eq!(result.outcome, Outcome::Pass);
            assert!(result.failure_message.is_none());
            assert_eq!(result.unit, sample());
        }
    }

    #[tokio::test]
    async fn test_single_sample_summary() {
        let summary = ExecutionRunner::default().run_round(&[sample()], 1).await;
        assert_eq!((summary.passed, summary.failed, summary.errored), (1, 0, 0));
        assert_eq!(summary.results.len(), 1);
    }

    #[tokio::test]
    async fn test_fail_and_error_outcomes() {
        let runner = ExecutionRunner::default();

        let failing = TestUnit::new("a.B", "testFail").with_step(Step::Fail("nope".to_string()));
        let result = runner.execute(&failing).await;
        assert_eq!(result.outcome, Outcome::Fail);
        assert_eq!(result.failure_message.as_deref(), Some("nope"));

        let faulty = TestUnit::new("a.B", "testFault").with_step(Step::Raise("NPE".to_string()));
        let result = runner.execute(&faulty).await;
        assert_eq!(result.outcome, Outcome::Error);
        assert_eq!(result.failure_message.as_deref(), Some("NPE"));
    }

    #[tokio::test]
    async fn test_panic_does_not_abort_run() {
        fn explode() -> Result<(), UnitFailure> {
            panic!("boom")
        }
        let mut registry = Registry::with_builtins();
        registry.register("explode", explode);
        let runner = ExecutionRunner::new(registry);

        let units = vec![
            TestUnit::new("a.B", "testA").with_step(Step::Builtin("explode".to_string())),
            TestUnit::new("a.B", "testB").with_step(Step::Builtin("true_is_true".to_string())),
        ];

        let summary = runner.run_round(&units, 1).await;
        assert_eq!(summary.total, 2);
        assert_eq!(summary.errored, 1);
        assert_eq!(summary.passed, 1);
        assert_eq!(
            summary.results[0].failure_message.as_deref(),
            Some("panicked: boom")
        );
    }

    #[tokio::test]
    async fn test_unit_timeout_marks_error() {
        let runner = ExecutionRunner::default();
        let slow = TestUnit::new("a.B", "testSlow")
            .with_timeout_ms(20)
            .with_step(Step::SleepMs(5_000));

        let result = runner.execute(&slow).await;
        assert_eq!(result.outcome, Outcome::Error);
        assert_eq!(result.failure_message.as_deref(), Some("timed out after 20ms"));
        assert!(result.duration_ms < 5_000);
    }

    #[tokio::test]
    async fn test_timeout_does_not_wait_for_blocking_builtin() {
        fn slow() -> Result<(), UnitFailure> {
            std::thread::sleep(Duration::from_millis(300));
            Ok(())
        }
        let mut registry = Registry::with_builtins();
        registry.register("slow", slow);
        let runner = ExecutionRunner::new(registry);

        let unit = TestUnit::new("a.B", "testSlowBuiltin")
            .with_timeout_ms(20)
            .with_step(Step::Builtin("slow".to_string()));

        let result = runner.execute(&unit).await;
        assert_eq!(result.outcome, Outcome::Error);
        assert_eq!(result.failure_message.as_deref(), Some("timed out after 20ms"));
        assert!(result.duration_ms < 300);
    }

    #[tokio::test]
    async fn test_unit_timeout_overrides_default() {
        let runner = ExecutionRunner::default().with_timeout(Some(Duration::from_millis(10)));
        let patient = TestUnit::new("a.B", "testPatient")
            .with_timeout_ms(5_000)
            .with_step(Step::SleepMs(30));

        assert_eq!(runner.execute(&patient).await.outcome, Outcome::Pass);

        let impatient = TestUnit::new("a.B", "testImpatient").with_step(Step::SleepMs(5_000));
        assert_eq!(runner.execute(&impatient).await.outcome, Outcome::Error);
    }

    #[tokio::test]
    async fn test_run_rounds() {
        let summaries = ExecutionRunner::default()
            .run_rounds(&[sample()], 3)
            .await;
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[2].round, 3);
        assert!(summaries.iter().all(|s| s.is_all_passed()));
    }
}
