//! Parallel test execution
//!
//! Units carry no shared state, so they may run concurrently. Concurrency
//! is bounded by a semaphore.

use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use super::body::join_error_message;
use super::ExecutionRunner;
use crate::models::{TestResult, TestUnit};
use crate::report::{ReportAggregator, RunSummary};

/// Parallel test executor
#[derive(Clone, Debug)]
pub struct ParallelExecutor {
    runner: ExecutionRunner,
    max_concurrent: usize,
}

impl ParallelExecutor {
    pub fn new(runner: ExecutionRunner, max_concurrent: usize) -> Self {
        Self {
            runner,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Execute units concurrently; one result per unit, in input order
    pub async fn execute_all(&self, units: &[TestUnit]) -> Vec<TestResult> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut handles = Vec::with_capacity(units.len());

        for unit in units {
            let semaphore = semaphore.clone();
            let runner = self.runner.clone();
            let unit = unit.clone();

            handles.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return TestResult::error(unit, 0, "executor shut down"),
                };

                debug!("Starting parallel execution of {}", unit.qualified_name);
                runner.execute(&unit).await
            }));
        }

        join_all(handles)
            .await
            .into_iter()
            .zip(units)
            .map(|(joined, unit)| match joined {
                Ok(result) => result,
                Err(e) => TestResult::error(unit.clone(), 0, join_error_message(e)),
            })
            .collect()
    }

    /// Run all units concurrently as one round
    pub async fn run_round(&self, units: &[TestUnit], round: u32) -> RunSummary {
        info!(
            "Running {} units in parallel (max {} concurrent, round {})",
            units.len(),
            self.max_concurrent,
            round
        );

        let mut aggregator = ReportAggregator::new(round);
        aggregator.extend(self.execute_all(units).await);
        let summary = aggregator.finish();

        info!(
            "Parallel round {} completed in {}ms - Pass: {}/{} ({:.1}%)",
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

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::models::{Outcome, Step};
    use std::time::Instant;

    #[test]
    fn test_parallel_executor_creation() {
        let executor = ParallelExecutor::new(ExecutionRunner::default(), 0);
        assert_eq!(executor.max_concurrent, 1);
    }

    #[tokio::test]
    async fn test_one_result_per_unit_in_order() {
        let units: Vec<_> = (0..10)
            .map(|i| {
                let unit = TestUnit::new("p.T", &format!("test{i:02}"));
                match i % 3 {
                    0 => unit.with_step(Step::AssertTrue(true)),
                    1 => unit.with_step(Step::Fail("f".to_string())),
                    _ => unit.with_step(Step::Raise("e".to_string())),
                }
            })
            .collect();

        let executor = ParallelExecutor::new(ExecutionRunner::default(), 3);
        let results = executor.execute_all(&units).await;

        assert_eq!(results.len(), units.len());
        for (result, unit) in results.iter().zip(&units) {
            assert_eq!(result.unit.qualified_name, unit.qualified_name);
        }

        let summary = executor.run_round(&units, 1).await;
        assert_eq!((summary.passed, summary.failed, summary.errored), (4, 3, 3));
    }

    #[tokio::test]
    async fn test_runs_concurrently() {
        let units: Vec<_> = (0..4)
            .map(|i| TestUnit::new("p.Slow", &format!("test{i}")).with_step(Step::SleepMs(200)))
            .collect();

        let start = Instant::now();
        let summary = ParallelExecutor::new(ExecutionRunner::default(), 4)
            .run_round(&units, 1)
            .await;

        assert!(summary.is_all_passed());
        assert!(start.elapsed().as_millis() < 700);
    }

    #[tokio::test]
    async fn test_parallel_rounds() {
        let units = vec![TestUnit::new("p.T", "testOk").with_step(Step::AssertTrue(true))];
        let summaries = ParallelExecutor::new(ExecutionRunner::default(), 2)
            .run_rounds(&units, 2)
            .await;
        assert_eq!(summaries.len(), 2);
        assert!(summaries
            .iter()
            .all(|s| s.results[0].outcome == Outcome::Pass));
    }
}
