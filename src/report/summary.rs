//! Run summaries
//!
//! Collects per-unit results of one run into counts plus the full list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{Outcome, TestResult};
use crate::utils::Timer;

/// Summary of one run over all discovered units
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub round: u32,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    /// Sum of per-unit durations
    pub total_duration_ms: u64,
    /// Wall-clock time of the whole run
    pub elapsed_ms: u64,
    pub results: Vec<TestResult>,
}

impl RunSummary {
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }

    /// True when nothing failed or errored
    pub fn is_all_passed(&self) -> bool {
        self.passed == self.total
    }

    /// Results that did not pass, in report order
    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| !r.outcome.is_success())
    }

    /// One-line human readable summary
    pub fn headline(&self) -> String {
        format!(
            "Ran {} tests in {}ms: {} passed, {} failed, {} errored",
            self.total, self.elapsed_ms, self.passed, self.failed, self.errored
        )
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            writeln!(f, "  {result}")?;
        }
        writeln!(f, "{}", self.headline())
    }
}

/// In-memory aggregator fed one result at a time
#[derive(Debug)]
pub struct ReportAggregator {
    round: u32,
    started_at: DateTime<Utc>,
    timer: Timer,
    results: Vec<TestResult>,
}

impl ReportAggregator {
    pub fn new(round: u32) -> Self {
        Self {
            round,
            started_at: Utc::now(),
            timer: Timer::start(format!("round {round}")),
            results: Vec::new(),
        }
    }

    pub fn record(&mut self, result: TestResult) {
        self.results.push(result);
    }

    /// Close the run; results are ordered by qualified name
    pub fn finish(self) -> RunSummary {
        let elapsed_ms = self.timer.elapsed_ms();
        let mut results = self.results;
        results.sort_by(|a, b| a.unit.qualified_name.cmp(&b.unit.qualified_name));

        let count = |outcome: Outcome| results.iter().filter(|r| r.outcome == outcome).count();
        let passed = count(Outcome::Pass);
        let failed = count(Outcome::Fail);
        let errored = count(Outcome::Error);
        let total_duration_ms = results.iter().map(|r| r.duration_ms).sum();

        RunSummary {
            round: self.round,
            started_at: self.started_at,
            total: results.len(),
            passed,
            failed,
            errored,
            total_duration_ms,
            elapsed_ms,
            results,
        }
    }
}

impl Extend<TestResult> for ReportAggregator {
    fn extend<I: IntoIterator<Item = TestResult>>(&mut self, iter: I) {
        self.results.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestUnit;

    fn unit(method: &str) -> TestUnit {
        TestUnit::new("org.example.Sample", method)
    }

    #[test]
    fn test_single_passing_unit() {
        let mut aggregator = ReportAggregator::new(1);
        aggregator.record(TestResult::pass(unit("testTrueIsTrue"), 3));

        let summary = aggregator.finish();
        assert_eq!((summary.passed, summary.failed, summary.errored), (1, 0, 0));
        assert!(summary.is_all_passed());
        assert_eq!(summary.pass_rate(), 100.0);
    }

    #[test]
    fn test_counts_and_order() {
        let mut aggregator = ReportAggregator::new(1);
        aggregator.extend(vec![
            TestResult::error(unit("testC"), 1, "boom"),
            TestResult::pass(unit("testA"), 2),
            TestResult::fail(unit("testB"), 3, "nope"),
        ]);

        let summary = aggregator.finish();
        assert_eq!(summary.total, 3);
        assert_eq!((summary.passed, summary.failed, summary.errored), (1, 1, 1));
        assert_eq!(summary.total_duration_ms, 6);
        assert!(!summary.is_all_passed());

        let order: Vec<_> = summary.results.iter().map(|r| r.unit.method_name()).collect();
        assert_eq!(order, vec!["testA", "testB", "testC"]);

        let failures: Vec<_> = summary.failures().map(|r| r.unit.method_name()).collect();
        assert_eq!(failures, vec!["testB", "testC"]);
    }

    #[test]
    fn test_empty_run() {
        let summary = ReportAggregator::new(1).finish();
        assert_eq!(summary.total, 0);
        assert!(summary.is_all_passed());
        assert_eq!(summary.pass_rate(), 0.0);
        assert!(summary.headline().starts_with("Ran 0 tests"));
    }
}
