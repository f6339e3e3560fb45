//! Aggregation across repeated rounds
//!
//! Flags units whose outcome changes between rounds over unchanged input.

use serde::Serialize;
use std::collections::BTreeMap;

use super::RunSummary;
use crate::models::Outcome;

/// Statistics for a single unit across rounds
#[derive(Clone, Debug, Default, Serialize)]
pub struct UnitStats {
    pub passes: u32,
    pub failures: u32,
    pub errors: u32,
    pub total_duration_ms: u64,
}

impl UnitStats {
    pub fn runs(&self) -> u32 {
        self.passes + self.failures + self.errors
    }

    pub fn pass_rate(&self) -> f64 {
        let runs = self.runs();
        if runs == 0 {
            0.0
        } else {
            (self.passes as f64 / runs as f64) * 100.0
        }
    }

    /// Passed at least once and did not pass at least once
    pub fn is_flaky(&self) -> bool {
        self.passes > 0 && self.passes < self.runs()
    }
}

/// Results of all rounds, keyed by qualified name
#[derive(Clone, Debug, Serialize)]
pub struct RepeatAggregate {
    pub total_rounds: u32,
    pub unit_stats: BTreeMap<String, UnitStats>,
    pub overall_pass_rate: f64,
}

impl RepeatAggregate {
    pub fn from_rounds(summaries: &[RunSummary]) -> Self {
        let mut unit_stats: BTreeMap<String, UnitStats> = BTreeMap::new();

        for summary in summaries {
            for result in &summary.results {
                let stats = unit_stats
                    .entry(result.unit.qualified_name.clone())
                    .or_default();

                match result.outcome {
                    Outcome::Pass => stats.passes += 1,
                    Outcome::Fail => stats.failures += 1,
                    Outcome::Error => stats.errors += 1,
                }
                stats.total_duration_ms += result.duration_ms;
            }
        }

        let overall_pass_rate = if summaries.is_empty() {
            0.0
        } else {
            summaries.iter().map(|s| s.pass_rate()).sum::<f64>() / summaries.len() as f64
        };

        Self {
            total_rounds: summaries.len() as u32,
            unit_stats,
            overall_pass_rate,
        }
    }

    /// Flaky units, lowest pass rate first
    pub fn flaky_units(&self) -> Vec<(&str, f64)> {
        let mut flaky: Vec<_> = self
            .unit_stats
            .iter()
            .filter(|(_, stats)| stats.is_flaky())
            .map(|(name, stats)| (name.as_str(), stats.pass_rate()))
            .collect();
        flaky.sort_by(|a, b| a.1.total_cmp(&b.1));
        flaky
    }

    /// Units that never passed
    pub fn broken_units(&self) -> Vec<&str> {
        self.unit_stats
            .iter()
            .filter(|(_, stats)| stats.passes == 0)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
