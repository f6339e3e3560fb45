//! Test result models
//!
//! Defines outcomes and per-unit results.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::TestUnit;

/// Outcome of executing a unit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
    Error,
}

impl Outcome {
    pub fn symbol(&self) -> &'static str {
        match self {
            Outcome::Pass => "✓",
            Outcome::Fail => "✗",
            Outcome::Error => "!",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Pass)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass => write!(f, "PASS"),
            Outcome::Fail => write!(f, "FAIL"),
            Outcome::Error => write!(f, "ERROR"),
        }
    }
}

/// Result of a single unit execution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestResult {
    pub unit: TestUnit,
    pub outcome: Outcome,
    pub duration_ms: u64,
    pub failure_message: Option<String>,
}

impl TestResult {
    pub fn pass(unit: TestUnit, duration_ms: u64) -> Self {
        Self {
            unit,
            outcome: Outcome::Pass,
            duration_ms,
            failure_message: None,
        }
    }

    pub fn fail(unit: TestUnit, duration_ms: u64, message: impl Into<String>) -> Self {
        Self {
            unit,
            outcome: Outcome::Fail,
            duration_ms,
            failure_message: Some(message.into()),
        }
    }

    pub fn error(unit: TestUnit, duration_ms: u64, error: impl Into<String>) -> Self {
        Self {
            unit,
            outcome: Outcome::Error,
            duration_ms,
            failure_message: Some(error.into()),
        }
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}ms]",
            self.outcome.symbol(),
            self.unit.qualified_name,
            self.duration_ms
        )?;
        if let Some(msg) = &self.failure_message {
            write!(f, " - {msg}")?;
        }
        Ok(())
    }
}
