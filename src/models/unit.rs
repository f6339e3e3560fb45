//! Test unit model
//!
//! Defines discoverable test units, their size categories and body steps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Size annotation of a test unit
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SizeCategory {
    Small,
    #[default]
    Medium,
    Large,
}

impl SizeCategory {
    pub fn name(&self) -> &'static str {
        match self {
            SizeCategory::Small => "small",
            SizeCategory::Medium => "medium",
            SizeCategory::Large => "large",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "small" => Some(SizeCategory::Small),
            "medium" => Some(SizeCategory::Medium),
            "large" => Some(SizeCategory::Large),
            _ => None,
        }
    }

    pub fn all() -> Vec<SizeCategory> {
        vec![SizeCategory::Small, SizeCategory::Medium, SizeCategory::Large]
    }
}

impl fmt::Display for SizeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Equality assertion operands
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Equality {
    pub expected: serde_json::Value,
    pub actual: serde_json::Value,
}

/// External process invocation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub expect_code: i32,
}

/// A single step of a unit body
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    AssertTrue(bool),
    AssertFalse(bool),
    AssertEquals(Equality),
    /// Unconditional assertion failure
    Fail(String),
    /// Unexpected fault
    Raise(String),
    SleepMs(u64),
    Run(Command),
    /// Named function from the builtin registry
    Builtin(String),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::AssertTrue(v) => write!(f, "assert_true({v})"),
            Step::AssertFalse(v) => write!(f, "assert_false({v})"),
            Step::AssertEquals(eq) => write!(f, "assert_equals({}, {})", eq.expected, eq.actual),
            Step::Fail(msg) => write!(f, "fail({msg:?})"),
            Step::Raise(msg) => write!(f, "raise({msg:?})"),
            Step::SleepMs(ms) => write!(f, "sleep_ms({ms})"),
            Step::Run(cmd) => write!(f, "run({} {})", cmd.program, cmd.args.join(" ")),
            Step::Builtin(name) => write!(f, "builtin({name})"),
        }
    }
}

/// A discoverable, executable test case
///
/// Units are immutable once discovered; the executor only reads them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestUnit {
    /// `<class>#<method>`
    pub qualified_name: String,
    pub size: SizeCategory,
    pub runner_kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(skip)]
    pub body: Vec<Step>,
    #[serde(skip)]
    pub source: PathBuf,
}

impl TestUnit {
    pub fn new(class: &str, method: &str) -> Self {
        Self {
            qualified_name: format!("{class}#{method}"),
            size: SizeCategory::default(),
            runner_kind: "default".to_string(),
            timeout_ms: None,
            body: Vec::new(),
            source: PathBuf::new(),
        }
    }

    pub fn with_size(mut self, size: SizeCategory) -> Self {
        self.size = size;
        self
    }

    pub fn with_runner(mut self, runner_kind: impl Into<String>) -> Self {
        self.runner_kind = runner_kind.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.body.push(step);
        self
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = source.into();
        self
    }

    /// Method part of the qualified name
    pub fn method_name(&self) -> &str {
        self.qualified_name
            .split_once('#')
            .map(|(_, method)| method)
            .unwrap_or(&self.qualified_name)
    }
}

impl fmt::Display for TestUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.qualified_name, self.size)
    }
}
