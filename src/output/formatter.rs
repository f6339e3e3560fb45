//! Output formatters for test results
//!
//! Provides table, summary and JSON renderings of runs.

use serde::Serialize;

use crate::discovery::Discovery;
use crate::models::{Outcome, TestResult};
use crate::report::{RepeatAggregate, RunSummary};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Summary,
    Json,
    JsonPretty,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "summary" => Some(OutputFormat::Summary),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            _ => None,
        }
    }

    fn is_json(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::JsonPretty)
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    fn to_json<T: Serialize>(&self, value: &T) -> String {
        if self.format == OutputFormat::JsonPretty {
            serde_json::to_string_pretty(value).unwrap_or_default()
        } else {
            serde_json::to_string(value).unwrap_or_default()
        }
    }

    fn paint(&self, text: &str, outcome: Outcome) -> String {
        if !self.colorize {
            return text.to_string();
        }
        let code = match outcome {
            Outcome::Pass => "32",
            Outcome::Fail | Outcome::Error => "31",
        };
        format!("\x1b[{code}m{text}\x1b[0m")
    }

    /// Format a single result as one line
    pub fn format_result(&self, result: &TestResult) -> String {
        if self.format.is_json() {
            return self.to_json(result);
        }

        let status = format!("{} {:5}", result.outcome.symbol(), result.outcome.to_string());
        format!(
            "{} {:6} {} [{}ms]",
            self.paint(&status, result.outcome),
            result.unit.size.name(),
            result.unit.qualified_name,
            result.duration_ms
        )
    }

    /// Detail line for a result that did not pass
    pub fn format_failure(&self, result: &TestResult) -> String {
        let label = self.paint(&result.outcome.to_string(), result.outcome);
        match &result.failure_message {
            Some(message) => format!("{} {}: {}", label, result.unit.qualified_name, message),
            None => format!("{} {}", label, result.unit.qualified_name),
        }
    }

    /// Format a run summary
    pub fn format_summary(&self, summary: &RunSummary) -> String {
        match self.format {
            OutputFormat::Table => self.format_summary_table(summary),
            OutputFormat::Summary => self.format_summary_brief(summary),
            OutputFormat::Json | OutputFormat::JsonPretty => self.to_json(summary),
        }
    }

    fn format_summary_table(&self, summary: &RunSummary) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\n═══ Round {} ═══════════════════════════════════════════════════\n",
            summary.round
        ));
        for result in &summary.results {
            output.push_str(&format!("  {}\n", self.format_result(result)));
        }
        output.push_str("───────────────────────────────────────────────────────────────\n");

        let failures: Vec<_> = summary.failures().collect();
        if !failures.is_empty() {
            output.push_str("Failures:\n");
            for result in failures {
                output.push_str(&format!("  {}\n", self.format_failure(result)));
            }
        }

        output.push_str(&format!(
            "Pass Rate: {:5.1}% | Unit Time: {}ms\n",
            summary.pass_rate(),
            summary.total_duration_ms
        ));
        output.push_str(&self.headline(summary));
        output
    }

    fn format_summary_brief(&self, summary: &RunSummary) -> String {
        let mut output = String::new();
        for result in summary.failures() {
            output.push_str(&self.format_failure(result));
            output.push('\n');
        }
        output.push_str(&self.headline(summary));
        output
    }

    fn headline(&self, summary: &RunSummary) -> String {
        let outcome = if summary.is_all_passed() {
            Outcome::Pass
        } else {
            Outcome::Fail
        };
        self.paint(&summary.headline(), outcome)
    }

    /// Format the aggregate of repeated rounds
    pub fn format_aggregate(&self, aggregate: &RepeatAggregate) -> String {
        if self.format.is_json() {
            return self.to_json(aggregate);
        }

        let mut output = String::new();
        output.push_str(&format!(
            "\nAggregate over {} rounds: {:.1}% average pass rate\n",
            aggregate.total_rounds, aggregate.overall_pass_rate
        ));

        let flaky = aggregate.flaky_units();
        if flaky.is_empty() {
            output.push_str("No flaky units detected\n");
        } else {
            output.push_str("Flaky units:\n");
            for (name, rate) in flaky {
                output.push_str(&format!("  - {name} ({rate:.1}%)\n"));
            }
        }

        let broken = aggregate.broken_units();
        if !broken.is_empty() {
            output.push_str("Never passed:\n");
            for name in broken {
                output.push_str(&format!("  - {name}\n"));
            }
        }

        output
    }

    /// Format discovered units for `--list`
    pub fn format_discovery(&self, discovery: &Discovery) -> String {
        if self.format.is_json() {
            #[derive(Serialize)]
            struct DiscoveryJson<'a> {
                index_files: usize,
                units: &'a [crate::models::TestUnit],
                disabled: &'a [String],
            }

            return self.to_json(&DiscoveryJson {
                index_files: discovery.index_files,
                units: &discovery.units,
                disabled: &discovery.disabled,
            });
        }

        let mut output = String::new();
        for unit in &discovery.units {
            output.push_str(&format!(
                "{:6} {:24} {}\n",
                unit.size.name(),
                unit.runner_kind,
                unit.qualified_name
            ));
        }
        for name in &discovery.disabled {
            output.push_str(&format!("{:6} {:24} {}\n", "-", "(disabled)", name));
        }
        output.push_str(&format!(
            "{} units in {} index files ({} disabled)",
            discovery.units.len(),
            discovery.index_files,
            discovery.disabled.len()
        ));
        output
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestUnit;
    use crate::report::ReportAggregator;

    fn mixed_summary() -> RunSummary {
        let mut aggregator = ReportAggregator::new(1);
        aggregator.record(TestResult::pass(TestUnit::new("a.T", "testOk"), 1));
        aggregator.record(TestResult::fail(TestUnit::new("a.T", "testBad"), 2, "expected true"));
        aggregator.record(TestResult::error(TestUnit::new("a.T", "testBoom"), 3, "NPE"));
        aggregator.finish()
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("TABLE"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::from_str("csv"), None);
    }

    #[test]
    fn test_summary_lists_each_failure() {
        let formatter = ResultFormatter::new(OutputFormat::Summary).no_color();
        let output = formatter.format_summary(&mixed_summary());
        let lines: Vec<_> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "FAIL a.T#testBad: expected true");
        assert_eq!(lines[1], "ERROR a.T#testBoom: NPE");
        assert!(lines[2].starts_with("Ran 3 tests in "));
        assert!(lines[2].ends_with(": 1 passed, 1 failed, 1 errored"));
    }

    #[test]
    fn test_table_contains_units() {
        let formatter = ResultFormatter::new(OutputFormat::Table).no_color();
        let output = formatter.format_summary(&mixed_summary());
        assert!(output.contains("a.T#testOk"));
        assert!(output.contains("Failures:"));
        assert!(!output.contains("\x1b["));
    }

    #[test]
    fn test_json_summary() {
        let formatter = ResultFormatter::new(OutputFormat::Json);
        let value: serde_json::Value =
            serde_json::from_str(&formatter.format_summary(&mixed_summary())).unwrap();
        assert_eq!(value["passed"], 1);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["errored"], 1);
        assert_eq!(value["results"][0]["unit"]["qualified_name"], "a.T#testBad");
        assert_eq!(value["results"][0]["outcome"], "fail");
    }

    #[test]
    fn test_format_discovery() {
        let discovery = Discovery {
            units: vec![TestUnit::new("a.T", "testOk").with_runner("BaseJUnit4ClassRunner")],
            disabled: vec!["a.T#testOff".to_string()],
            index_files: 1,
        };
        let output = ResultFormatter::new(OutputFormat::Table).format_discovery(&discovery);
        assert!(output.contains("BaseJUnit4ClassRunner"));
        assert!(output.ends_with("1 units in 1 index files (1 disabled)"));
    }
}
