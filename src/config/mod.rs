//! Configuration module
//!
//! Handles loading and layering runner configuration. Values are resolved
//! in order: defaults, config file, profile, environment, command line.

mod env;
mod file;
mod profile;

pub use env::EnvConfig;
pub use file::ConfigFile;
pub use profile::RunProfile;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::models::SizeCategory;
use crate::output::OutputFormat;

/// Effective runner settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Default per-unit timeout; units without one run unbounded when unset
    pub timeout_ms: Option<u64>,

    /// Run units concurrently
    pub parallel: bool,

    /// Maximum concurrent units
    pub max_concurrent: usize,

    /// Number of rounds
    pub repeat: u32,

    /// Stdout format (table, summary, json, json-pretty)
    pub format: String,

    /// Colorize terminal output
    pub color: bool,

    /// Substring filter on qualified names
    pub filter: Option<String>,

    /// Size filter; empty keeps all
    pub sizes: Vec<SizeCategory>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            parallel: false,
            max_concurrent: 4,
            repeat: 1,
            format: "table".to_string(),
            color: true,
            filter: None,
            sizes: Vec::new(),
        }
    }
}

/// Partial settings from one layer; `None` leaves the value alone
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub timeout_ms: Option<u64>,
    pub parallel: Option<bool>,
    pub max_concurrent: Option<usize>,
    pub repeat: Option<u32>,
    pub format: Option<String>,
    pub color: Option<bool>,
    pub filter: Option<String>,
    pub sizes: Option<Vec<SizeCategory>>,
}

impl RunnerConfig {
    /// Apply a layer of overrides
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.timeout_ms = Some(timeout_ms);
        }
        if let Some(parallel) = overrides.parallel {
            self.parallel = parallel;
        }
        if let Some(max_concurrent) = overrides.max_concurrent {
            self.max_concurrent = max_concurrent;
        }
        if let Some(repeat) = overrides.repeat {
            self.repeat = repeat;
        }
        if let Some(format) = &overrides.format {
            self.format = format.clone();
        }
        if let Some(color) = overrides.color {
            self.color = color;
        }
        if let Some(filter) = &overrides.filter {
            self.filter = Some(filter.clone());
        }
        if let Some(sizes) = &overrides.sizes {
            self.sizes = sizes.clone();
        }
    }

    /// Apply a named profile
    pub fn apply_profile(&mut self, profile: &RunProfile) {
        self.apply(&profile.overrides());
    }

    /// Resolved output format
    pub fn output_format(&self) -> Result<OutputFormat> {
        OutputFormat::from_str(&self.format)
            .ok_or_else(|| anyhow::anyhow!("Unknown output format: {}", self.format))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent == 0 {
            anyhow::bail!("max_concurrent must be at least 1");
        }
        if self.repeat == 0 {
            anyhow::bail!("repeat must be at least 1");
        }
        if self.timeout_ms == Some(0) {
            anyhow::bail!("timeout_ms must be greater than 0");
        }
        self.output_format()?;
        Ok(())
    }
}

/// Parse a comma separated size list
pub fn parse_sizes(s: &str) -> Result<Vec<SizeCategory>> {
    s.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            SizeCategory::from_str(part).ok_or_else(|| {
                let valid: Vec<_> = SizeCategory::all().iter().map(|s| s.name()).collect();
                anyhow::anyhow!(
                    "Invalid size '{}', expected one of {}",
                    part.trim(),
                    valid.join(", ")
                )
            })
        })
        .collect()
}
