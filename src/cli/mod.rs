//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Overrides;
use crate::models::SizeCategory;

/// Discover, run and report on test units
#[derive(Parser, Debug)]
#[command(name = "runner")]
#[command(version)]
#[command(about = "Discover test units under a root directory, run them and report status")]
#[command(long_about = None)]
pub struct Args {
    /// Root directory containing test index files
    pub root: PathBuf,

    /// List discovered units without running them
    #[arg(short, long)]
    pub list: bool,

    /// Only units whose qualified name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Only units of these sizes (comma-separated: small,medium,large)
    #[arg(short, long, value_delimiter = ',', value_parser = parse_size)]
    pub size: Vec<SizeCategory>,

    /// Run units in parallel
    #[arg(short, long)]
    pub parallel: bool,

    /// Number of concurrent units (when parallel)
    #[arg(short, long)]
    pub concurrent: Option<usize>,

    /// Default per-unit timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Number of rounds
    #[arg(short, long)]
    pub repeat: Option<u32>,

    /// Output format (table, summary, json, json-pretty)
    #[arg(long)]
    pub format: Option<String>,

    /// Also write the report to this file (.json, .csv, or text)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Named run profile
    #[arg(long)]
    pub profile: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Settings layer from command-line flags
    pub fn overrides(&self) -> Overrides {
        Overrides {
            timeout_ms: self.timeout_ms,
            parallel: self.parallel.then_some(true),
            max_concurrent: self.concurrent,
            repeat: self.repeat,
            format: self.format.clone(),
            color: self.no_color.then_some(false),
            filter: self.filter.clone(),
            sizes: (!self.size.is_empty()).then(|| self.size.clone()),
        }
    }
}

fn parse_size(s: &str) -> Result<SizeCategory, String> {
    SizeCategory::from_str(s)
        .ok_or_else(|| format!("invalid size '{s}', expected small, medium or large"))
}
