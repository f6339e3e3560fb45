//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;
use std::path::PathBuf;

use super::{parse_sizes, Overrides};
use crate::utils::LogLevel;

/// Environment variable prefix
const ENV_PREFIX: &str = "TEST_RUNNER";

/// Configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// TEST_RUNNER_TIMEOUT_MS
    pub timeout_ms: Option<u64>,
    /// TEST_RUNNER_PARALLEL
    pub parallel: Option<bool>,
    /// TEST_RUNNER_CONCURRENT
    pub max_concurrent: Option<usize>,
    /// TEST_RUNNER_REPEAT
    pub repeat: Option<u32>,
    /// TEST_RUNNER_FORMAT
    pub format: Option<String>,
    /// TEST_RUNNER_FILTER
    pub filter: Option<String>,
    /// TEST_RUNNER_SIZES
    pub sizes: Option<String>,
    /// TEST_RUNNER_PROFILE
    pub profile: Option<String>,
    /// TEST_RUNNER_CONFIG
    pub config_file: Option<PathBuf>,
    /// TEST_RUNNER_VERBOSE
    pub verbose: Option<bool>,
    /// TEST_RUNNER_LOG_LEVEL
    pub log_level: Option<LogLevel>,
    /// NO_COLOR, any value disables color
    pub no_color: bool,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            timeout_ms: get_env_parse("TIMEOUT_MS"),
            parallel: get_env_bool("PARALLEL"),
            max_concurrent: get_env_parse("CONCURRENT"),
            repeat: get_env_parse("REPEAT"),
            format: get_env("FORMAT"),
            filter: get_env("FILTER"),
            sizes: get_env("SIZES"),
            profile: get_env("PROFILE"),
            config_file: get_env("CONFIG").map(PathBuf::from),
            verbose: get_env_bool("VERBOSE"),
            log_level: get_env("LOG_LEVEL").and_then(|v| LogLevel::from_str(&v)),
            no_color: env::var_os("NO_COLOR").is_some(),
        }
    }

    /// Convert into a settings layer
    pub fn overrides(&self) -> anyhow::Result<Overrides> {
        let sizes = match &self.sizes {
            Some(s) => Some(parse_sizes(s)?),
            None => None,
        };

        Ok(Overrides {
            timeout_ms: self.timeout_ms,
            parallel: self.parallel,
            max_concurrent: self.max_concurrent,
            repeat: self.repeat,
            format: self.format.clone(),
            color: self.no_color.then_some(false),
            filter: self.filter.clone(),
            sizes,
        })
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.trim().parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| parse_bool(&v))
}

fn parse_bool(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "enabled"
    )
}
