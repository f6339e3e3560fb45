//! Run profiles
//!
//! Named presets that select units and execution mode in one flag.

use serde::{Deserialize, Serialize};

use super::Overrides;
use crate::models::SizeCategory;

/// Named run preset
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunProfile {
    /// Profile name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Substring filter on qualified names
    #[serde(default)]
    pub filter: Option<String>,
    /// Sizes to include; empty keeps all
    #[serde(default)]
    pub sizes: Vec<SizeCategory>,
    /// Number of rounds
    #[serde(default)]
    pub repeat: Option<u32>,
    /// Run in parallel
    #[serde(default)]
    pub parallel: Option<bool>,
    /// Default per-unit timeout
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl RunProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            filter: None,
            sizes: Vec::new(),
            repeat: None,
            parallel: None,
            timeout_ms: None,
        }
    }

    /// Small tests only, bounded at one minute each
    pub fn smoke() -> Self {
        Self {
            description: "Small tests only".to_string(),
            sizes: vec![SizeCategory::Small],
            parallel: Some(true),
            timeout_ms: Some(60_000),
            ..Self::new("smoke")
        }
    }

    /// Repeated rounds to surface flaky units
    pub fn health() -> Self {
        Self {
            description: "Run every unit five times and report flakiness".to_string(),
            repeat: Some(5),
            parallel: Some(true),
            ..Self::new("health")
        }
    }

    /// Profiles available without a config file
    pub fn builtin() -> Vec<RunProfile> {
        vec![Self::smoke(), Self::health()]
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            timeout_ms: self.timeout_ms,
            parallel: self.parallel,
            repeat: self.repeat,
            filter: self.filter.clone(),
            sizes: (!self.sizes.is_empty()).then(|| self.sizes.clone()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunnerConfig;

    #[test]
    fn test_builtin_profiles() {
        let names: Vec<_> = RunProfile::builtin().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["smoke", "health"]);
    }

    #[test]
    fn test_profile_applies_only_set_fields() {
        let mut config = RunnerConfig {
            max_concurrent: 8,
            ..Default::default()
        };
        config.apply_profile(&RunProfile::smoke());

        assert_eq!(config.sizes, vec![SizeCategory::Small]);
        assert!(config.parallel);
        assert_eq!(config.timeout_ms, Some(60_000));
        assert_eq!(config.max_concurrent, 8);
        assert_eq!(config.repeat, 1);
    }

    #[test]
    fn test_empty_profile_is_noop() {
        let mut config = RunnerConfig::default();
        config.apply_profile(&RunProfile::new("empty"));
        assert_eq!(config, RunnerConfig::default());
    }
}
