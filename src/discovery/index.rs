//! Test index files
//!
//! An index file is generated at build time and describes one test class:
//! its size annotation, runner kind and methods with their bodies.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::DiscoveryError;
use crate::models::{SizeCategory, Step, TestUnit};

/// File name suffixes recognised as test indexes
pub const INDEX_SUFFIXES: &[&str] = &[".tests.yaml", ".tests.yml", ".tests.json"];

fn default_runner() -> String {
    "default".to_string()
}

/// One test class as written in an index file
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassIndex {
    pub class: String,

    #[serde(default)]
    pub size: SizeCategory,

    #[serde(default = "default_runner")]
    pub runner: String,

    #[serde(default)]
    pub disabled: bool,

    #[serde(default)]
    pub tests: Vec<MethodIndex>,
}

/// One test method of a class
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MethodIndex {
    pub name: String,

    /// Overrides the class size when set
    #[serde(default)]
    pub size: Option<SizeCategory>,

    #[serde(default)]
    pub disabled: Option<bool>,

    #[serde(default)]
    pub timeout_ms: Option<u64>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Units read from one index, split by enablement
#[derive(Debug, Default)]
pub struct IndexedUnits {
    pub enabled: Vec<TestUnit>,
    pub disabled: Vec<String>,
}

impl ClassIndex {
    /// Parse an index file, choosing YAML or JSON by extension
    pub fn load(path: &Path) -> Result<Self, DiscoveryError> {
        let content = std::fs::read_to_string(path).map_err(|source| DiscoveryError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let index: Self = if is_json_file(path) {
            serde_json::from_str(&content).map_err(|e| invalid(path, e.to_string()))?
        } else {
            serde_yaml::from_str(&content).map_err(|e| invalid(path, e.to_string()))?
        };

        index.validate(path)?;
        Ok(index)
    }

    fn validate(&self, path: &Path) -> Result<(), DiscoveryError> {
        if self.class.trim().is_empty() {
            return Err(invalid(path, "class name is empty"));
        }
        if self.class.contains('#') {
            return Err(invalid(path, format!("class name '{}' contains '#'", self.class)));
        }
        for method in &self.tests {
            if method.name.trim().is_empty() || method.name.contains('#') {
                return Err(invalid(
                    path,
                    format!("invalid method name '{}' in {}", method.name, self.class),
                ));
            }
        }
        Ok(())
    }

    /// Expand the class into test units
    pub fn into_units(self, source: &Path) -> IndexedUnits {
        let mut units = IndexedUnits::default();

        for method in self.tests {
            let disabled = method.disabled.unwrap_or(self.disabled);
            let mut unit = TestUnit::new(&self.class, &method.name)
                .with_size(method.size.unwrap_or(self.size))
                .with_runner(&self.runner)
                .with_source(source);
            if let Some(timeout_ms) = method.timeout_ms {
                unit = unit.with_timeout_ms(timeout_ms);
            }
            unit.body = method.steps;

            if disabled {
                units.disabled.push(unit.qualified_name);
            } else {
                units.enabled.push(unit);
            }
        }

        units
    }
}

/// Check whether a file name marks a test index
pub fn is_index_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| INDEX_SUFFIXES.iter().any(|suffix| n.ends_with(suffix)))
        .unwrap_or(false)
}

fn is_json_file(path: &Path) -> bool {
    path.extension().map(|e| e == "json").unwrap_or(false)
}

fn invalid(path: &Path, message: impl Into<String>) -> DiscoveryError {
    DiscoveryError::InvalidIndex {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_is_index_file() {
        assert!(is_index_file(Path::new("a/SampleTest.tests.yaml")));
        assert!(is_index_file(Path::new("SampleTest.tests.json")));
        assert!(!is_index_file(Path::new("SampleTest.yaml")));
        assert!(!is_index_file(Path::new("SampleTest.java")));
    }

    #[test]
    fn test_method_overrides() {
        let yaml = r#"
class: org.example.MixedTest
size: large
runner: BaseJUnit4ClassRunner
tests:
  - name: testA
    steps: [{assert_true: true}]
  - name: testB
    size: small
    timeout_ms: 250
  - name: testC
    disabled: true
"#;
        let index: ClassIndex = serde_yaml::from_str(yaml).unwrap();
        let units = index.into_units(&PathBuf::from("MixedTest.tests.yaml"));

        assert_eq!(units.enabled.len(), 2);
        assert_eq!(units.enabled[0].size, SizeCategory::Large);
        assert_eq!(units.enabled[0].runner_kind, "BaseJUnit4ClassRunner");
        assert_eq!(units.enabled[1].size, SizeCategory::Small);
        assert_eq!(units.enabled[1].timeout_ms, Some(250));
        assert_eq!(units.disabled, vec!["org.example.MixedTest#testC".to_string()]);
    }

    #[test]
    fn test_disabled_class_can_reenable_method() {
        let yaml = r#"
class: org.example.Off
disabled: true
tests:
  - name: testOff
  - name: testOn
    disabled: false
"#;
        let index: ClassIndex = serde_yaml::from_str(yaml).unwrap();
        let units = index.into_units(Path::new("Off.tests.yaml"));
        assert_eq!(units.enabled.len(), 1);
        assert_eq!(units.enabled[0].method_name(), "testOn");
        assert_eq!(units.disabled.len(), 1);
    }

    #[test]
    fn test_load_json_index() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Json.tests.json");
        std::fs::write(
            &path,
            r#"{"class": "org.example.Json",
                "tests": [{"name": "testIt", "steps": [{"fail": "nope"}]}]}"#,
        )
        .unwrap();

        let index = ClassIndex::load(&path).unwrap();
        assert_eq!(index.class, "org.example.Json");
        assert_eq!(index.runner, "default");
        assert_eq!(index.tests[0].steps, vec![Step::Fail("nope".to_string())]);
    }

    #[test]
    fn test_load_rejects_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Bad.tests.yaml");
        std::fs::write(&path, "class: [not, a, string]\n").unwrap();

        let err = ClassIndex::load(&path).unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidIndex { .. }));
    }

    #[test]
    fn test_load_rejects_hash_in_method() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Hash.tests.yaml");
        std::fs::write(&path, "class: a.B\ntests:\n  - name: 'x#y'\n").unwrap();

        assert!(ClassIndex::load(&path).is_err());
    }
}
