//! Builtin test bodies
//!
//! Index files refer to Rust-implemented bodies by name. The names are
//! resolved against an explicit registration list compiled into the binary,
//! so no runtime reflection is involved.

use std::collections::HashMap;

use super::UnitFailure;

/// Signature of a builtin body
///
/// Builtins run on the blocking pool and must terminate on their own. A unit
/// timeout reports the unit as `Error` right away, but cannot stop a builtin
/// that is already running; its thread stays busy until the call returns.
pub type BuiltinFn = fn() -> Result<(), UnitFailure>;

/// Bodies shipped with the runner
const BUILTINS: &[(&str, BuiltinFn)] = &[
    ("true_is_true", true_is_true),
    ("false_is_false", false_is_false),
    ("arithmetic_sanity", arithmetic_sanity),
];

/// Fails with `message` unless `condition` holds
pub fn assert_true(condition: bool, message: &str) -> Result<(), UnitFailure> {
    if condition {
        Ok(())
    } else {
        Err(UnitFailure::Assertion(message.to_string()))
    }
}

/// JUnit-style equality assertion
pub fn assert_equals<T: PartialEq + std::fmt::Debug>(
    expected: T,
    actual: T,
) -> Result<(), UnitFailure> {
    if expected == actual {
        Ok(())
    } else {
        Err(UnitFailure::Assertion(format!(
            "expected:<{expected:?}> but was:<{actual:?}>"
        )))
    }
}

fn true_is_true() -> Result<(), UnitFailure> {
    assert_true(true, "true is not true")
}

fn false_is_false() -> Result<(), UnitFailure> {
    assert_equals(false, 1 > 2)
}

fn arithmetic_sanity() -> Result<(), UnitFailure> {
    assert_equals(4, 2 + 2)?;
    assert_equals(1, 7 % 3)
}

/// Name to body lookup
#[derive(Clone, Debug)]
pub struct Registry {
    bodies: HashMap<String, BuiltinFn>,
}

impl Registry {
    /// Registry with no bodies
    pub fn empty() -> Self {
        Self {
            bodies: HashMap::new(),
        }
    }

    /// Registry preloaded with the shipped bodies
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for (name, body) in BUILTINS {
            registry.register(*name, *body);
        }
        registry
    }

    /// Register a body, replacing any previous one under the same name
    pub fn register(&mut self, name: impl Into<String>, body: BuiltinFn) -> &mut Self {
        self.bodies.insert(name.into(), body);
        self
    }

    pub fn get(&self, name: &str) -> Option<BuiltinFn> {
        self.bodies.get(name).copied()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.bodies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
