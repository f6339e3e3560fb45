//! Unit body evaluation
//!
//! Runs the steps of a unit in order and classifies the first failure as
//! either an assertion failure or an unexpected fault.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::debug;

use super::Registry;
use crate::models::{Command, Step};

/// Why a unit body stopped early
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitFailure {
    /// A checked expectation did not hold
    #[error("{0}")]
    Assertion(String),

    /// Anything the body did not expect
    #[error("{0}")]
    Fault(String),
}

/// Evaluate every step of a body
pub async fn run_body(steps: Vec<Step>, registry: Arc<Registry>) -> Result<(), UnitFailure> {
    for step in steps {
        debug!("step {}", step);
        run_step(step, &registry).await?;
    }
    Ok(())
}

async fn run_step(step: Step, registry: &Registry) -> Result<(), UnitFailure> {
    match step {
        Step::AssertTrue(value) => {
            if value {
                Ok(())
            } else {
                Err(UnitFailure::Assertion(
                    "expected true but was false".to_string(),
                ))
            }
        }
        Step::AssertFalse(value) => {
            if value {
                Err(UnitFailure::Assertion(
                    "expected false but was true".to_string(),
                ))
            } else {
                Ok(())
            }
        }
        Step::AssertEquals(eq) => {
            if eq.expected == eq.actual {
                Ok(())
            } else {
                Err(UnitFailure::Assertion(format!(
                    "expected:<{}> but was:<{}>",
                    eq.expected, eq.actual
                )))
            }
        }
        Step::Fail(message) => Err(UnitFailure::Assertion(message)),
        Step::Raise(message) => Err(UnitFailure::Fault(message)),
        Step::SleepMs(ms) => {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(())
        }
        Step::Run(command) => run_command(&command).await,
        Step::Builtin(name) => {
            let body = registry
                .get(&name)
                .ok_or_else(|| UnitFailure::Fault(format!("unknown builtin: {name}")))?;

            match tokio::task::spawn_blocking(body).await {
                Ok(result) => result,
                Err(e) => Err(UnitFailure::Fault(join_error_message(e))),
            }
        }
    }
}

async fn run_command(command: &Command) -> Result<(), UnitFailure> {
    let output = tokio::process::Command::new(&command.program)
        .args(&command.args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| UnitFailure::Fault(format!("failed to run {}: {e}", command.program)))?;

    let code = output.status.code().ok_or_else(|| {
        UnitFailure::Fault(format!("{} was terminated by a signal", command.program))
    })?;

    if code == command.expect_code {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let last_line = stderr.lines().rev().find(|l| !l.trim().is_empty());
    let mut message = format!(
        "{} exited with code {code}, expected {}",
        command.program, command.expect_code
    );
    if let Some(line) = last_line {
        message.push_str(": ");
        message.push_str(line.trim());
    }
    Err(UnitFailure::Assertion(message))
}

/// Describe a task that panicked or was cancelled
pub fn join_error_message(error: JoinError) -> String {
    if error.is_panic() {
        format!("panicked: {}", panic_payload(error.into_panic()))
    } else {
        "task was cancelled".to_string()
    }
}

fn panic_payload(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Equality;
    use serde_json::json;

    fn run(steps: Vec<Step>) -> Result<(), UnitFailure> {
        tokio_test::block_on(run_body(steps, Arc::new(Registry::with_builtins())))
    }

    #[test]
    fn test_true_is_true() {
        assert_eq!(run(vec![Step::AssertTrue(true)]), Ok(()));
    }

    #[test]
    fn test_empty_body_passes() {
        assert_eq!(run(Vec::new()), Ok(()));
    }

    #[test]
    fn test_assertions() {
        assert!(matches!(
            run(vec![Step::AssertTrue(false)]),
            Err(UnitFailure::Assertion(_))
        ));
        assert!(matches!(
            run(vec![Step::AssertFalse(true)]),
            Err(UnitFailure::Assertion(_))
        ));
        assert_eq!(
            run(vec![Step::AssertEquals(Equality {
                expected: json!(1),
                actual: json!("1"),
            })]),
            Err(UnitFailure::Assertion(
                "expected:<1> but was:<\"1\">".to_string()
            ))
        );
    }

    #[test]
    fn test_first_failure_stops_body() {
        let result = run(vec![
            Step::Fail("first".to_string()),
            Step::Raise("second".to_string()),
        ]);
        assert_eq!(result, Err(UnitFailure::Assertion("first".to_string())));
    }

    #[test]
    fn test_raise_is_fault() {
        assert_eq!(
            run(vec![Step::Raise("boom".to_string())]),
            Err(UnitFailure::Fault("boom".to_string()))
        );
    }

    #[tokio::test]
    async fn test_unknown_builtin_is_fault() {
        let result = run_body(
            vec![Step::Builtin("nope".to_string())],
            Arc::new(Registry::empty()),
        )
        .await;
        assert_eq!(
            result,
            Err(UnitFailure::Fault("unknown builtin: nope".to_string()))
        );
    }

    #[tokio::test]
    async fn test_panicking_builtin_is_fault() {
        fn explode() -> Result<(), UnitFailure> {
            panic!("kaboom")
        }
        let mut registry = Registry::empty();
        registry.register("explode", explode);

        let result = run_body(vec![Step::Builtin("explode".to_string())], Arc::new(registry)).await;
        assert_eq!(result, Err(UnitFailure::Fault("panicked: kaboom".to_string())));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_command_exit_codes() {
        let ok = Command {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "exit 3".to_string()],
            expect_code: 3,
        };
        assert_eq!(run_command(&ok).await, Ok(()));

        let bad = Command {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "echo oops >&2; exit 1".to_string()],
            expect_code: 0,
        };
        assert_eq!(
            run_command(&bad).await,
            Err(UnitFailure::Assertion(
                "sh exited with code 1, expected 0: oops".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_fault() {
        let missing = Command {
            program: "definitely-not-a-real-program-xyz".to_string(),
            args: Vec::new(),
            expect_code: 0,
        };
        assert!(matches!(
            run_command(&missing).await,
            Err(UnitFailure::Fault(_))
        ));
    }
}
