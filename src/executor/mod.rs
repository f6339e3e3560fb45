//! Test execution engine
//!
//! Provides sequential and parallel execution of discovered units.

mod body;
mod parallel;
mod registry;
mod runner;

pub use body::UnitFailure;
pub use parallel::ParallelExecutor;
pub use registry::Registry;
pub use runner::ExecutionRunner;
