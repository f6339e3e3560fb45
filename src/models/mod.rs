//! Data models for test discovery and execution
//!
//! This module contains the unit and result structures shared by every stage.

mod test_result;
mod unit;

pub use test_result::{Outcome, TestResult};
pub use unit::{Command, Equality, SizeCategory, Step, TestUnit};
