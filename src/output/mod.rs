//! Output formatting module
//!
//! Renders runs to stdout and exports them to files.

mod export;
mod formatter;

pub use export::write_report;
pub use formatter::{OutputFormat, ResultFormatter};
