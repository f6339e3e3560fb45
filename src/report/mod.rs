//! Result aggregation
//!
//! Turns streams of per-unit results into run summaries and repeat aggregates.

mod aggregate;
mod summary;

pub use aggregate::RepeatAggregate;
pub use summary::{ReportAggregator, RunSummary};
