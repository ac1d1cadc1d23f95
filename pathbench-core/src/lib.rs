//! Core types and utilities for pathbench.
//!
//! This crate holds everything that does not touch the network: the wire
//! protocol shared with probe endpoints, the collected series and its warm-up
//! trimming, the statistics engine, the comparator and the reporters.

pub mod protocol;
pub mod report;
pub mod series;
pub mod stats;

// Re-export main types for convenience
pub use protocol::{HealthResponse, ProbeErrorResponse, ProbeResponse};
pub use report::{ComparisonReport, JsonReporter, ReportError, Reporter, TerminalReporter};
pub use series::{LatencySeries, Measurement, Metric, RoundResult, Sample, Side};
pub use stats::{
    is_winner, percent_diff, CompareError, ComparisonResult, StatComparison, Statistic,
    Statistics, StatsError, ValueComparison,
};
