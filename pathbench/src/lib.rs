//! pathbench: paired latency comparison of two network paths
//!
//! This library probes two endpoints that run the same backend operation over
//! different network paths, one round at a time and both sides concurrently
//! within a round, then compares the resulting latency distributions.

pub mod cli;
pub mod config;
pub mod orchestrator;
pub mod probe;
pub mod sampler;

#[cfg(test)]
mod testing;

// Re-export core types for convenience
pub use pathbench_core::protocol;
pub use pathbench_core::report::{
    ComparisonReport, JsonReporter, ReportError, Reporter, TerminalReporter,
};
pub use pathbench_core::series::{LatencySeries, Measurement, Metric, Side};
pub use pathbench_core::stats::{ComparisonResult, Statistic, Statistics};

// Re-export main types from this crate
pub use cli::Cli;
pub use config::{Config, ConfigError};
pub use orchestrator::{compare_endpoints, Orchestrator, OrchestratorError, RunOutcome};
pub use probe::{Endpoint, HttpProbeClient, ProbeClient, ProbeError, ProbeFailure};
pub use sampler::{CancelHandle, PairedSampler, RoundError, SamplerError};
