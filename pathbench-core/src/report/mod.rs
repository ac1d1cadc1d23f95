use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::series::{LatencySeries, Metric, Side};
use crate::stats::ComparisonResult;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything a completed run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub label_a: String,
    pub label_b: String,
    /// Rounds issued, including the discarded warm-up rounds.
    pub rounds: usize,
    pub discarded_rounds: usize,
    /// The rounds the statistics were computed from.
    pub series: LatencySeries,
    /// One entry per compared metric.
    pub results: Vec<ComparisonResult>,
}

impl ComparisonReport {
    pub fn label(&self, side: Side) -> &str {
        match side {
            Side::A => &self.label_a,
            Side::B => &self.label_b,
        }
    }

    pub fn result(&self, metric: Metric) -> Option<&ComparisonResult> {
        self.results.iter().find(|r| r.metric == metric)
    }
}

pub trait Reporter: Send + Sync {
    fn report(&self, report: &ComparisonReport) -> Result<(), ReportError>;
}

mod json;
mod terminal;
pub use json::JsonReporter;
pub use terminal::TerminalReporter;
