//! Order statistics over latency samples.
//!
//! Every function here requires a non-empty input and reports
//! [`StatsError::EmptySample`] otherwise; no sentinel value is ever returned.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the statistics engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatsError {
    /// Statistics were requested over zero samples.
    #[error("cannot compute statistics over an empty sample")]
    EmptySample,
}

/// Percentile used for the tail statistic.
const TAIL_PERCENTILE: f64 = 0.95;

/// Summary of a non-empty sequence of samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub p95: f64,
}

/// The individual statistics a [`Statistics`] value carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    Mean,
    Median,
    P95,
}

impl Statistic {
    pub const ALL: [Statistic; 3] = [Statistic::Mean, Statistic::Median, Statistic::P95];

    pub fn label(self) -> &'static str {
        match self {
            Statistic::Mean => "Average",
            Statistic::Median => "Median",
            Statistic::P95 => "p95",
        }
    }
}

impl Statistics {
    /// Summarize `samples`, sorting a copy once for both order statistics.
    pub fn from_samples(samples: &[f64]) -> Result<Self, StatsError> {
        let sorted = sorted_copy(samples)?;
        Ok(Self {
            count: samples.len(),
            mean: mean(samples)?,
            median: median_of_sorted(&sorted),
            p95: percentile_of_sorted(&sorted, TAIL_PERCENTILE)?,
        })
    }

    pub fn get(&self, statistic: Statistic) -> f64 {
        match statistic {
            Statistic::Mean => self.mean,
            Statistic::Median => self.median,
            Statistic::P95 => self.p95,
        }
    }
}

/// Arithmetic mean.
pub fn mean(samples: &[f64]) -> Result<f64, StatsError> {
    if samples.is_empty() {
        return Err(StatsError::EmptySample);
    }
    Ok(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Middle value of the sorted samples; the average of the two middle values
/// for an even count.
pub fn median(samples: &[f64]) -> Result<f64, StatsError> {
    Ok(median_of_sorted(&sorted_copy(samples)?))
}

/// 95th percentile by the nearest-rank method.
pub fn p95(samples: &[f64]) -> Result<f64, StatsError> {
    percentile_of_sorted(&sorted_copy(samples)?, TAIL_PERCENTILE)
}

/// Index of the nearest-rank percentile `p` (0..=1) in a sorted slice of length `n`.
///
/// `ceil(n * p) - 1`, clamped into `[0, n - 1]`. `None` for an empty slice.
pub fn nearest_rank_index(n: usize, p: f64) -> Option<usize> {
    let last = n.checked_sub(1)?;
    let rank = (n as f64 * p).ceil() as usize;
    Some(rank.saturating_sub(1).min(last))
}

fn sorted_copy(samples: &[f64]) -> Result<Vec<f64>, StatsError> {
    if samples.is_empty() {
        return Err(StatsError::EmptySample);
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(sorted)
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    match sorted.len() % 2 {
        0 => (sorted[mid - 1] + sorted[mid]) / 2.0,
        _ => sorted[mid],
    }
}

fn percentile_of_sorted(sorted: &[f64], p: f64) -> Result<f64, StatsError> {
    nearest_rank_index(sorted.len(), p)
        .map(|index| sorted[index])
        .ok_or(StatsError::EmptySample)
}

mod compare;
pub use compare::{
    is_winner, percent_diff, CompareError, ComparisonResult, StatComparison, ValueComparison,
};
