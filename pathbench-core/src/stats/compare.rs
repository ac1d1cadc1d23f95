use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Statistic, Statistics};
use crate::series::{Metric, Side};

/// Errors raised when comparing two statistic values.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CompareError {
    /// The reference value is zero, so a relative difference does not exist.
    #[error("percent difference is undefined against a zero reference value (mine = {mine})")]
    ZeroReference { mine: f64 },
}

/// Relative improvement of `mine` over `theirs`, in percent of `theirs`.
///
/// Positive when `mine` is smaller (faster).
pub fn percent_diff(mine: f64, theirs: f64) -> Result<f64, CompareError> {
    if theirs == 0.0 {
        return Err(CompareError::ZeroReference { mine });
    }
    Ok((theirs - mine) / theirs * 100.0)
}

/// Whether `mine` beats `theirs`. Strict: a tie is never a win.
pub fn is_winner(mine: f64, theirs: f64) -> bool {
    mine < theirs
}

/// Outcome of comparing one value against its counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueComparison {
    pub mine: f64,
    pub theirs: f64,
    pub is_winner: bool,
    /// `None` when `theirs` is zero.
    pub percent_diff: Option<f64>,
}

impl ValueComparison {
    pub fn new(mine: f64, theirs: f64) -> Self {
        Self {
            mine,
            theirs,
            is_winner: is_winner(mine, theirs),
            percent_diff: percent_diff(mine, theirs).ok(),
        }
    }
}

/// One statistic of one metric, compared across both sides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatComparison {
    pub statistic: Statistic,
    pub value_a: f64,
    pub value_b: f64,
    /// `None` on a tie.
    pub winner: Option<Side>,
    /// How much faster the winner is, relative to the loser. `None` on a tie.
    pub percent_diff: Option<f64>,
}

impl StatComparison {
    pub fn new(statistic: Statistic, value_a: f64, value_b: f64) -> Self {
        let from_a = ValueComparison::new(value_a, value_b);
        let from_b = ValueComparison::new(value_b, value_a);

        let (winner, percent_diff) = if from_a.is_winner {
            (Some(Side::A), from_a.percent_diff)
        } else if from_b.is_winner {
            (Some(Side::B), from_b.percent_diff)
        } else {
            (None, None)
        };

        Self {
            statistic,
            value_a,
            value_b,
            winner,
            percent_diff,
        }
    }

    /// The comparison from one side's point of view.
    pub fn view(&self, side: Side) -> ValueComparison {
        match side {
            Side::A => ValueComparison::new(self.value_a, self.value_b),
            Side::B => ValueComparison::new(self.value_b, self.value_a),
        }
    }
}

/// Comparison of both sides over one metric.
///
/// The headline `winner` and `percent_diff` follow the mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub metric: Metric,
    pub stats_a: Statistics,
    pub stats_b: Statistics,
    pub winner: Option<Side>,
    pub percent_diff: Option<f64>,
    pub statistics: Vec<StatComparison>,
}

impl ComparisonResult {
    pub fn new(metric: Metric, stats_a: Statistics, stats_b: Statistics) -> Self {
        let statistics: Vec<StatComparison> = Statistic::ALL
            .iter()
            .map(|&s| StatComparison::new(s, stats_a.get(s), stats_b.get(s)))
            .collect();
        let headline = StatComparison::new(Statistic::Mean, stats_a.mean, stats_b.mean);

        Self {
            metric,
            stats_a,
            stats_b,
            winner: headline.winner,
            percent_diff: headline.percent_diff,
            statistics,
        }
    }

    pub fn stats(&self, side: Side) -> &Statistics {
        match side {
            Side::A => &self.stats_a,
            Side::B => &self.stats_b,
        }
    }

    pub fn statistic(&self, statistic: Statistic) -> Option<&StatComparison> {
        self.statistics.iter().find(|c| c.statistic == statistic)
    }
}
