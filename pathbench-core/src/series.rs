//! Samples collected during a run, grouped into rounds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies which of the two compared endpoints a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    /// The opposite side of the comparison.
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// A measured quantity of each sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Wall-clock duration of the whole probe call, as seen by the caller.
    RoundTrip,
    /// Duration the endpoint reports for its own backend operation.
    InnerLatency,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::InnerLatency, Metric::RoundTrip];

    pub fn label(self) -> &'static str {
        match self {
            Metric::RoundTrip => "Round-trip time",
            Metric::InnerLatency => "Server <-> backend",
        }
    }
}

/// Timings produced by a single probe call, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub round_trip_ms: f64,
    pub inner_latency_ms: f64,
}

impl Measurement {
    pub fn new(round_trip_ms: f64, inner_latency_ms: f64) -> Self {
        Self {
            round_trip_ms,
            inner_latency_ms,
        }
    }
}

/// One probe result tagged with the endpoint that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub side: Side,
    pub round_trip_ms: f64,
    pub inner_latency_ms: f64,
}

impl Sample {
    pub fn new(side: Side, measurement: Measurement) -> Self {
        Self {
            side,
            round_trip_ms: measurement.round_trip_ms,
            inner_latency_ms: measurement.inner_latency_ms,
        }
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::RoundTrip => self.round_trip_ms,
            Metric::InnerLatency => self.inner_latency_ms,
        }
    }
}

/// The paired samples of one round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    /// Zero-based position of the round in issuance order.
    pub round_index: usize,
    pub sample_a: Sample,
    pub sample_b: Sample,
}

impl RoundResult {
    pub fn sample(&self, side: Side) -> &Sample {
        match side {
            Side::A => &self.sample_a,
            Side::B => &self.sample_b,
        }
    }
}

/// Rounds in the order they were issued.
///
/// Rounds can only be appended, and always as a complete A/B pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencySeries {
    rounds: Vec<RoundResult>,
}

impl LatencySeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(rounds: usize) -> Self {
        Self {
            rounds: Vec::with_capacity(rounds),
        }
    }

    /// Append the next round, numbered after the rounds already present.
    pub fn push_round(&mut self, a: Measurement, b: Measurement) -> &RoundResult {
        let round_index = self.next_round_index();
        self.rounds.push(RoundResult {
            round_index,
            sample_a: Sample::new(Side::A, a),
            sample_b: Sample::new(Side::B, b),
        });
        &self.rounds[self.rounds.len() - 1]
    }

    fn next_round_index(&self) -> usize {
        self.rounds.last().map_or(0, |r| r.round_index + 1)
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn rounds(&self) -> &[RoundResult] {
        &self.rounds
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoundResult> {
        self.rounds.iter()
    }

    /// Drop the first (warm-up) round.
    ///
    /// Returns an empty series when there is at most one round.
    pub fn trim_warmup(&self) -> LatencySeries {
        self.skip_rounds(1)
    }

    /// Drop the first `count` rounds, keeping the original round indices.
    pub fn skip_rounds(&self, count: usize) -> LatencySeries {
        LatencySeries {
            rounds: self.rounds.iter().skip(count).copied().collect(),
        }
    }

    /// The values of one metric for one side, in round order.
    pub fn values(&self, side: Side, metric: Metric) -> Vec<f64> {
        self.rounds
            .iter()
            .map(|round| round.sample(side).value(metric))
            .collect()
    }
}

impl<'a> IntoIterator for &'a LatencySeries {
    type Item = &'a RoundResult;
    type IntoIter = std::slice::Iter<'a, RoundResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.rounds.iter()
    }
}
