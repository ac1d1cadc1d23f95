//! Paired sampling: rounds of two concurrent probes, one per endpoint.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pathbench_core::series::{LatencySeries, Measurement};
use thiserror::Error;
use tracing::debug;

use crate::probe::{Endpoint, ProbeClient, ProbeError, ProbeFailure};

/// Upper bound on the rounds reserved up front; longer runs grow the series as they go.
const PREALLOCATED_ROUNDS: usize = 1024;

/// A probe failed during a round; the whole sampling run is abandoned.
#[derive(Debug, Error)]
#[error(
    "round {round} of {total_rounds} failed on {endpoint}: {cause}",
    round = .round_index + 1
)]
pub struct RoundError {
    /// Zero-based index of the failed round.
    pub round_index: usize,
    pub total_rounds: usize,
    /// Label of the endpoint whose probe failed.
    pub endpoint: String,
    #[source]
    pub cause: ProbeFailure,
}

impl RoundError {
    pub fn new(round_index: usize, total_rounds: usize, error: ProbeError) -> Self {
        Self {
            round_index,
            total_rounds,
            endpoint: error.endpoint,
            cause: error.cause,
        }
    }

    /// One-based round number, as shown in progress output.
    pub fn round_number(&self) -> usize {
        self.round_index + 1
    }
}

/// Why sampling stopped before producing a full series.
#[derive(Debug, Error)]
pub enum SamplerError {
    #[error(transparent)]
    Round(#[from] RoundError),

    /// Cancellation was requested; no further round was started.
    #[error("sampling cancelled after {completed_rounds} of {total_rounds} rounds")]
    Cancelled {
        completed_rounds: usize,
        total_rounds: usize,
    },
}

/// Requests that a run stops before its next round.
///
/// Clones share the same flag. Probes already in flight are allowed to finish.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Runs rounds strictly one after another, probing both endpoints concurrently
/// within each round.
pub struct PairedSampler<'a, P: ProbeClient> {
    client: &'a P,
    endpoint_a: &'a Endpoint,
    endpoint_b: &'a Endpoint,
}

impl<'a, P: ProbeClient> PairedSampler<'a, P> {
    pub fn new(client: &'a P, endpoint_a: &'a Endpoint, endpoint_b: &'a Endpoint) -> Self {
        Self {
            client,
            endpoint_a,
            endpoint_b,
        }
    }

    /// Collect `rounds` rounds.
    ///
    /// `on_progress(current, total)` is called after every completed round, with
    /// `current` counting up from 1. The first probe failure ends sampling and
    /// nothing collected so far is returned.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::Round`] on the first failed probe and
    /// [`SamplerError::Cancelled`] if `cancel` fires between rounds.
    pub async fn run<F>(
        &self,
        rounds: usize,
        mut on_progress: F,
        cancel: &CancelHandle,
    ) -> Result<LatencySeries, SamplerError>
    where
        F: FnMut(usize, usize),
    {
        let mut series = LatencySeries::with_capacity(rounds.min(PREALLOCATED_ROUNDS));

        for round_index in 0..rounds {
            if cancel.is_cancelled() {
                return Err(SamplerError::Cancelled {
                    completed_rounds: round_index,
                    total_rounds: rounds,
                });
            }

            // try_join drops the sibling probe as soon as one of them fails.
            let (a, b) = tokio::try_join!(
                self.probe(self.endpoint_a, round_index, rounds),
                self.probe(self.endpoint_b, round_index, rounds),
            )?;

            let round = series.push_round(a, b);
            debug!(
                round = round_index + 1,
                a_round_trip_ms = round.sample_a.round_trip_ms,
                b_round_trip_ms = round.sample_b.round_trip_ms,
                "round completed"
            );
            on_progress(round_index + 1, rounds);
        }

        Ok(series)
    }

    async fn probe(
        &self,
        endpoint: &Endpoint,
        round_index: usize,
        total_rounds: usize,
    ) -> Result<Measurement, RoundError> {
        self.client
            .probe(endpoint)
            .await
            .map_err(|e| RoundError::new(round_index, total_rounds, e))
    }
}
