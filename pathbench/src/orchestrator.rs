//! Run orchestration for latency comparisons.
//!
//! The orchestrator drives the paired sampler, discards the warm-up rounds,
//! and turns what remains into a [`ComparisonReport`] with one
//! [`ComparisonResult`] per metric.

use pathbench_core::report::ComparisonReport;
use pathbench_core::series::{LatencySeries, Metric, Side};
use pathbench_core::stats::{ComparisonResult, Statistics, StatsError};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{validate_endpoints, validate_rounds, Config, ConfigError};
use crate::probe::{Endpoint, HttpProbeClient, ProbeClient};
use crate::sampler::{CancelHandle, PairedSampler, RoundError, SamplerError};

/// Errors that can occur during a comparison run.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The run was rejected before any probe was issued.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A probe failed; no partial result is produced.
    #[error(transparent)]
    Round(#[from] RoundError),

    /// Warm-up trimming left nothing to compute statistics from.
    #[error("No samples left after discarding {discarded} warm-up round(s) out of {rounds}")]
    InsufficientSamples { rounds: usize, discarded: usize },

    #[error("Statistics error: {0}")]
    Stats(#[from] StatsError),

    /// The HTTP client could not be built.
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// How a run ended when it did not fail.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(ComparisonReport),
    /// Cancellation was requested before all rounds were issued.
    Cancelled {
        completed_rounds: usize,
        total_rounds: usize,
    },
}

impl RunOutcome {
    /// The report, if the run completed.
    pub fn report(&self) -> Option<&ComparisonReport> {
        match self {
            RunOutcome::Completed(report) => Some(report),
            RunOutcome::Cancelled { .. } => None,
        }
    }
}

/// Orchestrator for comparing two endpoints.
///
/// Owns the probe client and both endpoints. Each call to [`Orchestrator::run`]
/// performs a fresh, independent run.
pub struct Orchestrator<P: ProbeClient> {
    client: P,
    endpoint_a: Endpoint,
    endpoint_b: Endpoint,
    /// Rounds issued per run, warm-up included.
    rounds: usize,
    /// Leading rounds discarded before statistics are computed.
    warmup_rounds: usize,
}

impl<P: ProbeClient> Orchestrator<P> {
    /// Create an orchestrator discarding a single warm-up round.
    ///
    /// # Errors
    ///
    /// Returns an error if `rounds` is zero or the endpoints are unusable.
    pub fn new(
        client: P,
        endpoint_a: Endpoint,
        endpoint_b: Endpoint,
        rounds: usize,
    ) -> Result<Self, ConfigError> {
        validate_rounds(rounds)?;
        validate_endpoints(&endpoint_a, &endpoint_b)?;

        Ok(Self {
            client,
            endpoint_a,
            endpoint_b,
            rounds,
            warmup_rounds: 1,
        })
    }

    /// Create an orchestrator from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn from_config(client: P, config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            client,
            config.endpoint(Side::A),
            config.endpoint(Side::B),
            config.run.rounds,
        )?
        .with_warmup_rounds(config.run.warmup_rounds))
    }

    pub fn with_warmup_rounds(mut self, warmup_rounds: usize) -> Self {
        self.warmup_rounds = warmup_rounds;
        self
    }

    pub fn endpoint(&self, side: Side) -> &Endpoint {
        match side {
            Side::A => &self.endpoint_a,
            Side::B => &self.endpoint_b,
        }
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn warmup_rounds(&self) -> usize {
        self.warmup_rounds
    }

    pub fn client(&self) -> &P {
        &self.client
    }

    /// Run the comparison.
    ///
    /// This method:
    /// 1. Collects all rounds, reporting progress after each one
    /// 2. Discards the warm-up rounds
    /// 3. Computes statistics for every metric on both sides
    /// 4. Compares the two sides metric by metric
    ///
    /// # Errors
    ///
    /// Returns an error on the first failed probe, or when no rounds remain
    /// after the warm-up rounds are discarded.
    pub async fn run<F>(
        &self,
        on_progress: F,
        cancel: &CancelHandle,
    ) -> Result<RunOutcome, OrchestratorError>
    where
        F: FnMut(usize, usize),
    {
        info!(
            a = %self.endpoint_a,
            b = %self.endpoint_b,
            rounds = self.rounds,
            "Starting comparison"
        );

        let sampler = PairedSampler::new(&self.client, &self.endpoint_a, &self.endpoint_b);
        let series = match sampler.run(self.rounds, on_progress, cancel).await {
            Ok(series) => series,
            Err(SamplerError::Round(e)) => {
                warn!(
                    round = e.round_number(),
                    endpoint = %e.endpoint,
                    "Probe failed, aborting run"
                );
                return Err(e.into());
            }
            Err(SamplerError::Cancelled {
                completed_rounds,
                total_rounds,
            }) => {
                warn!(completed_rounds, total_rounds, "Run cancelled");
                return Ok(RunOutcome::Cancelled {
                    completed_rounds,
                    total_rounds,
                });
            }
        };

        let trimmed = series.skip_rounds(self.warmup_rounds);
        if trimmed.is_empty() {
            return Err(OrchestratorError::InsufficientSamples {
                rounds: self.rounds,
                discarded: series.len(),
            });
        }

        let results = compare_series(&trimmed)?;
        for result in &results {
            match (result.winner, result.percent_diff) {
                (Some(side), Some(diff)) => info!(
                    metric = result.metric.label(),
                    winner = %self.endpoint(side).label,
                    percent_diff = diff,
                    "Metric compared"
                ),
                _ => info!(metric = result.metric.label(), "Metric compared, no winner"),
            }
        }

        Ok(RunOutcome::Completed(ComparisonReport {
            label_a: self.endpoint_a.label.clone(),
            label_b: self.endpoint_b.label.clone(),
            rounds: self.rounds,
            discarded_rounds: series.len() - trimmed.len(),
            series: trimmed,
            results,
        }))
    }
}

/// Compare both sides of `series` for every metric.
///
/// # Errors
///
/// Returns an error if the series is empty.
pub fn compare_series(series: &LatencySeries) -> Result<Vec<ComparisonResult>, StatsError> {
    Metric::ALL
        .iter()
        .map(|&metric| {
            let stats_a = Statistics::from_samples(&series.values(Side::A, metric))?;
            let stats_b = Statistics::from_samples(&series.values(Side::B, metric))?;
            Ok(ComparisonResult::new(metric, stats_a, stats_b))
        })
        .collect()
}

/// Run a comparison over HTTP using the endpoints and settings in `config`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the HTTP client cannot be
/// created, or the run fails.
pub async fn compare_endpoints<F>(
    config: &Config,
    on_progress: F,
    cancel: &CancelHandle,
) -> Result<RunOutcome, OrchestratorError>
where
    F: FnMut(usize, usize),
{
    config.validate()?;
    let client = HttpProbeClient::new(config.network.request_timeout(), &config.network.user_agent)
        .map_err(OrchestratorError::Client)?;
    let orchestrator = Orchestrator::from_config(client, config)?;
    orchestrator.run(on_progress, cancel).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeFailure;
    use crate::testing::ScriptedClient;
    use pathbench_core::stats::Statistic;

    fn endpoints() -> (Endpoint, Endpoint) {
        (
            Endpoint::new("private", "http://10.0.0.2/probe"),
            Endpoint::new("public", "https://example.com/probe"),
        )
    }

    fn completed(outcome: RunOutcome) -> ComparisonReport {
        match outcome {
            RunOutcome::Completed(report) => report,
            other => panic!("expected a completed run, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_end_to_end_comparison() {
        let (a, b) = endpoints();
        let client = ScriptedClient::new()
            .with_round_trips(
                "private",
                vec![100.0, 50.0, 52.0, 51.0, 49.0, 53.0, 50.0, 52.0, 51.0, 50.0, 49.0],
            )
            .with_round_trips("public", vec![5.0; 11]);
        let orchestrator = Orchestrator::new(client, a, b, 11).unwrap();

        let report = completed(
            orchestrator
                .run(|_, _| {}, &CancelHandle::new())
                .await
                .unwrap(),
        );

        assert_eq!(report.rounds, 11);
        assert_eq!(report.discarded_rounds, 1);
        assert_eq!(report.series.len(), 10);
        assert_eq!(report.series.rounds()[0].round_index, 1);

        let round_trip = report.result(Metric::RoundTrip).unwrap();
        assert!((round_trip.stats_a.mean - 50.7).abs() < 1e-9);
        assert_eq!(round_trip.stats_b.mean, 5.0);
        assert_eq!(round_trip.winner, Some(Side::B));
        let diff = round_trip.percent_diff.unwrap();
        assert!((diff - 90.138).abs() < 0.01);

        // Inner latency is a tenth of the round trip in the scripted client.
        let inner = report.result(Metric::InnerLatency).unwrap();
        assert_eq!(inner.winner, Some(Side::B));
        assert!((inner.stats_a.mean - 5.07).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_warmup_round_excluded_from_statistics() {
        let (a, b) = endpoints();
        // The outlier sits in the warm-up round only.
        let client = ScriptedClient::new()
            .with_round_trips("private", vec![1000.0, 10.0, 10.0, 10.0])
            .with_round_trips("public", vec![20.0, 20.0, 20.0, 20.0]);
        let orchestrator = Orchestrator::new(client, a, b, 4).unwrap();

        let report = completed(
            orchestrator
                .run(|_, _| {}, &CancelHandle::new())
                .await
                .unwrap(),
        );

        let round_trip = report.result(Metric::RoundTrip).unwrap();
        assert_eq!(round_trip.stats_a.count, 3);
        assert_eq!(round_trip.stats_a.p95, 10.0);
        assert_eq!(round_trip.winner, Some(Side::A));
        assert_eq!(round_trip.percent_diff, Some(50.0));
    }

    #[tokio::test]
    async fn test_identical_paths_have_no_winner() {
        let (a, b) = endpoints();
        let orchestrator = Orchestrator::new(ScriptedClient::new(), a, b, 5).unwrap();

        let report = completed(
            orchestrator
                .run(|_, _| {}, &CancelHandle::new())
                .await
                .unwrap(),
        );

        for result in &report.results {
            assert_eq!(result.winner, None);
            assert_eq!(result.percent_diff, None);
            for statistic in Statistic::ALL {
                assert_eq!(result.statistic(statistic).unwrap().winner, None);
            }
        }
    }

    #[tokio::test]
    async fn test_failure_in_round_seven_aborts_run() {
        let (a, b) = endpoints();
        let client = ScriptedClient::new().failing_at("public", 6);
        let orchestrator = Orchestrator::new(client, a, b, 11).unwrap();

        let mut progress = 0;
        let err = orchestrator
            .run(|_, _| progress += 1, &CancelHandle::new())
            .await
            .unwrap_err();

        match err {
            OrchestratorError::Round(e) => {
                assert_eq!(e.round_number(), 7);
                assert_eq!(e.endpoint, "public");
                assert!(matches!(e.cause, ProbeFailure::Status { status: 500, .. }));
            }
            other => panic!("expected round error, got {other:?}"),
        }
        assert_eq!(progress, 6);
        assert_eq!(orchestrator.client().calls("private"), 7);
    }

    #[tokio::test]
    async fn test_progress_reported_for_every_round() {
        let (a, b) = endpoints();
        let orchestrator = Orchestrator::new(ScriptedClient::new(), a, b, 11).unwrap();

        let mut seen = Vec::new();
        orchestrator
            .run(|current, total| seen.push((current, total)), &CancelHandle::new())
            .await
            .unwrap();

        assert_eq!(seen.len(), 11);
        assert_eq!(seen.first(), Some(&(1, 11)));
        assert_eq!(seen.last(), Some(&(11, 11)));
    }

    #[test]
    fn test_zero_rounds_rejected_before_probing() {
        let (a, b) = endpoints();
        let result = Orchestrator::new(ScriptedClient::new(), a, b, 0);

        let err = result.err().unwrap();
        assert!(err.reason.contains("at least 1"));
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let result = Orchestrator::new(
            ScriptedClient::new(),
            Endpoint::new("private", "ftp://10.0.0.2/probe"),
            Endpoint::new("public", "https://example.com/probe"),
            11,
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_single_round_leaves_no_samples() {
        let (a, b) = endpoints();
        let orchestrator = Orchestrator::new(ScriptedClient::new(), a, b, 1).unwrap();

        let err = orchestrator
            .run(|_, _| {}, &CancelHandle::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrchestratorError::InsufficientSamples {
                rounds: 1,
                discarded: 1
            }
        ));
        // The round was still issued.
        assert_eq!(orchestrator.client().calls("private"), 1);
    }

    #[tokio::test]
    async fn test_custom_warmup_rounds() {
        let (a, b) = endpoints();
        let orchestrator = Orchestrator::new(ScriptedClient::new(), a, b, 10)
            .unwrap()
            .with_warmup_rounds(3);

        let report = completed(
            orchestrator
                .run(|_, _| {}, &CancelHandle::new())
                .await
                .unwrap(),
        );

        assert_eq!(report.discarded_rounds, 3);
        assert_eq!(report.series.len(), 7);
    }

    #[tokio::test]
    async fn test_cancelled_run_is_not_an_error() {
        let (a, b) = endpoints();
        let orchestrator = Orchestrator::new(ScriptedClient::new(), a, b, 11).unwrap();
        let cancel = CancelHandle::new();

        let outcome = orchestrator
            .run(
                |current, _| {
                    if current == 2 {
                        cancel.cancel();
                    }
                },
                &cancel,
            )
            .await
            .unwrap();

        assert!(outcome.report().is_none());
        assert!(matches!(
            outcome,
            RunOutcome::Cancelled {
                completed_rounds: 2,
                total_rounds: 11
            }
        ));
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.run.rounds = 21;
        config.run.warmup_rounds = 2;

        let orchestrator = Orchestrator::from_config(ScriptedClient::new(), &config).unwrap();

        assert_eq!(orchestrator.rounds(), 21);
        assert_eq!(orchestrator.warmup_rounds(), 2);
        assert_eq!(orchestrator.endpoint(Side::A).label, "private");
        assert_eq!(orchestrator.endpoint(Side::B).label, "public");
    }

    #[test]
    fn test_orchestrator_error_display() {
        let err = OrchestratorError::InsufficientSamples {
            rounds: 1,
            discarded: 1,
        };
        assert_eq!(
            err.to_string(),
            "No samples left after discarding 1 warm-up round(s) out of 1"
        );

        let err = OrchestratorError::Config(ConfigError::new("bad"));
        assert_eq!(err.to_string(), "Invalid configuration: bad");
    }
}
