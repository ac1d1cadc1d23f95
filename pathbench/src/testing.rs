//! In-memory probe client for sampler and orchestrator tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use pathbench_core::series::Measurement;

use crate::probe::{Endpoint, ProbeClient, ProbeError, ProbeFailure};

/// Replays scripted round-trip times per endpoint label.
///
/// Inner latency is reported as a tenth of the round trip. Endpoints without a
/// script answer 1 ms.
#[derive(Default)]
pub(crate) struct ScriptedClient {
    round_trips: HashMap<String, Vec<f64>>,
    fail_at: Option<(String, usize)>,
    delay: Option<Duration>,
    calls: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_round_trips(mut self, label: &str, values: Vec<f64>) -> Self {
        self.round_trips.insert(label.to_string(), values);
        self
    }

    /// Make the `call_index`-th (zero-based) call to `label` fail with a 500.
    pub(crate) fn failing_at(mut self, label: &str, call_index: usize) -> Self {
        self.fail_at = Some((label.to_string(), call_index));
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self, label: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(label)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_call(&self, label: &str) -> usize {
        let mut calls = self.calls.lock().unwrap();
        let count = calls.entry(label.to_string()).or_insert(0);
        let index = *count;
        *count += 1;
        index
    }
}

#[async_trait]
impl ProbeClient for ScriptedClient {
    async fn probe(&self, endpoint: &Endpoint) -> Result<Measurement, ProbeError> {
        let index = self.next_call(&endpoint.label);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some((label, at)) = &self.fail_at {
            if *label == endpoint.label && *at == index {
                return Err(ProbeError::new(
                    endpoint,
                    ProbeFailure::Status {
                        status: 500,
                        message: "scripted failure".to_string(),
                    },
                ));
            }
        }

        let round_trip = self
            .round_trips
            .get(&endpoint.label)
            .and_then(|values| values.get(index % values.len().max(1)))
            .copied()
            .unwrap_or(1.0);
        Ok(Measurement::new(round_trip, round_trip / 10.0))
    }
}
