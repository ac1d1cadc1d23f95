//! Timed calls to a single probe endpoint.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pathbench_core::protocol::{ProbeErrorResponse, ProbeResponse};
use pathbench_core::series::Measurement;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

/// A named probe endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Human readable name used in reports and errors.
    pub label: String,
    /// Full URL the probe request is sent to.
    pub url: String,
}

impl Endpoint {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.url)
    }
}

/// Why a single probe call failed.
#[derive(Debug, Error)]
pub enum ProbeFailure {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("endpoint answered {status}: {message}")]
    Status { status: u16, message: String },

    /// The success body did not have the expected shape.
    #[error("unparsable response body: {0}")]
    InvalidBody(#[source] serde_json::Error),
}

/// A probe call against `endpoint` failed.
#[derive(Debug, Error)]
#[error("probe of {endpoint} failed: {cause}")]
pub struct ProbeError {
    /// Label of the endpoint that failed.
    pub endpoint: String,
    #[source]
    pub cause: ProbeFailure,
}

impl ProbeError {
    pub fn new(endpoint: &Endpoint, cause: ProbeFailure) -> Self {
        Self {
            endpoint: endpoint.label.clone(),
            cause,
        }
    }
}

/// Performs exactly one call to an endpoint per invocation. Never retries.
#[async_trait]
pub trait ProbeClient: Send + Sync {
    async fn probe(&self, endpoint: &Endpoint) -> Result<Measurement, ProbeError>;
}

/// [`ProbeClient`] speaking the probe protocol over HTTP.
#[derive(Debug, Clone)]
pub struct HttpProbeClient {
    client: reqwest::Client,
}

impl HttpProbeClient {
    /// Create a client whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Message for a failed response, taken from its `{error}` body when present.
    fn failure_message(status: StatusCode, body: &[u8]) -> String {
        serde_json::from_slice::<ProbeErrorResponse>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            })
    }
}

#[async_trait]
impl ProbeClient for HttpProbeClient {
    async fn probe(&self, endpoint: &Endpoint) -> Result<Measurement, ProbeError> {
        let start = Instant::now();
        let response = self
            .client
            .post(&endpoint.url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| ProbeError::new(endpoint, ProbeFailure::Transport(e)))?;
        // The round trip ends when the response head arrives; reading the body is not timed.
        let round_trip = start.elapsed();

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ProbeError::new(endpoint, ProbeFailure::Transport(e)))?;

        if !status.is_success() {
            let message = Self::failure_message(status, &body);
            return Err(ProbeError::new(
                endpoint,
                ProbeFailure::Status {
                    status: status.as_u16(),
                    message,
                },
            ));
        }

        let parsed: ProbeResponse = serde_json::from_slice(&body)
            .map_err(|e| ProbeError::new(endpoint, ProbeFailure::InvalidBody(e)))?;

        let measurement = Measurement::new(
            round_trip.as_secs_f64() * 1_000.0,
            parsed.query_latency,
        );
        debug!(
            endpoint = %endpoint.label,
            round_trip_ms = measurement.round_trip_ms,
            inner_latency_ms = measurement.inner_latency_ms,
            "probe completed"
        );
        Ok(measurement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_display() {
        let endpoint = Endpoint::new("private", "http://10.0.0.2:8080/probe");
        assert_eq!(endpoint.to_string(), "private (http://10.0.0.2:8080/probe)");
    }

    #[test]
    fn test_failure_message_from_error_body() {
        let message = HttpProbeClient::failure_message(
            StatusCode::INTERNAL_SERVER_ERROR,
            br#"{"error": "connection refused"}"#,
        );
        assert_eq!(message, "connection refused");
    }

    #[test]
    fn test_failure_message_falls_back_to_status() {
        let message = HttpProbeClient::failure_message(StatusCode::BAD_GATEWAY, b"<html>");
        assert_eq!(message, "Bad Gateway");
    }

    #[test]
    fn test_probe_error_display() {
        let endpoint = Endpoint::new("public", "http://example.invalid/probe");
        let err = ProbeError::new(
            &endpoint,
            ProbeFailure::Status {
                status: 500,
                message: "timeout".to_string(),
            },
        );

        assert_eq!(err.endpoint, "public");
        assert_eq!(
            err.to_string(),
            "probe of public failed: endpoint answered 500: timeout"
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_failure() {
        let client = HttpProbeClient::new(Duration::from_secs(2), "pathbench-test").unwrap();
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let endpoint = Endpoint::new("closed", format!("http://127.0.0.1:{port}/probe"));

        let err = client.probe(&endpoint).await.unwrap_err();
        assert_eq!(err.endpoint, "closed");
        assert!(matches!(err.cause, ProbeFailure::Transport(_)));
    }
}
