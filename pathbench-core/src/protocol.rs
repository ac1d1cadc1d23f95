//! Wire types exchanged between the probe client and a probe endpoint.

use serde::{Deserialize, Serialize};

/// Health check response from a probe endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    /// Create a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// Success body returned by a probe endpoint.
///
/// Both values are milliseconds as measured by the endpoint itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResponse {
    /// Duration of the bounded backend operation.
    pub query_latency: f64,
    /// Duration of the whole handler, excluding the endpoint's own warm-up call.
    pub api_processing_time: f64,
}

impl ProbeResponse {
    pub fn new(query_latency: f64, api_processing_time: f64) -> Self {
        Self {
            query_latency,
            api_processing_time,
        }
    }

    /// Value for the `Server-Timing` response header.
    pub fn server_timing(&self) -> String {
        format!(
            "db;dur={:.2}, api;dur={:.2}",
            self.query_latency, self.api_processing_time
        )
    }
}

/// Failure body returned by a probe endpoint alongside a non-success status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeErrorResponse {
    pub error: String,
}

impl ProbeErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
