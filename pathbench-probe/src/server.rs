//! HTTP server for the probe endpoint.
//!
//! Exposes `GET /health` and `POST /probe`. Probe responses are never cached
//! and carry a `Server-Timing` header mirroring the JSON body.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::{header::CACHE_CONTROL, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pathbench_core::protocol::{HealthResponse, ProbeErrorResponse, ProbeResponse};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::{Operation, ProbeServerError};

const SERVER_TIMING: HeaderName = HeaderName::from_static("server-timing");
const NO_STORE: &str = "no-store";

/// Shared state for the HTTP server.
struct AppState {
    operation: Operation,
}

/// Health check endpoint.
///
/// GET /health
/// Returns: { "status": "healthy" }
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Time one call of the operation.
///
/// POST /probe
/// Returns: { "queryLatency": ..., "apiProcessingTime": ... } or { "error": "..." }
async fn probe(State(state): State<Arc<AppState>>) -> Response {
    let operation = &state.operation;

    // Warm-up call, excluded from both timings.
    if let Err(error) = run_operation(operation).await {
        return failure(operation, error);
    }

    let handler_start = Instant::now();
    let query_start = Instant::now();
    let result = run_operation(operation).await;
    let query_latency = elapsed_ms(query_start);
    if let Err(error) = result {
        return failure(operation, error);
    }

    let body = ProbeResponse::new(query_latency, elapsed_ms(handler_start));
    debug!(
        operation = operation.name(),
        query_latency = body.query_latency,
        api_processing_time = body.api_processing_time,
        "Probe served"
    );

    (
        StatusCode::OK,
        [(CACHE_CONTROL, NO_STORE)],
        [(SERVER_TIMING, body.server_timing())],
        Json(body),
    )
        .into_response()
}

async fn run_operation(operation: &Operation) -> Result<(), String> {
    let operation = operation.clone();
    tokio::task::spawn_blocking(move || operation.call())
        .await
        .map_err(|e| format!("operation did not complete: {e}"))?
}

fn failure(operation: &Operation, error: String) -> Response {
    warn!(operation = operation.name(), %error, "Probe failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(CACHE_CONTROL, NO_STORE)],
        Json(ProbeErrorResponse::new(error)),
    )
        .into_response()
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1_000.0
}

/// Build the router with all endpoints.
pub fn build_router(operation: Operation) -> Router {
    let state = Arc::new(AppState { operation });
    Router::new()
        .route("/health", get(health))
        .route("/probe", post(probe))
        .with_state(state)
}

/// Serve probes on an already bound listener until `shutdown` resolves.
///
/// Use this when the caller picks the port, e.g. tests binding to port 0.
///
/// # Errors
///
/// Returns an error if the server encounters a runtime error.
pub async fn serve<S>(
    listener: TcpListener,
    operation: Operation,
    shutdown: S,
) -> Result<(), ProbeServerError>
where
    S: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, operation = operation.name(), "Probe endpoint listening");
    }

    axum::serve(listener, build_router(operation))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Probe endpoint stopped");
    Ok(())
}

/// Bind `addr` and serve probes until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the server fails to bind or encounters a runtime error.
pub async fn run_probe_server(addr: &str, operation: Operation) -> Result<(), ProbeServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ProbeServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;

    serve(listener, operation, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}
