//! Probe endpoint runtime for pathbench.
//!
//! A probe endpoint sits next to the backend whose latency is being measured.
//! Each `POST /probe` runs the configured [`Operation`] once to warm up any
//! connection state, then runs it again and reports how long that second call
//! took together with the total handler time.

mod server;

pub use server::{build_router, run_probe_server, serve};

use std::fmt;
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Errors that stop the probe server.
#[derive(Debug, Error)]
pub enum ProbeServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

type OperationFn = dyn Fn() -> Result<(), String> + Send + Sync;

/// The bounded backend operation a probe endpoint times.
///
/// The function runs on a blocking thread and should perform exactly one
/// round trip to the backend. An `Err` is reported to the caller as a 500.
#[derive(Clone)]
pub struct Operation {
    name: String,
    f: Arc<OperationFn>,
}

impl Operation {
    /// Wrap a function as a named operation.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let op = Operation::new("ping", || {
    ///     // ... one round trip to the backend ...
    ///     Ok(())
    /// });
    /// ```
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the operation once on the current thread.
    pub fn call(&self) -> Result<(), String> {
        (self.f)()
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation").field("name", &self.name).finish()
    }
}

/// Open and immediately close a TCP connection to `addr`.
///
/// The cheapest operation that still crosses the network path to the backend.
pub fn tcp_connect(addr: SocketAddr, timeout: Duration) -> Operation {
    Operation::new(format!("tcp-connect {addr}"), move || {
        TcpStream::connect_timeout(&addr, timeout)
            .map(drop)
            .map_err(|e| format!("connect to {addr} failed: {e}"))
    })
}
