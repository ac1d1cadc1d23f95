use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use pathbench_probe::{run_probe_server, tcp_connect};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pathbench-probe")]
#[command(about = "Probe endpoint timing a TCP connect to a backend")]
#[command(version)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 9200)]
    port: u16,

    /// Backend address (host:port) whose connect latency is measured
    #[arg(short, long)]
    target: String,

    /// Timeout for a single backend connect, in milliseconds
    #[arg(long, default_value_t = 5000)]
    connect_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pathbench_probe=info")),
        )
        .init();

    let target = tokio::net::lookup_host(&args.target)
        .await
        .with_context(|| format!("Failed to resolve target {}", args.target))?
        .next()
        .with_context(|| format!("Target {} resolved to no address", args.target))?;

    let operation = tcp_connect(target, Duration::from_millis(args.connect_timeout_ms));
    run_probe_server(&format!("{}:{}", args.bind, args.port), operation).await?;

    Ok(())
}
