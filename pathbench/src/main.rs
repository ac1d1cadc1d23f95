use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use pathbench::{
    CancelHandle, Cli, Config, HttpProbeClient, JsonReporter, Orchestrator, Reporter, RunOutcome,
    TerminalReporter,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Exit status used when the run is interrupted with Ctrl-C.
const EXIT_CANCELLED: i32 = 130;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "pathbench=debug"
    } else {
        "pathbench=info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Load config and apply CLI overrides
    let mut config = Config::load_or_default(Path::new(&cli.config))?;
    cli.apply_to_config(&mut config);
    debug!(?config, "Configuration loaded");

    let client = HttpProbeClient::new(config.network.request_timeout(), &config.network.user_agent)
        .context("Failed to create HTTP client")?;
    let orchestrator =
        Orchestrator::from_config(client, &config).context("Invalid configuration")?;

    let cancel = CancelHandle::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping after the current round");
                cancel.cancel();
            }
        });
    }

    let outcome = orchestrator
        .run(
            |current, total| info!("Running test ({current}/{total})..."),
            &cancel,
        )
        .await
        .context("Comparison failed")?;

    let report = match outcome {
        RunOutcome::Completed(report) => report,
        RunOutcome::Cancelled {
            completed_rounds,
            total_rounds,
        } => {
            warn!(
                "Cancelled after {completed_rounds} of {total_rounds} rounds, no report produced"
            );
            std::process::exit(EXIT_CANCELLED);
        }
    };

    let reporter: Box<dyn Reporter> = if cli.json {
        Box::new(JsonReporter::new())
    } else if cli.no_color {
        Box::new(TerminalReporter::without_colors())
    } else {
        Box::new(TerminalReporter::new())
    };
    reporter.report(&report)?;

    Ok(())
}
