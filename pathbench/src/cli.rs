//! Command-line interface for pathbench.

use crate::config::{Config, DEFAULT_CONFIG_FILE};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "pathbench")]
#[command(about = "Compare the latency of two network paths to the same backend operation")]
#[command(version)]
pub struct Cli {
    /// URL of the first probe endpoint
    #[arg(long)]
    pub endpoint_a: Option<String>,

    /// URL of the second probe endpoint
    #[arg(long)]
    pub endpoint_b: Option<String>,

    /// Label shown for the first endpoint
    #[arg(long)]
    pub label_a: Option<String>,

    /// Label shown for the second endpoint
    #[arg(long)]
    pub label_b: Option<String>,

    /// Number of rounds to run, warm-up included
    #[arg(short, long)]
    pub rounds: Option<usize>,

    /// Number of leading rounds discarded as warm-up
    #[arg(long)]
    pub warmup_rounds: Option<usize>,

    /// Timeout for a single probe request, in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Path to config file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Apply CLI overrides to the configuration.
    ///
    /// CLI arguments take precedence over config file values.
    /// Only non-None optional values will override the config.
    pub fn apply_to_config(&self, config: &mut Config) {
        if let Some(url) = &self.endpoint_a {
            config.endpoints.a.url = url.clone();
        }
        if let Some(url) = &self.endpoint_b {
            config.endpoints.b.url = url.clone();
        }
        if let Some(label) = &self.label_a {
            config.endpoints.a.label = label.clone();
        }
        if let Some(label) = &self.label_b {
            config.endpoints.b.label = label.clone();
        }

        if let Some(rounds) = self.rounds {
            config.run.rounds = rounds;
        }

        if let Some(warmup_rounds) = self.warmup_rounds {
            config.run.warmup_rounds = warmup_rounds;
        }

        if let Some(timeout_ms) = self.timeout_ms {
            config.network.request_timeout_ms = timeout_ms;
        }
    }
}
