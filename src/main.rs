mod aggregate;
mod config;
mod error;
mod normalize;
mod pipeline;
mod rank;
mod report;
mod review;
mod score;
mod trust;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::config::Config;
use crate::pipeline::TrustPipeline;
use crate::report::{OutputFormat, Reporter};

#[derive(Parser)]
#[command(name = "reviewer-trust", about = "Rank app reviewers by trust score", version)]
struct Cli {
    /// Cleaned or raw review export, one JSON object per line
    input: PathBuf,

    /// TOML config file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<String>,

    /// Number of reviewers shown in the leaderboard
    #[arg(short = 'k', long)]
    top: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reviewer_trust=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("reviewer-trust v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)?;
            info!("Config loaded from {}", path);
            config
        }
        None => Config::default(),
    };
    if let Some(k) = cli.top {
        config.leaderboard.top_k = k;
    }

    let pipeline = TrustPipeline::new(&config)?;
    let batch = review::load_jsonl(&cli.input)?;
    let report = pipeline.run(&batch.reviews)?;

    let output = Reporter::new(&config).render(&report, cli.format)?;
    print!("{}", output);
    Ok(())
}
