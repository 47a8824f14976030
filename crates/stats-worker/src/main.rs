//! Amazons match statistics batch.
//!
//! Replays every recorded match under the data directory across a worker
//! pool and writes the per-color, per-phase win-rate (and optionally
//! move-probability) CSV reports.

use tracing::info;

use stats_worker::config::{CliOverrides, WorkerConfig};
use stats_worker::{driver, report};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load .env file for local runs
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().collect();
    let config = WorkerConfig::load(&CliOverrides::parse(&args))?;
    info!(
        data_dir = %config.data_dir.display(),
        out_dir = %config.out_dir.display(),
        workers = config.workers,
        validate_moves = config.validate_moves,
        "Config loaded"
    );

    let (stats, summary) = driver::run_batch(&config).await?;
    let reports = report::write_reports(&config.out_dir, &stats, config.write_probabilities)?;

    info!(
        files_processed = summary.files_processed,
        files_failed = summary.files_failed,
        matches_replayed = summary.matches_replayed,
        matches_skipped = summary.matches_skipped,
        plies_counted = summary.plies_counted,
        reports,
        "Batch finished"
    );
    Ok(())
}
