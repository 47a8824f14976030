//! Dataset preparation entry point.
//!
//! Conditions raw match dumps for aggregation: unusable records are
//! dropped, transport noise is stripped, and the rest is repartitioned
//! into bounded-size files. Run this once over a fresh dump before
//! `stats-worker`.

use std::path::PathBuf;

use tracing::info;

use stats_worker::prepare::{self, PrepareConfig};

/// Parse `--input-dir`, `--out-dir`, `--workers`, `--min-plies`,
/// `--max-records` and `--bot-file` from the CLI args.
fn parse_args(config: &mut PrepareConfig) -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        match args[i].as_str() {
            "--input-dir" => {
                if let Some(value) = args.get(i + 1) {
                    config.input_dir = PathBuf::from(value);
                }
            }
            "--out-dir" => {
                if let Some(value) = args.get(i + 1) {
                    config.output_dir = PathBuf::from(value);
                }
            }
            "--workers" => {
                if let Some(value) = args.get(i + 1) {
                    config.workers = value.parse()?;
                }
            }
            "--min-plies" => {
                if let Some(value) = args.get(i + 1) {
                    config.min_plies = value.parse()?;
                }
            }
            "--max-records" => {
                if let Some(value) = args.get(i + 1) {
                    config.max_records_per_file = value.parse()?;
                }
            }
            "--bot-file" => {
                if let Some(value) = args.get(i + 1) {
                    config.bot_ids = Some(prepare::load_bot_ids(&PathBuf::from(value))?);
                }
            }
            _ => {}
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let _ = dotenvy::dotenv();

    let input_dir = std::env::var("AMAZONS_RAW_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));
    let output_dir = std::env::var("AMAZONS_PREPARED_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("prepared"));

    let mut config = PrepareConfig::new(input_dir, output_dir);
    parse_args(&mut config)?;
    config.validate()?;
    info!(
        input_dir = %config.input_dir.display(),
        output_dir = %config.output_dir.display(),
        workers = config.workers,
        min_plies = config.min_plies,
        "Preparation config loaded"
    );

    let summary = prepare::run(&config).await?;
    info!(
        files_processed = summary.files_processed,
        files_failed = summary.files_failed,
        records_kept = summary.records_kept,
        records_dropped = summary.records_dropped,
        parts_written = summary.parts_written,
        "Preparation finished"
    );
    Ok(())
}
