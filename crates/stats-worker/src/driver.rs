//! Parallel reduce over match files.
//!
//! Fan-out: each file is replayed on its own blocking task, bounded by a
//! semaphore sized to the worker pool; every task owns a private
//! aggregator, so the hot path takes no locks. Fan-in: the driver folds
//! the returned aggregators with `merge`; merge is commutative, so
//! completion order does not matter. One bad file or record never cancels its
//! siblings; failures are tallied and reported in the batch summary.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use amazons_core::{CoreError, MatchRecord};
use amazons_stats::{replay_match, StatsAggregator};

use crate::config::WorkerConfig;
use crate::error::WorkerError;

/// Outcome of one file's map step.
pub struct FileStats {
    pub stats: StatsAggregator,
    pub matches: usize,
    pub malformed: usize,
    pub plies: usize,
}

/// End-of-batch tallies reported alongside the merged aggregator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub files_processed: usize,
    pub files_failed: usize,
    pub matches_replayed: usize,
    pub matches_skipped: usize,
    pub plies_counted: usize,
}

/// Every `.json` match file under the data directory, recursively, in
/// sorted order.
pub fn match_files(data_dir: &Path) -> Result<Vec<PathBuf>, WorkerError> {
    let pattern = format!("{}/**/*.json", data_dir.display());
    let mut files: Vec<PathBuf> = glob::glob(&pattern)?.filter_map(Result::ok).collect();
    files.sort();
    Ok(files)
}

/// Replay every record in one file into a private aggregator. Records that
/// fail to decode or replay are counted and skipped; they never poison the
/// rest of the file.
pub fn process_file(path: &Path, config: &WorkerConfig) -> Result<FileStats, WorkerError> {
    let raw = std::fs::read_to_string(path)?;
    let records: Vec<serde_json::Value> = serde_json::from_str(&raw)?;
    let options = config.replay_options();

    let mut stats = StatsAggregator::new();
    let mut matches = 0usize;
    let mut malformed = 0usize;
    let mut plies = 0usize;

    for (index, value) in records.into_iter().enumerate() {
        let record: MatchRecord = match serde_json::from_value(value) {
            Ok(record) => record,
            Err(e) => {
                warn!(file = %path.display(), index, error = %e, "Skipping undecodable record");
                malformed += 1;
                continue;
            }
        };
        match replay_match(&record, &config.schedule, &options) {
            Ok(replayed) => {
                stats.merge(replayed.stats);
                matches += 1;
                plies += replayed.plies;
            }
            // an impossible board state means replay and log disagree;
            // louder than ordinary malformed input
            Err(e @ CoreError::DataInconsistency(_)) => {
                error!(file = %path.display(), index, error = %e, "Skipping inconsistent match");
                malformed += 1;
            }
            Err(e) => {
                warn!(file = %path.display(), index, error = %e, "Skipping match");
                malformed += 1;
            }
        }
    }

    Ok(FileStats {
        stats,
        matches,
        malformed,
        plies,
    })
}

/// Run the full map-reduce batch: fan files out across the pool, fold the
/// per-file aggregators into one, and return it with the summary tallies.
pub async fn run_batch(
    config: &WorkerConfig,
) -> Result<(StatsAggregator, BatchSummary), WorkerError> {
    let files = match_files(&config.data_dir)?;
    info!(
        files = files.len(),
        workers = config.workers,
        "Starting aggregation batch"
    );

    let semaphore = Arc::new(Semaphore::new(config.workers));
    let mut handles = Vec::with_capacity(files.len());
    for path in files {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| WorkerError::Pool(e.to_string()))?;
        let task_config = config.clone();
        let task_path = path.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit; // hold the pool slot until done
            process_file(&task_path, &task_config)
        });
        handles.push((path, handle));
    }

    let mut global = StatsAggregator::new();
    let mut summary = BatchSummary::default();
    for (path, handle) in handles {
        match handle.await {
            Ok(Ok(file_stats)) => {
                debug!(
                    file = %path.display(),
                    matches = file_stats.matches,
                    skipped = file_stats.malformed,
                    "File aggregated"
                );
                summary.files_processed += 1;
                summary.matches_replayed += file_stats.matches;
                summary.matches_skipped += file_stats.malformed;
                summary.plies_counted += file_stats.plies;
                global.merge(file_stats.stats);
            }
            Ok(Err(e)) => {
                error!(file = %path.display(), error = %e, "File failed");
                summary.files_failed += 1;
            }
            Err(e) => {
                error!(file = %path.display(), error = %e, "Worker task died");
                summary.files_failed += 1;
            }
        }
    }

    info!(
        files_processed = summary.files_processed,
        files_failed = summary.files_failed,
        matches_replayed = summary.matches_replayed,
        matches_skipped = summary.matches_skipped,
        "Batch complete"
    );
    Ok((global, summary))
}
