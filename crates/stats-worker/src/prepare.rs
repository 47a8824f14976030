//! Dataset preparation.
//!
//! The single-pass conditioning stage run before aggregation. It drops
//! match records the statistics core should never see (non-bot
//! participants, truncated logs, errored plies) and strips transport noise
//! from the ones it keeps, then repartitions the survivors into
//! bounded-size part files.
//! Everything here works on raw `serde_json::Value`; this stage exists
//! precisely because its input does not yet conform to the typed model.

use std::collections::HashSet;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::driver::match_files;
use crate::error::WorkerError;

/// Transport fields stripped from kept entries.
const NOISE_FIELDS: [&str; 5] = ["memory", "time", "verdict", "debug", "keep_running"];

pub const DEFAULT_MIN_PLIES: usize = 20;
pub const DEFAULT_MAX_RECORDS_PER_FILE: usize = 200;
pub const OUTPUT_BASE_NAME: &str = "filtered_data";

#[derive(Clone, Debug)]
pub struct PrepareConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub workers: usize,

    /// Records whose log has at most this many entries are dropped.
    pub min_plies: usize,

    /// Maximum records per output part file.
    pub max_records_per_file: usize,

    /// Optional allow-list of bot ids; when present a record must field at
    /// least one of them.
    pub bot_ids: Option<HashSet<String>>,
}

impl PrepareConfig {
    pub fn new(input_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            input_dir,
            output_dir,
            workers: num_cpus::get(),
            min_plies: DEFAULT_MIN_PLIES,
            max_records_per_file: DEFAULT_MAX_RECORDS_PER_FILE,
            bot_ids: None,
        }
    }

    pub fn validate(&self) -> Result<(), WorkerError> {
        if self.workers == 0 {
            return Err(WorkerError::Config("worker count must be positive"));
        }
        if self.max_records_per_file == 0 {
            return Err(WorkerError::Config("records per file must be positive"));
        }
        if !self.input_dir.is_dir() {
            return Err(WorkerError::Config("input directory does not exist"));
        }
        Ok(())
    }
}

/// Load a one-id-per-line bot allow-list.
pub fn load_bot_ids(path: &Path) -> Result<HashSet<String>, WorkerError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn entry_has_error(entry: &Value) -> bool {
    match entry.get("output").and_then(|output| output.get("display")) {
        Some(Value::Object(display)) => display.contains_key("err"),
        Some(Value::String(display)) => display.contains("err"),
        _ => false,
    }
}

fn strip_noise(map: &mut serde_json::Map<String, Value>) {
    for field in NOISE_FIELDS {
        map.remove(field);
    }
}

/// Condition one record: `None` means dropped, `Some` is the cleaned
/// record ready for aggregation.
pub fn condition_record(record: Value, config: &PrepareConfig) -> Option<Value> {
    let mut obj = match record {
        Value::Object(map) => map,
        _ => return None,
    };
    obj.remove("initdata");

    if let Some(players) = obj.get("players").and_then(Value::as_array) {
        let all_bots = players
            .iter()
            .all(|player| player.get("type").and_then(Value::as_str) == Some("bot"));
        if !all_bots {
            return None;
        }
        if let Some(ids) = &config.bot_ids {
            let fielded = players
                .iter()
                .filter_map(|player| player.get("bot").and_then(Value::as_str))
                .any(|id| ids.contains(id));
            if !fielded {
                return None;
            }
        }
    }

    let log = match obj.remove("log") {
        Some(Value::Array(entries)) => entries,
        _ => return None,
    };
    if log.len() <= config.min_plies {
        return None;
    }
    if log.iter().any(entry_has_error) {
        return None;
    }

    let mut kept = Vec::with_capacity(log.len());
    for mut entry in log {
        let Some(entry_obj) = entry.as_object_mut() else {
            kept.push(entry);
            continue;
        };
        if entry_obj.contains_key("0") || entry_obj.contains_key("1") {
            for key in ["0", "1"] {
                if let Some(Value::Object(player)) = entry_obj.get_mut(key) {
                    strip_noise(player);
                }
            }
            kept.push(entry);
            continue;
        }
        let command = entry_obj
            .get("output")
            .and_then(|output| output.get("command"))
            .and_then(Value::as_str)
            .map(str::to_string);
        match command.as_deref() {
            Some("request") => continue,
            Some("finish") => {
                strip_noise(entry_obj);
                if let Some(Value::Object(output)) = entry_obj.get_mut("output") {
                    output.remove("display");
                }
                kept.push(entry);
            }
            _ => kept.push(entry),
        }
    }
    obj.insert("log".to_string(), Value::Array(kept));

    Some(Value::Object(obj))
}

/// Outcome of conditioning one input file.
pub struct PreparedFile {
    pub kept: Vec<Value>,
    pub dropped: usize,
}

pub fn prepare_file(path: &Path, config: &PrepareConfig) -> Result<PreparedFile, WorkerError> {
    let raw = std::fs::read_to_string(path)?;
    let records: Vec<Value> = serde_json::from_str(&raw)?;
    let total = records.len();
    let kept: Vec<Value> = records
        .into_iter()
        .filter_map(|record| condition_record(record, config))
        .collect();
    Ok(PreparedFile {
        dropped: total - kept.len(),
        kept,
    })
}

/// Split the surviving records into `<base>_part<k>.json` files of bounded
/// size.
pub fn write_parts(
    records: &[Value],
    output_dir: &Path,
    max_per_file: usize,
) -> Result<usize, WorkerError> {
    std::fs::create_dir_all(output_dir)?;
    let mut written = 0usize;
    for (index, chunk) in records.chunks(max_per_file).enumerate() {
        let path = output_dir.join(format!("{}_part{}.json", OUTPUT_BASE_NAME, index + 1));
        let mut out = BufWriter::new(std::fs::File::create(&path)?);
        serde_json::to_writer(&mut out, chunk)?;
        out.flush()?;
        info!(file = %path.display(), records = chunk.len(), "Wrote part file");
        written += 1;
    }
    Ok(written)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrepareSummary {
    pub files_processed: usize,
    pub files_failed: usize,
    pub records_kept: usize,
    pub records_dropped: usize,
    pub parts_written: usize,
}

/// Condition every input file (bounded fan-out, same shape as the
/// aggregation driver) and repartition the survivors.
pub async fn run(config: &PrepareConfig) -> Result<PrepareSummary, WorkerError> {
    let files = match_files(&config.input_dir)?;
    info!(
        files = files.len(),
        workers = config.workers,
        "Starting dataset preparation"
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
            let _permit = permit;
            prepare_file(&task_path, &task_config)
        });
        handles.push((path, handle));
    }

    let mut summary = PrepareSummary::default();
    let mut survivors = Vec::new();
    for (path, handle) in handles {
        match handle.await {
            Ok(Ok(prepared)) => {
                summary.files_processed += 1;
                summary.records_kept += prepared.kept.len();
                summary.records_dropped += prepared.dropped;
                survivors.extend(prepared.kept);
            }
            Ok(Err(e)) => {
                error!(file = %path.display(), error = %e, "Input file failed");
                summary.files_failed += 1;
            }
            Err(e) => {
                error!(file = %path.display(), error = %e, "Worker task died");
                summary.files_failed += 1;
            }
        }
    }

    summary.parts_written = write_parts(&survivors, &config.output_dir, config.max_records_per_file)?;
    info!(
        records_kept = summary.records_kept,
        records_dropped = summary.records_dropped,
        parts = summary.parts_written,
        "Preparation complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> PrepareConfig {
        PrepareConfig {
            input_dir: std::env::temp_dir(),
            output_dir: std::env::temp_dir(),
            workers: 1,
            min_plies: 2,
            max_records_per_file: 10,
            bot_ids: None,
        }
    }

    fn bot_players() -> Value {
        json!([
            { "type": "bot", "bot": "alpha" },
            { "type": "bot", "bot": "beta" }
        ])
    }

    #[test]
    fn test_drops_non_bot_records() {
        let record = json!({
            "players": [ { "type": "human" }, { "type": "bot", "bot": "x" } ],
            "log": [{}, {}, {}],
            "scores": [2, 0]
        });
        assert!(condition_record(record, &config()).is_none());
    }

    #[test]
    fn test_drops_short_logs() {
        let record = json!({
            "players": bot_players(),
            "log": [{}, {}],
            "scores": [2, 0]
        });
        assert!(condition_record(record, &config()).is_none());
    }

    #[test]
    fn test_drops_errored_records() {
        let record = json!({
            "players": bot_players(),
            "log": [
                {},
                { "output": { "display": { "err": "RE" } } },
                {}
            ],
            "scores": [2, 0]
        });
        assert!(condition_record(record, &config()).is_none());
    }

    #[test]
    fn test_respects_bot_allow_list() {
        let mut cfg = config();
        cfg.bot_ids = Some(["gamma".to_string()].into_iter().collect());
        let record = json!({
            "players": bot_players(),
            "log": [{}, {}, {}],
            "scores": [2, 0]
        });
        assert!(condition_record(record, &cfg).is_none());

        cfg.bot_ids = Some(["alpha".to_string()].into_iter().collect());
        let record = json!({
            "players": bot_players(),
            "log": [{}, {}, {}],
            "scores": [2, 0]
        });
        assert!(condition_record(record, &cfg).is_some());
    }

    #[test]
    fn test_strips_noise_and_request_entries() {
        let record = json!({
            "initdata": { "seed": 7 },
            "players": bot_players(),
            "log": [
                { "0": { "response": { "x0": 0 }, "time": 12, "memory": 900, "verdict": "OK" } },
                { "output": { "command": "request" } },
                { "1": { "response": { "x0": 1 }, "debug": "...", "keep_running": true } },
                { "output": { "command": "finish", "display": { "score": 2 } }, "time": 1 }
            ],
            "scores": [2, 0]
        });
        let cleaned = condition_record(record, &config()).unwrap();

        assert!(cleaned.get("initdata").is_none());
        let log = cleaned.get("log").unwrap().as_array().unwrap();
        assert_eq!(log.len(), 3); // request entry removed
        let first = log[0].get("0").unwrap();
        assert!(first.get("response").is_some());
        assert!(first.get("time").is_none());
        assert!(first.get("memory").is_none());
        let finish = log[2].get("output").unwrap();
        assert!(finish.get("display").is_none());
        assert_eq!(finish.get("command").unwrap(), "finish");
    }

    #[test]
    fn test_write_parts_bounds_file_size() {
        let records: Vec<Value> = (0..5).map(|i| json!({ "id": i })).collect();
        let dir = std::env::temp_dir().join(format!("amazons-parts-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let written = write_parts(&records, &dir, 2).unwrap();
        assert_eq!(written, 3);
        let part: Vec<Value> = serde_json::from_str(
            &std::fs::read_to_string(dir.join("filtered_data_part3.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(part.len(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
