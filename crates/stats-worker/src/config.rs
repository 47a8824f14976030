//! Worker configuration from environment variables and CLI flags.
//!
//! Every setting has an `AMAZONS_*` environment variable (a `.env` file is
//! honored for local runs); the path and pool-size settings can also be
//! overridden on the command line. Validation is fail-fast: nothing is
//! processed with a bad configuration.

use std::env;
use std::path::PathBuf;

use amazons_core::match_data::WINNING_SCORE;
use amazons_stats::{PhaseSchedule, ReplayOptions};

use crate::error::WorkerError;

pub const DEFAULT_WORKERS: usize = 8;

#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Directory tree holding the match files.
    pub data_dir: PathBuf,

    /// Directory the CSV reports are written to.
    pub out_dir: PathBuf,

    /// Worker pool size for the fan-out phase.
    pub workers: usize,

    /// Phase boundaries used to classify plies.
    pub schedule: PhaseSchedule,

    /// Check every recorded move against the legal-move enumerator.
    pub validate_moves: bool,

    /// Also write the move-probability tables.
    pub write_probabilities: bool,

    /// Score value that marks the winning side in a record's `scores`.
    pub winning_score: i64,
}

/// Command-line overrides for the environment configuration.
#[derive(Clone, Debug, Default)]
pub struct CliOverrides {
    pub data_dir: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub workers: Option<usize>,
}

impl CliOverrides {
    /// Scan the args list for `--data-dir <path>`, `--out-dir <path>` and
    /// `--workers <n>`. Unknown flags are left for the caller to ignore.
    pub fn parse(args: &[String]) -> Self {
        let mut overrides = Self::default();
        for i in 0..args.len() {
            match args[i].as_str() {
                "--data-dir" => {
                    overrides.data_dir = args.get(i + 1).map(PathBuf::from);
                }
                "--out-dir" => {
                    overrides.out_dir = args.get(i + 1).map(PathBuf::from);
                }
                "--workers" => {
                    overrides.workers = args.get(i + 1).and_then(|v| v.parse().ok());
                }
                _ => {}
            }
        }
        overrides
    }
}

fn env_usize(name: &'static str, invalid: &'static str) -> Result<Option<usize>, WorkerError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| WorkerError::Config(invalid)),
        Err(_) => Ok(None),
    }
}

fn env_flag(name: &str) -> bool {
    matches!(
        env::var(name).ok().as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}

impl WorkerConfig {
    /// Load configuration from environment variables, applying CLI
    /// overrides on top.
    pub fn load(overrides: &CliOverrides) -> Result<Self, WorkerError> {
        let data_dir = overrides
            .data_dir
            .clone()
            .or_else(|| env::var("AMAZONS_DATA_DIR").ok().map(PathBuf::from))
            .ok_or(WorkerError::Config("AMAZONS_DATA_DIR not set"))?;

        let out_dir = overrides
            .out_dir
            .clone()
            .or_else(|| env::var("AMAZONS_OUT_DIR").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("result_csv"));

        let workers = match overrides.workers {
            Some(n) => n,
            None => env_usize("AMAZONS_WORKERS", "AMAZONS_WORKERS must be an integer")?
                .unwrap_or(DEFAULT_WORKERS),
        };

        let opening_max = env_usize(
            "AMAZONS_OPENING_MAX_PLY",
            "AMAZONS_OPENING_MAX_PLY must be an integer",
        )?
        .unwrap_or(PhaseSchedule::DEFAULT_OPENING_MAX);
        let middle_max = env_usize(
            "AMAZONS_MIDDLE_MAX_PLY",
            "AMAZONS_MIDDLE_MAX_PLY must be an integer",
        )?
        .unwrap_or(PhaseSchedule::DEFAULT_MIDDLE_MAX);
        let schedule = PhaseSchedule::new(opening_max, middle_max).map_err(WorkerError::Config)?;

        let winning_score = match env::var("AMAZONS_WINNING_SCORE") {
            Ok(value) => value
                .parse()
                .map_err(|_| WorkerError::Config("AMAZONS_WINNING_SCORE must be an integer"))?,
            Err(_) => WINNING_SCORE,
        };

        let config = Self {
            data_dir,
            out_dir,
            workers,
            schedule,
            validate_moves: env_flag("AMAZONS_VALIDATE_MOVES"),
            write_probabilities: env_flag("AMAZONS_WRITE_PROBABILITIES"),
            winning_score,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), WorkerError> {
        if self.workers == 0 {
            return Err(WorkerError::Config("worker count must be positive"));
        }
        if !self.data_dir.is_dir() {
            return Err(WorkerError::Config("data directory does not exist"));
        }
        Ok(())
    }

    pub fn replay_options(&self) -> ReplayOptions {
        ReplayOptions {
            winning_score: self.winning_score,
            validate_legality: self.validate_moves,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cli_overrides_parse() {
        let parsed = CliOverrides::parse(&args(&[
            "stats-worker",
            "--data-dir",
            "/data/matches",
            "--workers",
            "4",
        ]));
        assert_eq!(parsed.data_dir, Some(PathBuf::from("/data/matches")));
        assert_eq!(parsed.out_dir, None);
        assert_eq!(parsed.workers, Some(4));
    }

    #[test]
    fn test_cli_overrides_ignore_unknown_flags() {
        let parsed = CliOverrides::parse(&args(&["stats-worker", "--verbose", "--workers", "2"]));
        assert_eq!(parsed.workers, Some(2));
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let config = WorkerConfig {
            data_dir: std::env::temp_dir(),
            out_dir: PathBuf::from("out"),
            workers: 0,
            schedule: PhaseSchedule::default(),
            validate_moves: false,
            write_probabilities: false,
            winning_score: WINNING_SCORE,
        };
        assert!(matches!(config.validate(), Err(WorkerError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_missing_data_dir() {
        let config = WorkerConfig {
            data_dir: PathBuf::from("/definitely/not/a/real/path"),
            out_dir: PathBuf::from("out"),
            workers: 1,
            schedule: PhaseSchedule::default(),
            validate_moves: false,
            write_probabilities: false,
            winning_score: WINNING_SCORE,
        };
        assert!(matches!(config.validate(), Err(WorkerError::Config(_))));
    }
}
