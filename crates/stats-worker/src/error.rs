//! Worker error types

use thiserror::Error;

use amazons_core::CoreError;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("configuration error: {0}")]
    Config(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("glob pattern error: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("worker pool error: {0}")]
    Pool(String),

    #[error("core error: {0}")]
    Core(#[from] CoreError),
}
