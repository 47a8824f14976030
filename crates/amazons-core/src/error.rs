//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("coordinates ({x},{y}) are outside the board")]
    OutOfRange { x: i64, y: i64 },

    #[error("malformed match record: {0}")]
    MalformedRecord(String),

    #[error("board/log inconsistency: {0}")]
    DataInconsistency(String),

    #[error("invalid move key '{0}'")]
    KeyFormat(String),
}
