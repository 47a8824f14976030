//! Core domain model for Amazons match analysis.
//!
//! Holds the board simulator, the move type with its canonical key codec,
//! the legal-move enumerator, and the serde model of recorded match files.
//! Everything here is pure and I/O-free; the worker crate owns files and
//! concurrency.

pub mod board;
pub mod error;
pub mod match_data;
pub mod movegen;
pub mod moves;

pub use board::{Board, Cell, Side};
pub use error::CoreError;
pub use match_data::MatchRecord;
pub use moves::Move;
