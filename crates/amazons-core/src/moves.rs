//! Move type and its canonical key codec.
//!
//! A move is a queen slide plus an arrow shot, six coordinates total. The
//! canonical key `"sx,sy,ex,ey,ax,ay"` is the identity used by every count
//! mapping; encoding and decoding round-trip exactly.

use std::fmt;
use std::str::FromStr;

use crate::board::Board;
use crate::error::CoreError;

/// One fully-constructed move: source, destination, and arrow cell.
/// Immutable once built; raw log coordinates are validated at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub start_x: u8,
    pub start_y: u8,
    pub end_x: u8,
    pub end_y: u8,
    pub arrow_x: u8,
    pub arrow_y: u8,
}

impl Move {
    /// Build a move from raw log coordinates, rejecting anything outside
    /// the board.
    pub fn new(coords: [i64; 6]) -> Result<Self, CoreError> {
        for pair in coords.chunks_exact(2) {
            if !Board::in_range(pair[0], pair[1]) {
                return Err(CoreError::OutOfRange {
                    x: pair[0],
                    y: pair[1],
                });
            }
        }
        Ok(Self {
            start_x: coords[0] as u8,
            start_y: coords[1] as u8,
            end_x: coords[2] as u8,
            end_y: coords[3] as u8,
            arrow_x: coords[4] as u8,
            arrow_y: coords[5] as u8,
        })
    }

    /// The canonical key of this move.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{}",
            self.start_x, self.start_y, self.end_x, self.end_y, self.arrow_x, self.arrow_y
        )
    }
}

impl FromStr for Move {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut coords = [0i64; 6];
        let mut parts = s.split(',');
        for slot in &mut coords {
            let part = parts
                .next()
                .ok_or_else(|| CoreError::KeyFormat(s.to_string()))?;
            *slot = part
                .trim()
                .parse()
                .map_err(|_| CoreError::KeyFormat(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(CoreError::KeyFormat(s.to_string()));
        }
        Move::new(coords).map_err(|_| CoreError::KeyFormat(s.to_string()))
    }
}
