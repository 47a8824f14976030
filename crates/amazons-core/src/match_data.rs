//! Serde model of recorded match files.
//!
//! A match file is a JSON array of records. Each record carries an ordered
//! `log` of per-ply entries, entry *i* keyed by the mover index string
//! (`"0"` for black, `"1"` for white) with a `response` block holding the
//! six move coordinates, and a `scores` pair from which the winner is
//! resolved. Records are deserialized one at a time so one malformed record
//! never poisons its file.

use serde::Deserialize;
use serde_json::Value;

use crate::board::Side;
use crate::error::CoreError;
use crate::moves::Move;

/// Score the platform awards to the winning bot.
pub const WINNING_SCORE: i64 = 2;

/// The six raw move coordinates of one ply response.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawMove {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

impl RawMove {
    pub fn to_move(self) -> Result<Move, CoreError> {
        Move::new([self.x0, self.y0, self.x1, self.y1, self.x2, self.y2])
    }
}

/// One recorded match. Log entries stay loosely typed (`Value`): entries
/// carry transport fields beyond the response and the final entry may have
/// no response at all; `move_at` extracts and validates per ply.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchRecord {
    pub log: Vec<Value>,
    pub scores: Vec<i64>,
}

impl MatchRecord {
    /// Number of plies that are statistically counted: the final log entry
    /// carries no response move and is never replayed.
    pub fn counted_plies(&self) -> usize {
        self.log.len().saturating_sub(1)
    }

    /// Resolve the winner from the scores pair: index 0 (black) wins iff
    /// its score equals the winning score.
    pub fn winner(&self, winning_score: i64) -> Result<Side, CoreError> {
        let first = *self
            .scores
            .first()
            .ok_or_else(|| CoreError::MalformedRecord("empty scores".into()))?;
        let index = if first == winning_score { 0 } else { 1 };
        Ok(Side::from_winner_index(index))
    }

    /// Extract the move recorded at a ply. Missing mover entry or response
    /// block makes the whole record malformed.
    pub fn move_at(&self, ply: usize) -> Result<Move, CoreError> {
        let entry = self
            .log
            .get(ply)
            .ok_or_else(|| CoreError::MalformedRecord(format!("no log entry at ply {ply}")))?;
        let mover = Side::from_ply(ply);
        let response = entry
            .get(mover.mover_key())
            .and_then(|player| player.get("response"))
            .ok_or_else(|| {
                CoreError::MalformedRecord(format!("ply {ply} has no response for the mover"))
            })?;
        let raw: RawMove = serde_json::from_value(response.clone()).map_err(|e| {
            CoreError::MalformedRecord(format!("ply {ply} response does not parse: {e}"))
        })?;
        raw.to_move()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> MatchRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_winner_from_scores() {
        let rec = record(json!({ "log": [], "scores": [2, 0] }));
        assert_eq!(rec.winner(WINNING_SCORE).unwrap(), Side::Black);

        let rec = record(json!({ "log": [], "scores": [0, 2] }));
        assert_eq!(rec.winner(WINNING_SCORE).unwrap(), Side::White);
    }

    #[test]
    fn test_winner_empty_scores_is_malformed() {
        let rec = record(json!({ "log": [], "scores": [] }));
        assert!(matches!(
            rec.winner(WINNING_SCORE),
            Err(CoreError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_move_at_extracts_mover_response() {
        let rec = record(json!({
            "log": [
                { "0": { "response": { "x0": 0, "y0": 2, "x1": 1, "y1": 3, "x2": 1, "y2": 4 } } },
                { "1": { "response": { "x0": 0, "y0": 5, "x1": 0, "y1": 4, "x2": 0, "y2": 3 } } }
            ],
            "scores": [2, 0]
        }));
        assert_eq!(rec.move_at(0).unwrap().key(), "0,2,1,3,1,4");
        assert_eq!(rec.move_at(1).unwrap().key(), "0,5,0,4,0,3");
    }

    #[test]
    fn test_move_at_wrong_mover_key_is_malformed() {
        // entry exists but is keyed by the wrong mover index
        let rec = record(json!({
            "log": [
                { "1": { "response": { "x0": 0, "y0": 2, "x1": 1, "y1": 3, "x2": 1, "y2": 4 } } }
            ],
            "scores": [2, 0]
        }));
        assert!(matches!(
            rec.move_at(0),
            Err(CoreError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_move_at_out_of_range_coordinates() {
        let rec = record(json!({
            "log": [
                { "0": { "response": { "x0": 0, "y0": 2, "x1": 1, "y1": 9, "x2": 1, "y2": 4 } } }
            ],
            "scores": [2, 0]
        }));
        assert!(rec.move_at(0).is_err());
    }

    #[test]
    fn test_counted_plies_excludes_final_entry() {
        let rec = record(json!({ "log": [{}, {}, {}], "scores": [2, 0] }));
        assert_eq!(rec.counted_plies(), 2);

        let rec = record(json!({ "log": [], "scores": [2, 0] }));
        assert_eq!(rec.counted_plies(), 0);
    }
}
