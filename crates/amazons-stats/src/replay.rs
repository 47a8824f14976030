//! Match replay.
//!
//! Walks one recorded match ply by ply, classifies each move into its
//! (color, phase) bucket, and accumulates it. The final log entry carries
//! no response move by the recording convention and is never replayed.
//! Replay trusts the filtered log; an optional validation mode checks every
//! recorded move against the legal-move enumerator instead.

use amazons_core::match_data::WINNING_SCORE;
use amazons_core::{movegen, Board, CoreError, MatchRecord, Side};

use crate::aggregator::StatsAggregator;
use crate::phase::{PhaseSchedule, Scope};

#[derive(Clone, Copy, Debug)]
pub struct ReplayOptions {
    /// Score value that marks the winning side in `scores`.
    pub winning_score: i64,
    /// Check each recorded move against the enumerator before applying it.
    pub validate_legality: bool,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            winning_score: WINNING_SCORE,
            validate_legality: false,
        }
    }
}

/// The aggregator delta produced by one match.
#[derive(Debug, Default)]
pub struct ReplayedMatch {
    pub stats: StatsAggregator,
    pub plies: usize,
}

/// Replay one match into a fresh aggregator delta.
///
/// Returning a delta (rather than mutating a shared aggregator in place)
/// keeps a malformed record from leaving partial counts behind: the caller
/// merges the delta only on success.
pub fn replay_match(
    record: &MatchRecord,
    schedule: &PhaseSchedule,
    options: &ReplayOptions,
) -> Result<ReplayedMatch, CoreError> {
    let winner = record.winner(options.winning_score)?;
    let mut board = Board::new();
    let mut stats = StatsAggregator::new();
    let plies = record.counted_plies();

    for ply in 0..plies {
        let mover = Side::from_ply(ply);
        let mv = record.move_at(ply)?;

        if options.validate_legality {
            let legal = movegen::legal_moves(&mut board, mover)?;
            if !legal.contains(&mv) {
                return Err(CoreError::DataInconsistency(format!(
                    "recorded move {} at ply {ply} is not legal for {}",
                    mv.key(),
                    mover.name()
                )));
            }
        }

        let key = mv.key();
        let is_win = mover == winner;
        stats.accumulate(mover, schedule.classify(ply), &key, is_win);
        stats.accumulate(mover, Scope::Overall, &key, is_win);

        board.move_piece(
            mv.start_x as i64,
            mv.start_y as i64,
            mv.end_x as i64,
            mv.end_y as i64,
        )?;
        board.place_block(mv.arrow_x as i64, mv.arrow_y as i64)?;
    }

    Ok(ReplayedMatch { stats, plies })
}
