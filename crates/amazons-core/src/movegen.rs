//! Legal move enumeration.
//!
//! A move is legal when the destination is reachable from the source along
//! one of the eight queen directions through empty cells, and the arrow is
//! reachable the same way from the destination once the source is vacated.
//! The moved amazon has left its source square, so an arrow may cross or
//! land on it. The vacate guard makes that cell passable for the arrow
//! pass and restores it afterwards.

use crate::board::{Board, Side, PIECES_PER_SIDE};
use crate::error::CoreError;
use crate::moves::Move;

/// The eight queen directions.
pub const DIRECTIONS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Enumerate every legal (source, destination, arrow) triple for a side.
///
/// Takes `&mut Board` for the internal vacate probe, but the board compares
/// equal before and after the call, so no mutation leaks out. A side with a
/// piece count other than four means the board and the log disagree, which
/// is a data-integrity failure rather than an empty result.
pub fn legal_moves(board: &mut Board, side: Side) -> Result<Vec<Move>, CoreError> {
    let pieces = board.pieces_of(side);
    if pieces.len() != PIECES_PER_SIDE {
        return Err(CoreError::DataInconsistency(format!(
            "{} has {} pieces, expected {}",
            side.name(),
            pieces.len(),
            PIECES_PER_SIDE
        )));
    }

    let mut moves = Vec::new();
    for &(px, py) in &pieces {
        let (sx, sy) = (px as i64, py as i64);
        let vacated = board.vacate(sx, sy)?;

        for &(dx, dy) in &DIRECTIONS {
            let (mut ex, mut ey) = (sx + dx, sy + dy);
            while vacated.is_occupiable(ex, ey) {
                // Arrow slides from the hypothetical destination. The ray
                // never revisits the destination itself, so the queen does
                // not block its own shot.
                for &(tx, ty) in &DIRECTIONS {
                    let (mut ax, mut ay) = (ex + tx, ey + ty);
                    while vacated.is_occupiable(ax, ay) {
                        moves.push(Move {
                            start_x: px,
                            start_y: py,
                            end_x: ex as u8,
                            end_y: ey as u8,
                            arrow_x: ax as u8,
                            arrow_y: ay as u8,
                        });
                        ax += tx;
                        ay += ty;
                    }
                }
                ex += dx;
                ey += dy;
            }
        }
        // guard drop restores the source cell before the next piece
    }

    Ok(moves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;
    use std::collections::HashSet;

    /// Independent re-check of one enumerated triple: straight-line slide
    /// through empty cells, with the source treated as vacated.
    fn is_clear_slide(board: &Board, from: (i64, i64), to: (i64, i64), vacated: (i64, i64)) -> bool {
        let (dx, dy) = ((to.0 - from.0).signum(), (to.1 - from.1).signum());
        if (dx, dy) == (0, 0) {
            return false;
        }
        let (ddx, ddy) = (to.0 - from.0, to.1 - from.1);
        // must be a queen line
        if ddx != 0 && ddy != 0 && ddx.abs() != ddy.abs() {
            return false;
        }
        let (mut x, mut y) = (from.0 + dx, from.1 + dy);
        loop {
            if !Board::in_range(x, y) {
                return false;
            }
            let empty = (x, y) == vacated || board.get(x, y).unwrap() == Cell::Empty;
            if !empty {
                return false;
            }
            if (x, y) == to {
                return true;
            }
            x += dx;
            y += dy;
        }
    }

    #[test]
    fn test_start_position_symmetry() {
        let mut board = Board::new();
        let black = legal_moves(&mut board, Side::Black).unwrap();
        let white = legal_moves(&mut board, Side::White).unwrap();
        assert!(!black.is_empty());
        assert_eq!(black.len(), white.len());
    }

    #[test]
    fn test_enumeration_is_repeatable_and_leak_free() {
        let mut board = Board::new();
        let before = board.clone();
        let first = legal_moves(&mut board, Side::Black).unwrap();
        let second = legal_moves(&mut board, Side::Black).unwrap();
        assert_eq!(first, second);
        assert_eq!(board, before);
    }

    #[test]
    fn test_every_move_verifies_independently() {
        let mut board = Board::new();
        let moves = legal_moves(&mut board, Side::Black).unwrap();

        let mut seen = HashSet::new();
        for mv in &moves {
            assert!(seen.insert(mv.key()), "duplicate move {}", mv.key());

            let src = (mv.start_x as i64, mv.start_y as i64);
            let dst = (mv.end_x as i64, mv.end_y as i64);
            let arr = (mv.arrow_x as i64, mv.arrow_y as i64);

            assert_eq!(board.get(src.0, src.1).unwrap(), Cell::Black);
            assert!(
                is_clear_slide(&board, src, dst, src),
                "unreachable destination in {}",
                mv.key()
            );
            assert!(
                is_clear_slide(&board, dst, arr, src),
                "unreachable arrow in {}",
                mv.key()
            );
        }
    }

    #[test]
    fn test_arrow_may_land_on_vacated_source() {
        let mut board = Board::new();
        let moves = legal_moves(&mut board, Side::Black).unwrap();
        // e.g. slide (0,2) -> (0,3) and shoot straight back onto (0,2)
        assert!(moves
            .iter()
            .any(|m| m.key() == "0,2,0,3,0,2"));
    }

    #[test]
    fn test_missing_piece_is_data_inconsistency() {
        let mut board = Board::new();
        // knock one black amazon off the board
        board.place_block(0, 2).unwrap();
        let err = legal_moves(&mut board, Side::Black).unwrap_err();
        assert!(matches!(err, CoreError::DataInconsistency(_)));
    }

    #[test]
    fn test_replay_progress_shrinks_nothing_unexpectedly() {
        // after one black move the board still enumerates cleanly for both
        let mut board = Board::new();
        board.move_piece(0, 2, 1, 3).unwrap();
        board.place_block(1, 4).unwrap();
        assert!(legal_moves(&mut board, Side::White).is_ok());
        assert!(legal_moves(&mut board, Side::Black).is_ok());
    }
}
