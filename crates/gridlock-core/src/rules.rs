//! Scoring, levels, gravity intervals, and drop projections.

use std::time::Duration;

use crate::board::Board;
use crate::piece::Piece;

/// Base score per simultaneous line clear (index = lines cleared).
pub const LINE_BASE_SCORES: [u64; 5] = [0, 100, 300, 500, 800];

/// Score awarded for clearing `lines` at `level`:
/// `base × (level + 1)`.
pub fn score_for_clear(lines: u32, level: u32) -> u64 {
    let base = LINE_BASE_SCORES
        .get(lines as usize)
        .copied()
        .unwrap_or(LINE_BASE_SCORES[4]);
    base * (level as u64 + 1)
}

/// Hard-drop bonus: two points per row travelled.
pub fn hard_drop_bonus(distance: u32) -> u64 {
    distance as u64 * 2
}

/// Level derived from total lines cleared: one level per 10 lines.
pub fn level_for_lines(total_lines: u32) -> u32 {
    total_lines / 10
}

/// Gravity interval for a level, per the standard falling-speed curve
/// `(0.8 − (level−1)·0.007)^(level−1)` seconds, clamped to
/// `[50 ms, 1000 ms]`. Level 0 is a full second; level 29 and beyond
/// pin to the 50 ms floor.
pub fn drop_interval(level: u32) -> Duration {
    if level == 0 {
        return Duration::from_millis(1000);
    }
    if level >= 29 {
        return Duration::from_millis(50);
    }
    let n = (level - 1) as i32;
    let seconds = (0.8 - f64::from(n) * 0.007).powi(n);
    let ms = (seconds * 1000.0).clamp(50.0, 1000.0);
    Duration::from_millis(ms as u64)
}

/// The ghost projection: the piece translated to the maximal `y` that
/// still fits. Dropping a ghost again is a fixed point.
pub fn ghost(piece: &Piece, board: &Board) -> Piece {
    piece.translated(0, drop_distance(piece, board))
}

/// Drops the piece straight down and returns it with the distance
/// travelled (used for the hard-drop bonus).
pub fn hard_drop(piece: &Piece, board: &Board) -> (Piece, u32) {
    let distance = drop_distance(piece, board);
    (piece.translated(0, distance), distance as u32)
}

fn drop_distance(piece: &Piece, board: &Board) -> i32 {
    let mut distance = 0;
    while board.is_valid(piece, 0, distance + 1) {
        distance += 1;
    }
    distance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BOARD_HEIGHT, BOARD_WIDTH};
    use crate::piece::PieceType;

    #[test]
    fn test_score_for_clear_uses_standard_table() {
        assert_eq!(score_for_clear(0, 0), 0);
        assert_eq!(score_for_clear(1, 0), 100);
        assert_eq!(score_for_clear(2, 0), 300);
        assert_eq!(score_for_clear(3, 0), 500);
        assert_eq!(score_for_clear(4, 0), 800);
    }

    #[test]
    fn test_score_for_clear_scales_with_level() {
        assert_eq!(score_for_clear(1, 4), 500);
        assert_eq!(score_for_clear(4, 9), 8000);
    }

    #[test]
    fn test_hard_drop_bonus_is_two_per_row() {
        assert_eq!(hard_drop_bonus(0), 0);
        assert_eq!(hard_drop_bonus(18), 36);
    }

    #[test]
    fn test_level_for_lines_every_ten() {
        assert_eq!(level_for_lines(0), 0);
        assert_eq!(level_for_lines(9), 0);
        assert_eq!(level_for_lines(10), 1);
        assert_eq!(level_for_lines(95), 9);
    }

    #[test]
    fn test_drop_interval_boundaries() {
        assert_eq!(drop_interval(0), Duration::from_millis(1000));
        assert_eq!(drop_interval(1), Duration::from_millis(1000));
        assert_eq!(drop_interval(29), Duration::from_millis(50));
        assert_eq!(drop_interval(40), Duration::from_millis(50));
    }

    #[test]
    fn test_drop_interval_monotone_non_increasing() {
        let mut prev = drop_interval(0);
        for level in 1..40 {
            let current = drop_interval(level);
            assert!(
                current <= prev,
                "interval rose from {prev:?} to {current:?} at level {level}"
            );
            prev = current;
        }
    }

    #[test]
    fn test_drop_interval_known_points() {
        // (0.793)^1 ≈ 0.793 s and (0.786)^2 ≈ 0.6178 s.
        assert_eq!(drop_interval(2), Duration::from_millis(793));
        assert_eq!(drop_interval(3), Duration::from_millis(617));
    }

    #[test]
    fn test_ghost_lands_on_floor_of_empty_board() {
        let board = Board::empty();
        let piece = Piece::spawn(PieceType::O);
        let g = ghost(&piece, &board);
        // O occupies frame rows 0..=1, so it rests at y = 18.
        assert_eq!(g.position.y, 18);
        assert!(board.is_valid(&g, 0, 0));
    }

    #[test]
    fn test_ghost_is_idempotent() {
        let mut rows = [[0u8; BOARD_WIDTH]; BOARD_HEIGHT];
        rows[15][4] = 1;
        let board = Board::from_rows(rows);
        for kind in PieceType::ALL {
            let piece = Piece::spawn(kind);
            let once = ghost(&piece, &board);
            assert_eq!(ghost(&once, &board), once, "{kind}");
        }
    }

    #[test]
    fn test_hard_drop_distance_matches_ghost() {
        let board = Board::empty();
        let piece = Piece::spawn(PieceType::T);
        let (dropped, distance) = hard_drop(&piece, &board);
        assert_eq!(dropped, ghost(&piece, &board));
        assert_eq!(
            dropped.position.y - piece.position.y,
            distance as i32
        );
    }

    #[test]
    fn test_hard_drop_on_obstruction_stops_above_it() {
        let mut rows = [[0u8; BOARD_WIDTH]; BOARD_HEIGHT];
        for x in 0..BOARD_WIDTH {
            rows[19][x] = 1;
        }
        let board = Board::from_rows(rows);
        let (dropped, _) = hard_drop(&Piece::spawn(PieceType::O), &board);
        assert_eq!(dropped.position.y, 17);
    }
}
