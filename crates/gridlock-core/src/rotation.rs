//! SRS rotation with wall kicks.
//!
//! Kick offsets follow the standard SRS tables, expressed in board
//! coordinates (row 0 on top, so positive `dy` moves down). Offsets are
//! tried in table order for the `(from → to)` transition; the first
//! placement that fits wins.

use crate::board::Board;
use crate::error::CoreError;
use crate::piece::{Piece, PieceType};

/// Increments the piece's rotation, swapping in the rotated shape.
/// Performs no fit check — see [`rotate_with_wall_kick`].
pub fn rotate(piece: &Piece) -> Piece {
    Piece {
        rotation: (piece.rotation + 1) % 4,
        ..*piece
    }
}

/// Attempts a clockwise rotation against `board`.
///
/// Tries the naive rotation first, then each SRS kick offset for this
/// piece type and transition. The O piece has no kicks: if its naive
/// rotation (a no-op shape) doesn't fit, the rotation is blocked.
pub fn rotate_with_wall_kick(
    piece: &Piece,
    board: &Board,
) -> Result<Piece, CoreError> {
    let rotated = rotate(piece);
    for &(dx, dy) in kick_offsets(piece.kind, piece.rotation, rotated.rotation)
    {
        if board.is_valid(&rotated, dx, dy) {
            return Ok(rotated.translated(dx, dy));
        }
    }
    Err(CoreError::RotationBlocked)
}

// Transition index for the 8 clockwise/counter-clockwise pairs, in the
// conventional SRS ordering.
fn transition_index(from: u8, to: u8) -> usize {
    match (from % 4, to % 4) {
        (0, 1) => 0,
        (1, 0) => 1,
        (1, 2) => 2,
        (2, 1) => 3,
        (2, 3) => 4,
        (3, 2) => 5,
        (3, 0) => 6,
        (0, 3) => 7,
        _ => 0,
    }
}

// J, L, S, T, Z share one table; I has its own. Board coordinates:
// the guideline tables' upward kicks appear here with positive dy
// negated.
const JLSTZ_KICKS: [[(i32, i32); 5]; 8] = [
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],  // 0->1
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],    // 1->0
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],    // 1->2
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],  // 2->1
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],     // 2->3
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)], // 3->2
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)], // 3->0
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],     // 0->3
];

const I_KICKS: [[(i32, i32); 5]; 8] = [
    [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],  // 0->1
    [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],  // 1->0
    [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],  // 1->2
    [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],  // 2->1
    [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],  // 2->3
    [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],  // 3->2
    [(0, 0), (1, 0), (2, 0), (1, 2), (2, -1)],    // 3->0
    [(0, 0), (-1, 0), (-2, 0), (-1, -2), (-2, 1)], // 0->3
];

const O_KICKS: [(i32, i32); 1] = [(0, 0)];

/// The ordered kick offsets for a piece type and rotation transition.
pub(crate) fn kick_offsets(
    kind: PieceType,
    from: u8,
    to: u8,
) -> &'static [(i32, i32)] {
    match kind {
        PieceType::O => &O_KICKS,
        PieceType::I => &I_KICKS[transition_index(from, to)],
        _ => &JLSTZ_KICKS[transition_index(from, to)],
    }
}
