//! The playfield: a 10×20 grid of filled/empty cells.

use std::fmt;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::piece::{Piece, PieceType};

/// Board width in columns.
pub const BOARD_WIDTH: usize = 10;
/// Board height in rows. Row 0 is the top.
pub const BOARD_HEIGHT: usize = 20;

/// The playfield. Every cell is `0` (empty) or `1` (filled).
///
/// Serializes as a plain `int[20][10]` row-major array;
/// deserialization rejects anything that is not exactly 20×10 so a
/// client can never smuggle a malformed board into the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [[u8; BOARD_WIDTH]; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    /// An empty board.
    pub fn empty() -> Self {
        Self {
            cells: [[0; BOARD_WIDTH]; BOARD_HEIGHT],
        }
    }

    /// Builds a board from raw rows. Intended for tests and repair
    /// paths; rows must be exactly 20×10.
    pub fn from_rows(rows: [[u8; BOARD_WIDTH]; BOARD_HEIGHT]) -> Self {
        Self { cells: rows }
    }

    /// The raw cell value at `(x, y)`. Out-of-range reads return 0.
    pub fn cell(&self, x: i32, y: i32) -> u8 {
        if !(0..BOARD_WIDTH as i32).contains(&x)
            || !(0..BOARD_HEIGHT as i32).contains(&y)
        {
            return 0;
        }
        self.cells[y as usize][x as usize]
    }

    /// Row-major access to the underlying rows.
    pub fn rows(&self) -> &[[u8; BOARD_WIDTH]; BOARD_HEIGHT] {
        &self.cells
    }

    /// True when no cell is filled.
    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|&c| c == 0))
    }

    /// Whether `piece`, translated by `(dx, dy)`, fits on this board.
    ///
    /// A cell fails if it maps outside the grid on the sides or
    /// bottom, or overlaps a filled board cell. Cells with `y < 0`
    /// (the spawn zone above the roof) are allowed.
    pub fn is_valid(&self, piece: &Piece, dx: i32, dy: i32) -> bool {
        piece.cells().all(|(cx, cy)| {
            let x = cx + dx;
            let y = cy + dy;
            if !(0..BOARD_WIDTH as i32).contains(&x) {
                return false;
            }
            if y >= BOARD_HEIGHT as i32 {
                return false;
            }
            // Above the roof: legal, nothing to collide with.
            y < 0 || self.cells[y as usize][x as usize] == 0
        })
    }

    /// Returns a new board with the piece's cells stamped to `1`.
    /// Cells still above the roof (`y < 0`) are discarded.
    pub fn place(&self, piece: &Piece) -> Board {
        let mut board = *self;
        for (x, y) in piece.cells() {
            if (0..BOARD_WIDTH as i32).contains(&x)
                && (0..BOARD_HEIGHT as i32).contains(&y)
            {
                board.cells[y as usize][x as usize] = 1;
            }
        }
        board
    }

    /// Removes every fully-filled row and prepends empty rows to keep
    /// the height at 20. Scans bottom-up; surviving rows keep their
    /// relative order. Returns `(new_board, lines_cleared)`.
    pub fn clear_lines(&self) -> (Board, u32) {
        let mut survivors: Vec<[u8; BOARD_WIDTH]> = Vec::new();
        let mut cleared = 0u32;
        for row in self.cells.iter().rev() {
            if row.iter().all(|&c| c != 0) {
                cleared += 1;
            } else {
                survivors.push(*row);
            }
        }

        let mut board = Board::empty();
        for (i, row) in survivors.iter().enumerate() {
            board.cells[BOARD_HEIGHT - 1 - i] = *row;
        }
        (board, cleared)
    }

    /// True iff none of the seven piece types can be placed at its
    /// standard spawn position. The cheap "top row has a filled cell"
    /// heuristic under-reports: a stack can touch the roof in columns
    /// no spawn frame ever occupies.
    pub fn is_game_over(&self) -> bool {
        PieceType::ALL
            .iter()
            .all(|&kind| !self.is_valid(&Piece::spawn(kind), 0, 0))
    }
}

impl Serialize for Board {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut seq =
            serializer.serialize_seq(Some(BOARD_HEIGHT))?;
        for row in &self.cells {
            seq.serialize_element(&row[..])?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        struct BoardVisitor;

        impl<'de> Visitor<'de> for BoardVisitor {
            type Value = Board;

            fn expecting(
                &self,
                f: &mut fmt::Formatter<'_>,
            ) -> fmt::Result {
                write!(f, "a {BOARD_HEIGHT}x{BOARD_WIDTH} grid")
            }

            fn visit_seq<A: SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> Result<Board, A::Error> {
                let mut board = Board::empty();
                for y in 0..BOARD_HEIGHT {
                    let row: Vec<u8> = seq
                        .next_element()?
                        .ok_or_else(|| {
                            de::Error::invalid_length(y, &self)
                        })?;
                    if row.len() != BOARD_WIDTH {
                        return Err(de::Error::custom(format!(
                            "row {y} has {} cells, expected {BOARD_WIDTH}",
                            row.len()
                        )));
                    }
                    for (x, &cell) in row.iter().enumerate() {
                        if cell > 1 {
                            return Err(de::Error::custom(format!(
                                "cell ({x},{y}) is {cell}, expected 0 or 1"
                            )));
                        }
                        board.cells[y][x] = cell;
                    }
                }
                if seq.next_element::<Vec<u8>>()?.is_some() {
                    return Err(de::Error::custom(format!(
                        "more than {BOARD_HEIGHT} rows"
                    )));
                }
                Ok(board)
            }
        }

        deserializer.deserialize_seq(BoardVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with_bottom_row(filled: &[usize]) -> Board {
        let mut rows = [[0u8; BOARD_WIDTH]; BOARD_HEIGHT];
        for &x in filled {
            rows[BOARD_HEIGHT - 1][x] = 1;
        }
        Board::from_rows(rows)
    }

    #[test]
    fn test_empty_board_accepts_all_spawns() {
        let board = Board::empty();
        for kind in PieceType::ALL {
            assert!(board.is_valid(&Piece::spawn(kind), 0, 0));
        }
        assert!(!board.is_game_over());
    }

    #[test]
    fn test_is_valid_rejects_side_walls() {
        let board = Board::empty();
        let piece = Piece::spawn(PieceType::I);
        // I at spawn occupies x 3..=6; pushing 4 left exits the grid.
        assert!(board.is_valid(&piece, -3, 0));
        assert!(!board.is_valid(&piece, -4, 0));
        assert!(board.is_valid(&piece, 3, 0));
        assert!(!board.is_valid(&piece, 4, 0));
    }

    #[test]
    fn test_is_valid_rejects_bottom_but_allows_spawn_zone() {
        let board = Board::empty();
        let piece = Piece::spawn(PieceType::O);
        assert!(!board.is_valid(&piece, 0, 19));
        // Negative y is the spawn zone and always fits on air.
        assert!(board.is_valid(&piece, 0, -2));
    }

    #[test]
    fn test_is_valid_rejects_overlap() {
        let board = board_with_bottom_row(&[4]);
        let piece = Piece::spawn(PieceType::O);
        // O occupies columns 4..=5; dropping onto row 19 overlaps x=4.
        assert!(!board.is_valid(&piece, 0, 18));
        assert!(board.is_valid(&piece, 0, 17));
    }

    #[test]
    fn test_place_stamps_cells_and_discards_roof_cells() {
        let board = Board::empty();
        let piece = Piece::spawn(PieceType::O).translated(0, -1);
        // Top half of the O is above the roof.
        let placed = board.place(&piece);
        assert_eq!(placed.cell(4, 0), 1);
        assert_eq!(placed.cell(5, 0), 1);
        let filled: u32 = placed
            .rows()
            .iter()
            .flatten()
            .map(|&c| c as u32)
            .sum();
        assert_eq!(filled, 2);
    }

    #[test]
    fn test_clear_lines_removes_full_row_and_keeps_order() {
        let mut rows = [[0u8; BOARD_WIDTH]; BOARD_HEIGHT];
        rows[BOARD_HEIGHT - 1] = [1; BOARD_WIDTH]; // full
        rows[BOARD_HEIGHT - 2][0] = 1; // partial, must survive
        rows[BOARD_HEIGHT - 3][9] = 1; // partial, must survive
        let (board, cleared) = Board::from_rows(rows).clear_lines();

        assert_eq!(cleared, 1);
        assert_eq!(board.cell(0, BOARD_HEIGHT as i32 - 1), 1);
        assert_eq!(board.cell(9, BOARD_HEIGHT as i32 - 2), 1);
        assert_eq!(board.cell(9, BOARD_HEIGHT as i32 - 1), 0);
    }

    #[test]
    fn test_clear_lines_multiple_non_adjacent_rows() {
        let mut rows = [[0u8; BOARD_WIDTH]; BOARD_HEIGHT];
        rows[19] = [1; BOARD_WIDTH];
        rows[17] = [1; BOARD_WIDTH];
        rows[18][3] = 1;
        let (board, cleared) = Board::from_rows(rows).clear_lines();

        assert_eq!(cleared, 2);
        // The surviving partial row falls to the bottom.
        assert_eq!(board.cell(3, 19), 1);
        assert!(board.rows()[..19]
            .iter()
            .all(|row| row.iter().all(|&c| c == 0)));
    }

    #[test]
    fn test_clear_lines_empty_board_is_noop() {
        let (board, cleared) = Board::empty().clear_lines();
        assert_eq!(cleared, 0);
        assert!(board.is_empty());
    }

    #[test]
    fn test_is_game_over_requires_all_seven_spawns_blocked() {
        // Fill rows 0..2 except the O spawn columns: every 3-wide and
        // 4-wide spawn collides, but O still fits.
        let mut rows = [[1u8; BOARD_WIDTH]; BOARD_HEIGHT];
        for y in 0..2 {
            rows[y][4] = 0;
            rows[y][5] = 0;
        }
        let board = Board::from_rows(rows);
        assert!(!board.is_game_over());

        // Closing the O slot blocks the last spawn.
        let mut rows_full = rows;
        rows_full[1][4] = 1;
        assert!(Board::from_rows(rows_full).is_game_over());
    }

    #[test]
    fn test_top_row_fill_alone_is_not_game_over() {
        // A single filled cell in row 0 outside every spawn frame: the
        // rejected heuristic would call this game over.
        let mut rows = [[0u8; BOARD_WIDTH]; BOARD_HEIGHT];
        rows[0][0] = 1;
        assert!(!Board::from_rows(rows).is_game_over());
    }

    #[test]
    fn test_board_serde_round_trip() {
        let board = board_with_bottom_row(&[0, 1, 2]);
        let json = serde_json::to_string(&board).unwrap();
        let decoded: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(board, decoded);
    }

    #[test]
    fn test_board_deserialize_rejects_wrong_dimensions() {
        let short: Result<Board, _> =
            serde_json::from_str("[[0,0,0,0,0,0,0,0,0,0]]");
        assert!(short.is_err());

        let bad_row = serde_json::json!(vec![vec![0u8; 9]; 20]);
        let bad: Result<Board, _> = serde_json::from_value(bad_row);
        assert!(bad.is_err());
    }

    #[test]
    fn test_board_deserialize_rejects_non_binary_cells() {
        let mut rows = vec![vec![0u8; 10]; 20];
        rows[5][5] = 7;
        let result: Result<Board, _> =
            serde_json::from_value(serde_json::json!(rows));
        assert!(result.is_err());
    }
}
