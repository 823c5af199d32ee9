//! Piece types, SRS shape tables, and spawn positions.

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

/// The seven tetromino types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceType {
    /// All seven types, in canonical (unshuffled bag) order.
    pub const ALL: [PieceType; 7] = [
        PieceType::I,
        PieceType::O,
        PieceType::T,
        PieceType::S,
        PieceType::Z,
        PieceType::J,
        PieceType::L,
    ];

    /// The spawn column for this type. Every piece spawns at the top
    /// (`y = 0`); the O piece sits one column further right so its 2×2
    /// frame is centred.
    pub fn spawn_x(self) -> i32 {
        match self {
            PieceType::O => 4,
            _ => 3,
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            PieceType::I => 'I',
            PieceType::O => 'O',
            PieceType::T => 'T',
            PieceType::S => 'S',
            PieceType::Z => 'Z',
            PieceType::J => 'J',
            PieceType::L => 'L',
        };
        write!(f, "{c}")
    }
}

/// A grid position. `y` grows downward; row 0 is the top of the board.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

// ---------------------------------------------------------------------------
// SRS shape tables
// ---------------------------------------------------------------------------

// One frame per (type, rotation). Frames are the standard SRS set:
// I uses a 4×4 frame, O a 2×2, the rest 3×3. Row 0 of a frame is its
// top row, matching the board orientation.

type Frame = &'static [&'static [u8]];

const I_FRAMES: [Frame; 4] = [
    &[&[0, 0, 0, 0], &[1, 1, 1, 1], &[0, 0, 0, 0], &[0, 0, 0, 0]],
    &[&[0, 0, 1, 0], &[0, 0, 1, 0], &[0, 0, 1, 0], &[0, 0, 1, 0]],
    &[&[0, 0, 0, 0], &[0, 0, 0, 0], &[1, 1, 1, 1], &[0, 0, 0, 0]],
    &[&[0, 1, 0, 0], &[0, 1, 0, 0], &[0, 1, 0, 0], &[0, 1, 0, 0]],
];

const O_FRAMES: [Frame; 4] = [
    &[&[1, 1], &[1, 1]],
    &[&[1, 1], &[1, 1]],
    &[&[1, 1], &[1, 1]],
    &[&[1, 1], &[1, 1]],
];

const T_FRAMES: [Frame; 4] = [
    &[&[0, 1, 0], &[1, 1, 1], &[0, 0, 0]],
    &[&[0, 1, 0], &[0, 1, 1], &[0, 1, 0]],
    &[&[0, 0, 0], &[1, 1, 1], &[0, 1, 0]],
    &[&[0, 1, 0], &[1, 1, 0], &[0, 1, 0]],
];

const S_FRAMES: [Frame; 4] = [
    &[&[0, 1, 1], &[1, 1, 0], &[0, 0, 0]],
    &[&[0, 1, 0], &[0, 1, 1], &[0, 0, 1]],
    &[&[0, 0, 0], &[0, 1, 1], &[1, 1, 0]],
    &[&[1, 0, 0], &[1, 1, 0], &[0, 1, 0]],
];

const Z_FRAMES: [Frame; 4] = [
    &[&[1, 1, 0], &[0, 1, 1], &[0, 0, 0]],
    &[&[0, 0, 1], &[0, 1, 1], &[0, 1, 0]],
    &[&[0, 0, 0], &[1, 1, 0], &[0, 1, 1]],
    &[&[0, 1, 0], &[1, 1, 0], &[1, 0, 0]],
];

const J_FRAMES: [Frame; 4] = [
    &[&[1, 0, 0], &[1, 1, 1], &[0, 0, 0]],
    &[&[0, 1, 1], &[0, 1, 0], &[0, 1, 0]],
    &[&[0, 0, 0], &[1, 1, 1], &[0, 0, 1]],
    &[&[0, 1, 0], &[0, 1, 0], &[1, 1, 0]],
];

const L_FRAMES: [Frame; 4] = [
    &[&[0, 0, 1], &[1, 1, 1], &[0, 0, 0]],
    &[&[0, 1, 0], &[0, 1, 0], &[0, 1, 1]],
    &[&[0, 0, 0], &[1, 1, 1], &[1, 0, 0]],
    &[&[1, 1, 0], &[0, 1, 0], &[0, 1, 0]],
];

/// Returns the shape frame for a `(type, rotation)` pair.
pub(crate) fn frame(kind: PieceType, rotation: u8) -> Frame {
    let r = (rotation % 4) as usize;
    match kind {
        PieceType::I => I_FRAMES[r],
        PieceType::O => O_FRAMES[r],
        PieceType::T => T_FRAMES[r],
        PieceType::S => S_FRAMES[r],
        PieceType::Z => Z_FRAMES[r],
        PieceType::J => J_FRAMES[r],
        PieceType::L => L_FRAMES[r],
    }
}

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// The active piece: a type, a board position, and a rotation index.
///
/// The shape is derived from `(kind, rotation)` and included when the
/// piece is serialized, so clients can render without carrying their
/// own tables. Deserialization ignores any client-supplied shape — it
/// is always recomputed server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceType,
    pub position: Position,
    pub rotation: u8,
}

impl Piece {
    /// Creates a piece of the given type at its standard spawn position.
    pub fn spawn(kind: PieceType) -> Self {
        Self {
            kind,
            position: Position {
                x: kind.spawn_x(),
                y: 0,
            },
            rotation: 0,
        }
    }

    /// The shape frame for the piece's current rotation.
    pub fn frame(&self) -> Frame {
        frame(self.kind, self.rotation)
    }

    /// Iterates the board coordinates of the piece's filled cells.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.frame().iter().enumerate().flat_map(move |(r, row)| {
            row.iter().enumerate().filter_map(move |(c, &v)| {
                (v != 0).then_some((
                    self.position.x + c as i32,
                    self.position.y + r as i32,
                ))
            })
        })
    }

    /// A copy of this piece translated by `(dx, dy)`.
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            position: Position {
                x: self.position.x + dx,
                y: self.position.y + dy,
            },
            ..*self
        }
    }
}

impl Serialize for Piece {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let shape: Vec<Vec<u8>> =
            self.frame().iter().map(|row| row.to_vec()).collect();
        let mut s = serializer.serialize_struct("Piece", 4)?;
        s.serialize_field("type", &self.kind)?;
        s.serialize_field("position", &self.position)?;
        s.serialize_field("rotation", &self.rotation)?;
        s.serialize_field("shape", &shape)?;
        s.end()
    }
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        struct PieceVisitor;

        impl<'de> Visitor<'de> for PieceVisitor {
            type Value = Piece;

            fn expecting(
                &self,
                f: &mut fmt::Formatter<'_>,
            ) -> fmt::Result {
                f.write_str("a piece object")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> Result<Piece, A::Error> {
                let mut kind: Option<PieceType> = None;
                let mut position: Option<Position> = None;
                let mut rotation: Option<u8> = None;
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "type" => kind = Some(map.next_value()?),
                        "position" => position = Some(map.next_value()?),
                        "rotation" => rotation = Some(map.next_value()?),
                        // Shape is derived state; accept and discard.
                        _ => {
                            map.next_value::<serde::de::IgnoredAny>()?;
                        }
                    }
                }
                let kind = kind
                    .ok_or_else(|| de::Error::missing_field("type"))?;
                let position = position
                    .ok_or_else(|| de::Error::missing_field("position"))?;
                let rotation = rotation.unwrap_or(0) % 4;
                Ok(Piece {
                    kind,
                    position,
                    rotation,
                })
            }
        }

        deserializer.deserialize_map(PieceVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_frame_has_exactly_four_cells() {
        for kind in PieceType::ALL {
            for rotation in 0..4u8 {
                let count: usize = frame(kind, rotation)
                    .iter()
                    .map(|row| {
                        row.iter().filter(|&&v| v != 0).count()
                    })
                    .sum();
                assert_eq!(
                    count, 4,
                    "{kind} rotation {rotation} must have 4 cells"
                );
            }
        }
    }

    #[test]
    fn test_spawn_positions_near_top_center() {
        for kind in PieceType::ALL {
            let p = Piece::spawn(kind);
            assert_eq!(p.position.y, 0);
            assert_eq!(p.rotation, 0);
            for (x, y) in p.cells() {
                assert!((0..10).contains(&x), "{kind} spawn x {x}");
                assert!((0..3).contains(&y), "{kind} spawn y {y}");
            }
        }
    }

    #[test]
    fn test_o_piece_spawns_centred() {
        assert_eq!(PieceType::O.spawn_x(), 4);
        let cells: Vec<_> = Piece::spawn(PieceType::O).cells().collect();
        assert_eq!(cells, vec![(4, 0), (5, 0), (4, 1), (5, 1)]);
    }

    #[test]
    fn test_piece_serializes_with_derived_shape() {
        let p = Piece::spawn(PieceType::T);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["type"], "T");
        assert_eq!(json["position"]["x"], 3);
        assert_eq!(json["rotation"], 0);
        assert_eq!(
            json["shape"],
            serde_json::json!([[0, 1, 0], [1, 1, 1], [0, 0, 0]])
        );
    }

    #[test]
    fn test_piece_deserialize_ignores_client_shape() {
        // A client could send a tampered shape; it must be discarded.
        let json = serde_json::json!({
            "type": "T",
            "position": {"x": 3, "y": 5},
            "rotation": 2,
            "shape": [[1, 1, 1], [1, 1, 1], [1, 1, 1]]
        });
        let p: Piece = serde_json::from_value(json).unwrap();
        assert_eq!(p.kind, PieceType::T);
        assert_eq!(p.position, Position { x: 3, y: 5 });
        assert_eq!(p.frame(), frame(PieceType::T, 2));
    }

    #[test]
    fn test_translated_moves_position_only() {
        let p = Piece::spawn(PieceType::J);
        let moved = p.translated(-1, 2);
        assert_eq!(moved.position, Position { x: 2, y: 2 });
        assert_eq!(moved.kind, p.kind);
        assert_eq!(moved.rotation, p.rotation);
    }
}
