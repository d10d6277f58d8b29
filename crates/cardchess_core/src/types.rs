use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two competing players. Colour is a presentation detail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    First,
    Second,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::First, Side::Second];

    pub fn other(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    pub fn idx(self) -> usize {
        match self {
            Side::First => 0,
            Side::Second => 1,
        }
    }

    /// Rank direction this side's pawns advance in.
    pub fn forward(self) -> i8 {
        match self {
            Side::First => 1,
            Side::Second => -1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Fixed strength scale used by light protection.
    pub fn strength(self) -> u8 {
        match self {
            PieceKind::Pawn => 1,
            PieceKind::Knight => 3,
            PieceKind::Bishop => 3,
            PieceKind::Rook => 5,
            PieceKind::Queen => 9,
            PieceKind::King => 10,
        }
    }

    pub fn from_char(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }

    /// Lowercase letter; callers uppercase it for side `First`.
    pub fn to_char(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }
}

/// Stable identity of a piece for the lifetime of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PieceId(pub u32);

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A (file, rank) coordinate, zero-based from side `First`'s bottom-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Square {
    pub file: u8,
    pub rank: u8,
}

impl Square {
    pub const fn new(file: u8, rank: u8) -> Self {
        Self { file, rank }
    }

    /// Chess notation: `'A' + file` followed by `rank + 1`. Files past `Z`
    /// have no letter and render as `(file,rank)` with the same numbering.
    pub fn notation(self) -> String {
        let rank = self.rank as u32 + 1;
        if self.file < 26 {
            let f = char::from(b'A' + self.file);
            format!("{f}{rank}")
        } else {
            format!("({},{rank})", self.file as u32 + 1)
        }
    }

    /// Parse notation such as `a2`, `E4` or `J10`. Bounds are checked by the board.
    pub fn parse(s: &str) -> Option<Square> {
        let mut chars = s.trim().chars();
        let f = chars.next()?.to_ascii_uppercase();
        if !f.is_ascii_uppercase() {
            return None;
        }
        let rank: u32 = chars.as_str().parse().ok()?;
        if rank == 0 || rank > u8::MAX as u32 {
            return None;
        }
        Some(Square::new(f as u8 - b'A', (rank - 1) as u8))
    }

    /// Square displaced by `(df, dr)` on an `size`x`size` board.
    pub fn offset(self, df: i8, dr: i8, size: u8) -> Option<Square> {
        let f = self.file as i16 + df as i16;
        let r = self.rank as i16 + dr as i16;
        if (0..size as i16).contains(&f) && (0..size as i16).contains(&r) {
            Some(Square::new(f as u8, r as u8))
        } else {
            None
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation())
    }
}

/// Geometric family of a single move, used by effects that care how a piece moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovePattern {
    Straight,
    Diagonal,
    Jump,
}

impl MovePattern {
    pub fn classify(df: i8, dr: i8) -> MovePattern {
        if df == 0 || dr == 0 {
            MovePattern::Straight
        } else if df.abs() == dr.abs() {
            MovePattern::Diagonal
        } else {
            MovePattern::Jump
        }
    }
}

pub const STRAIGHT_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub const DIAGONAL_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (-1, 2),
    (-2, 1),
    (1, -2),
    (2, -1),
    (-1, -2),
    (-2, -1),
];
