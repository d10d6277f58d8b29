//! Square grid and occupancy.
//!
//! The board only stores which piece id sits where; piece state lives in
//! [`crate::piece::Pieces`]. Each square holds at most one id.

use crate::error::{ActionResult, RejectReason};
use crate::types::*;

pub const SUPPORTED_SIZES: [u8; 3] = [6, 8, 10];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    size: u8,
    cells: Vec<Option<PieceId>>,
}

impl Board {
    pub fn new(size: u8) -> Self {
        Self {
            size,
            cells: vec![None; size as usize * size as usize],
        }
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn contains(&self, sq: Square) -> bool {
        sq.file < self.size && sq.rank < self.size
    }

    fn index(&self, sq: Square) -> Option<usize> {
        if self.contains(sq) {
            Some(sq.rank as usize * self.size as usize + sq.file as usize)
        } else {
            None
        }
    }

    pub fn piece_at(&self, sq: Square) -> Option<PieceId> {
        self.index(sq).and_then(|i| self.cells[i])
    }

    pub fn is_empty(&self, sq: Square) -> bool {
        self.index(sq).is_some_and(|i| self.cells[i].is_none())
    }

    /// Put `id` on an empty square. Callers must clear the square first.
    pub fn place(&mut self, id: PieceId, sq: Square) -> ActionResult<()> {
        let i = self.index(sq).ok_or(RejectReason::OutOfBounds(sq))?;
        if self.cells[i].is_some() {
            return Err(RejectReason::SquareOccupied(sq));
        }
        self.cells[i] = Some(id);
        Ok(())
    }

    /// Clear a square, returning whatever was on it.
    pub fn remove(&mut self, sq: Square) -> Option<PieceId> {
        let i = self.index(sq)?;
        self.cells[i].take()
    }

    pub fn offset(&self, sq: Square, df: i8, dr: i8) -> Option<Square> {
        sq.offset(df, dr, self.size)
    }

    /// Squares strictly between `from` and `to` when they share a rank, file or
    /// diagonal; empty otherwise.
    pub fn squares_on_line(&self, from: Square, to: Square) -> Vec<Square> {
        let (df, dr) = distance_vector(from, to);
        let aligned = df == 0 || dr == 0 || df.abs() == dr.abs();
        if !aligned || (df == 0 && dr == 0) {
            return Vec::new();
        }
        let step = (df.signum(), dr.signum());
        let mut out = Vec::new();
        let mut cur = from;
        while let Some(next) = self.offset(cur, step.0, step.1) {
            if next == to {
                break;
            }
            out.push(next);
            cur = next;
        }
        out
    }

    /// Every occupied square with its piece id, rank by rank.
    pub fn occupied(&self) -> impl Iterator<Item = (Square, PieceId)> + '_ {
        let size = self.size;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.map(|id| {
                let sq = Square::new((i % size as usize) as u8, (i / size as usize) as u8);
                (sq, id)
            })
        })
    }

    /// Parse notation and check it lies on this board.
    pub fn parse_square(&self, s: &str) -> Option<Square> {
        Square::parse(s).filter(|sq| self.contains(*sq))
    }
}

pub fn is_on_diagonal(a: Square, b: Square) -> bool {
    let (df, dr) = distance_vector(a, b);
    df != 0 && df.abs() == dr.abs()
}

pub fn distance_vector(a: Square, b: Square) -> (i8, i8) {
    (
        b.file as i8 - a.file as i8,
        b.rank as i8 - a.rank as i8,
    )
}

#[cfg(test)]
#[path = "board_tests.rs"]
mod board_tests;
