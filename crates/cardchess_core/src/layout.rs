//! Initial piece placement.
//!
//! Placement strings follow the FEN board field: ranks from the top (side
//! `Second`'s back rank) down, separated by `/`, digits for runs of empty
//! squares (multi-digit runs allowed on 10x10), uppercase for side `First`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Board, SUPPORTED_SIZES};
use crate::piece::Pieces;
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("unsupported board size {0}")]
    UnsupportedSize(u8),
    #[error("rank {rank} describes {found} files, expected {expected}")]
    FileCount {
        rank: usize,
        expected: usize,
        found: usize,
    },
    #[error("invalid piece character '{0}'")]
    InvalidPiece(char),
    #[error("square {0} is off the board")]
    OffBoard(Square),
    #[error("square {0} is listed twice")]
    DuplicateSquare(Square),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub kind: PieceKind,
    pub side: Side,
    pub square: Square,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub size: u8,
    pub placements: Vec<Placement>,
}

impl Layout {
    /// Mirrored back rank plus a full pawn rank for each side.
    pub fn standard(size: u8) -> Result<Layout, LayoutError> {
        use PieceKind::*;
        let back: &[PieceKind] = match size {
            6 => &[Rook, Knight, Queen, King, Knight, Rook],
            8 => &[Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook],
            10 => &[
                Rook, Knight, Bishop, Bishop, Queen, King, Bishop, Bishop, Knight, Rook,
            ],
            other => return Err(LayoutError::UnsupportedSize(other)),
        };

        let top = size - 1;
        let mut placements = Vec::with_capacity(size as usize * 4);
        for (f, &kind) in back.iter().enumerate() {
            let f = f as u8;
            placements.push(Placement {
                kind,
                side: Side::First,
                square: Square::new(f, 0),
            });
            placements.push(Placement {
                kind: Pawn,
                side: Side::First,
                square: Square::new(f, 1),
            });
            placements.push(Placement {
                kind: Pawn,
                side: Side::Second,
                square: Square::new(f, top - 1),
            });
            placements.push(Placement {
                kind,
                side: Side::Second,
                square: Square::new(f, top),
            });
        }
        Ok(Layout { size, placements })
    }

    /// Parse a placement string; the board size is the number of ranks.
    pub fn parse(placement: &str) -> Result<Layout, LayoutError> {
        let ranks: Vec<&str> = placement.trim().split('/').collect();
        let size = ranks.len();
        if !SUPPORTED_SIZES.contains(&(size as u8)) {
            return Err(LayoutError::UnsupportedSize(size.min(u8::MAX as usize) as u8));
        }

        let mut placements = Vec::new();
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = (size - 1 - rank_idx) as u8;
            let mut file = 0usize;
            let mut run = 0usize;
            for ch in rank_str.chars() {
                if let Some(d) = ch.to_digit(10) {
                    run = run * 10 + d as usize;
                    // Already past the edge; stop before the run can overflow
                    if file + run > size {
                        return Err(LayoutError::FileCount {
                            rank: rank as usize + 1,
                            expected: size,
                            found: file + run,
                        });
                    }
                    continue;
                }
                file += std::mem::take(&mut run);
                let kind = PieceKind::from_char(ch).ok_or(LayoutError::InvalidPiece(ch))?;
                let side = if ch.is_ascii_uppercase() {
                    Side::First
                } else {
                    Side::Second
                };
                if file < size {
                    placements.push(Placement {
                        kind,
                        side,
                        square: Square::new(file as u8, rank),
                    });
                }
                file += 1;
            }
            file += run;
            if file != size {
                return Err(LayoutError::FileCount {
                    rank: rank as usize + 1,
                    expected: size,
                    found: file,
                });
            }
        }
        Ok(Layout {
            size: size as u8,
            placements,
        })
    }

    /// Render back to a placement string.
    pub fn to_placement(&self) -> String {
        let mut grid = vec![None; self.size as usize * self.size as usize];
        for p in &self.placements {
            grid[p.square.rank as usize * self.size as usize + p.square.file as usize] =
                Some((p.kind, p.side));
        }
        let mut ranks = Vec::with_capacity(self.size as usize);
        for rank in (0..self.size as usize).rev() {
            let mut s = String::new();
            let mut empty = 0;
            for file in 0..self.size as usize {
                match grid[rank * self.size as usize + file] {
                    None => empty += 1,
                    Some((kind, side)) => {
                        if empty > 0 {
                            s.push_str(&empty.to_string());
                            empty = 0;
                        }
                        let c = kind.to_char();
                        s.push(if side == Side::First {
                            c.to_ascii_uppercase()
                        } else {
                            c
                        });
                    }
                }
            }
            if empty > 0 {
                s.push_str(&empty.to_string());
            }
            ranks.push(s);
        }
        ranks.join("/")
    }

    /// Create the board and pieces. Piece ids follow placement order.
    pub fn build(&self) -> Result<(Board, Pieces), LayoutError> {
        if !SUPPORTED_SIZES.contains(&self.size) {
            return Err(LayoutError::UnsupportedSize(self.size));
        }
        let mut board = Board::new(self.size);
        let mut pieces = Pieces::new();
        for p in &self.placements {
            if !board.contains(p.square) {
                return Err(LayoutError::OffBoard(p.square));
            }
            if !board.is_empty(p.square) {
                return Err(LayoutError::DuplicateSquare(p.square));
            }
            let id = pieces.spawn(p.kind, p.side, p.square);
            board
                .place(id, p.square)
                .map_err(|_| LayoutError::DuplicateSquare(p.square))?;
        }
        Ok((board, pieces))
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod layout_tests;
