//! Destination generation and capture eligibility.
//!
//! Base movement comes from the piece kind; effects widen or narrow it through
//! [`Capabilities`]. Sliding paths stop at the first occupied square, which is
//! a destination only if the mover may capture what stands there.

use crate::board::{Board, distance_vector};
use crate::effects::{Capabilities, ProtectionTier};
use crate::error::RejectReason;
use crate::piece::{Piece, Pieces};
use crate::types::*;

/// Whether `attacker` may take `defender`, ignoring geometry.
pub fn can_capture(attacker: &Piece, defender: &Piece) -> bool {
    can_capture_with(&attacker.capabilities(), attacker, defender)
}

fn can_capture_with(caps: &Capabilities, attacker: &Piece, defender: &Piece) -> bool {
    if attacker.side == defender.side || !attacker.is_alive || !defender.is_alive {
        return false;
    }
    if caps.pierces.contains(&defender.kind) {
        return true;
    }
    match defender.capabilities().protection {
        ProtectionTier::Full => false,
        ProtectionTier::Light => attacker.kind.strength() > defender.kind.strength(),
        ProtectionTier::None => true,
    }
}

struct Gen<'a> {
    board: &'a Board,
    pieces: &'a Pieces,
    piece: &'a Piece,
    caps: Capabilities,
    out: Vec<Square>,
}

impl<'a> Gen<'a> {
    fn push(&mut self, sq: Square) {
        if !self.out.contains(&sq) {
            self.out.push(sq);
        }
    }

    fn occupant(&self, sq: Square) -> Option<&'a Piece> {
        let pieces = self.pieces;
        self.board.piece_at(sq).and_then(|id| pieces.get(id))
    }

    fn capturable(&self, sq: Square) -> bool {
        self.occupant(sq)
            .is_some_and(|other| can_capture_with(&self.caps, self.piece, other))
    }

    /// Walk one direction. `slide` keeps going past empty squares.
    fn walk(&mut self, (df, dr): (i8, i8), slide: bool, quiet: bool, attack: bool) {
        let diagonal = df != 0 && dr != 0;
        let mut cur = self.piece.square;
        while let Some(next) = self.board.offset(cur, df, dr) {
            match self.occupant(next) {
                None => {
                    if quiet {
                        self.push(next);
                    }
                }
                Some(other) if other.side == self.piece.side => {
                    let bypass = self.caps.ignore_blocking || (self.caps.can_jump && diagonal);
                    if !bypass {
                        break;
                    }
                }
                Some(_) => {
                    if attack && self.capturable(next) {
                        self.push(next);
                    }
                    if !self.caps.ignore_blocking {
                        break;
                    }
                }
            }
            if !slide {
                break;
            }
            cur = next;
        }
    }

    /// Single quiet step onto an empty square.
    fn step(&mut self, df: i8, dr: i8) {
        if let Some(to) = self.board.offset(self.piece.square, df, dr) {
            if self.board.is_empty(to) {
                self.push(to);
            }
        }
    }

    fn lines(&mut self, slide: bool) {
        let caps = self.caps.clone();
        for dir in STRAIGHT_DIRS {
            if caps.can_move_straight || caps.can_attack_straight {
                self.walk(dir, slide, caps.can_move_straight, caps.can_attack_straight);
            }
        }
        for dir in DIAGONAL_DIRS {
            if caps.can_move_diagonal || caps.can_attack_diagonal {
                self.walk(dir, slide, caps.can_move_diagonal, caps.can_attack_diagonal);
            }
        }
    }

    fn pawn(&mut self) {
        let fwd = self.piece.side.forward();
        let from = self.piece.square;
        let caps = self.caps.clone();

        if let Some(one) = self.board.offset(from, 0, fwd) {
            let one_empty = self.board.is_empty(one);
            if one_empty {
                self.push(one);
            }
            if self.piece.is_first_move && (one_empty || caps.ignore_blocking) {
                if let Some(two) = self.board.offset(from, 0, 2 * fwd) {
                    if self.board.is_empty(two) {
                        self.push(two);
                    }
                }
            }
            if caps.can_attack_straight && self.capturable(one) {
                self.push(one);
            }
        }

        for df in [-1, 1] {
            if let Some(to) = self.board.offset(from, df, fwd) {
                if caps.can_attack_diagonal && self.capturable(to) {
                    self.push(to);
                }
                if caps.can_move_diagonal && self.board.is_empty(to) {
                    self.push(to);
                }
            }
        }

        if caps.can_move_straight {
            for (df, dr) in STRAIGHT_DIRS {
                self.step(df, dr);
            }
        }
    }

    fn knight(&mut self) {
        let from = self.piece.square;
        for (df, dr) in KNIGHT_DELTAS {
            if let Some(to) = self.board.offset(from, df, dr) {
                if self.board.is_empty(to) || self.capturable(to) {
                    self.push(to);
                }
            }
        }
    }

    /// Lateral and backward steps granted by effects, for every kind.
    fn extra_steps(&mut self) {
        let caps = self.caps.clone();
        if caps.can_move_sideways {
            for df in [-1i8, 1] {
                for n in 1..=caps.sideways_steps.max(1) as i8 {
                    let Some(to) = self.board.offset(self.piece.square, df * n, 0) else {
                        break;
                    };
                    if !self.board.is_empty(to) {
                        break;
                    }
                    self.push(to);
                }
            }
        }
        if caps.can_move_backward {
            self.step(0, -self.piece.side.forward());
        }
    }
}

/// Every square `id` may move to right now, ignoring whose turn it is.
pub fn legal_destinations(board: &Board, pieces: &Pieces, id: PieceId) -> Vec<Square> {
    let Some(piece) = pieces.get(id).filter(|p| p.is_alive) else {
        return Vec::new();
    };
    let caps = piece.capabilities();
    if !caps.can_move() {
        return Vec::new();
    }

    let mut g = Gen {
        board,
        pieces,
        piece,
        caps,
        out: Vec::new(),
    };
    match piece.kind {
        PieceKind::Pawn => g.pawn(),
        PieceKind::King => g.lines(false),
        PieceKind::Knight => {
            g.knight();
            g.lines(true);
        }
        PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => g.lines(true),
    }
    g.extra_steps();

    let mut out = g.out;
    if let Some(forbidden) = piece.progress.forbidden_pattern {
        out.retain(|to| {
            let (df, dr) = distance_vector(piece.square, *to);
            MovePattern::classify(df, dr) != forbidden
        });
    }
    out
}

/// Best explanation for why `to` is not a legal destination of `id`.
pub fn diagnose(board: &Board, pieces: &Pieces, id: PieceId, to: Square) -> RejectReason {
    let Some(piece) = pieces.get(id).filter(|p| p.is_alive) else {
        return RejectReason::InvalidTarget;
    };
    if !board.contains(to) {
        return RejectReason::OutOfBounds(to);
    }
    if !piece.capabilities().can_move() {
        return RejectReason::Blockaded;
    }
    if let Some(other) = board.piece_at(to).and_then(|o| pieces.get(o)) {
        if other.side == piece.side {
            return RejectReason::SquareOccupiedByAlly;
        }
        if !can_capture(piece, other) {
            return RejectReason::ProtectionPrevents;
        }
    }
    let blocked = board
        .squares_on_line(piece.square, to)
        .iter()
        .any(|sq| !board.is_empty(*sq));
    if blocked && piece.kind != PieceKind::Knight {
        return RejectReason::PathBlocked;
    }
    RejectReason::UnreachableSquare
}

#[cfg(test)]
#[path = "movegen_tests.rs"]
mod movegen_tests;
