//! Move execution: captures, revival, repelled attacks, collision captures,
//! promotion and triggered bonus moves.
//!
//! `execute_move` validates everything before it touches the board, so a
//! rejected move leaves no trace. Only this module and resurrection (which
//! calls [`revive`]) change board occupancy after setup.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::{Board, distance_vector};
use crate::effects::EffectKind;
use crate::engine::EffectEngine;
use crate::error::{ActionResult, RejectReason};
use crate::events::GameEvent;
use crate::movegen::{can_capture, diagnose, legal_destinations};
use crate::piece::{GraveRecord, Pieces, TurnProgress};
use crate::types::*;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub piece: PieceId,
    pub from: Square,
    /// Square the piece finally stands on.
    pub to: Square,
    pub pattern: MovePattern,
    /// Every piece removed by this move, main capture first.
    pub captured: Vec<PieceId>,
    /// Captured pieces that came straight back through a second life.
    pub revived: Vec<PieceId>,
    pub promoted_to: Option<PieceKind>,
    /// The target king turned the attack away.
    pub repelled: bool,
    /// The piece may move again this turn.
    pub moves_left: bool,
    pub turn_ended: bool,
    pub winner: Option<Side>,
}

impl MoveOutcome {
    fn new(piece: PieceId, from: Square, to: Square, pattern: MovePattern) -> Self {
        Self {
            piece,
            from,
            to,
            pattern,
            captured: Vec::new(),
            revived: Vec::new(),
            promoted_to: None,
            repelled: false,
            moves_left: false,
            turn_ended: false,
            winner: None,
        }
    }
}

/// Move `id` to `to`, resolving everything the move triggers.
pub fn execute_move(
    board: &mut Board,
    pieces: &mut Pieces,
    engine: &mut EffectEngine,
    id: PieceId,
    to: Square,
    turn: u32,
    events: &mut Vec<GameEvent>,
) -> ActionResult<MoveOutcome> {
    let piece = pieces.live(id)?;
    piece.can_move_this_turn()?;
    if !board.contains(to) {
        return Err(RejectReason::OutOfBounds(to));
    }
    if !legal_destinations(board, pieces, id).contains(&to) {
        return Err(diagnose(board, pieces, id, to));
    }

    let from = piece.square;
    let kind = piece.kind;
    let caps = piece.capabilities();
    let delta = distance_vector(from, to);
    let pattern = MovePattern::classify(delta.0, delta.1);
    let mut outcome = MoveOutcome::new(id, from, to, pattern);

    let defender = board.piece_at(to);
    if let Some(defender) = defender {
        let guarded = pieces
            .get(defender)
            .is_some_and(|d| d.kind == PieceKind::King && d.capabilities().guards_king);
        if guarded {
            outcome.to = repel(board, pieces, engine, id, defender, delta, events)?;
            outcome.repelled = true;
            outcome.turn_ended = true;
            debug!(piece = %id, king = %defender, landed = %outcome.to, "attack repelled");
            return Ok(outcome);
        }
    }

    // Origin is vacated before the capture so a second life may return there.
    board.remove(from);
    if let Some(defender) = defender {
        capture(board, pieces, engine, defender, id, turn, &mut outcome, events)?;
    }
    board.place(id, to)?;
    let piece = pieces.get_mut(id).ok_or(RejectReason::InvalidTarget)?;
    piece.previous_square = Some(from);
    piece.square = to;
    piece.is_first_move = false;
    piece.turns_without_moving = 0;
    piece.progress.moves_made = piece.progress.moves_made.saturating_add(1);
    piece.progress.captured |= !outcome.captured.is_empty();
    piece.progress.last_pattern = Some(pattern);
    events.push(GameEvent::PieceMoved { piece: id, from, to });

    if kind == PieceKind::Bishop
        && pattern == MovePattern::Diagonal
        && caps.collision_captures > 0
        && !outcome.captured.is_empty()
    {
        collide(
            board,
            pieces,
            engine,
            id,
            delta,
            caps.collision_captures,
            turn,
            &mut outcome,
            events,
        )?;
    }

    outcome.promoted_to = promote(board, pieces, engine, id, events);

    let piece = pieces.get_mut(id).ok_or(RejectReason::InvalidTarget)?;
    let progress: &mut TurnProgress = &mut piece.progress;
    if progress.moves_made == 1 {
        if caps.dance {
            progress.bonus_moves = progress.bonus_moves.saturating_add(1);
            progress.forbidden_pattern = Some(pattern);
        }
        if caps.nice_day && outcome.captured.is_empty() {
            progress.bonus_moves = progress.bonus_moves.saturating_add(1);
        }
    } else {
        progress.forbidden_pattern = None;
    }

    outcome.moves_left = outcome.winner.is_none()
        && piece.can_move_this_turn().is_ok()
        && !legal_destinations(board, pieces, id).is_empty();
    outcome.turn_ended = !outcome.moves_left;

    debug!(
        piece = %id,
        %from,
        %to,
        captured = outcome.captured.len(),
        moves_left = outcome.moves_left,
        "move executed"
    );
    Ok(outcome)
}

/// Put a dead piece back on `square`, taking it out of the graveyard.
pub fn revive(
    board: &mut Board,
    pieces: &mut Pieces,
    id: PieceId,
    square: Square,
    events: &mut Vec<GameEvent>,
) -> ActionResult<()> {
    if !board.contains(square) {
        return Err(RejectReason::OutOfBounds(square));
    }
    let piece = pieces.get_mut(id).ok_or(RejectReason::InvalidTarget)?;
    if piece.is_alive {
        return Err(RejectReason::InvalidTarget);
    }
    board.place(id, square)?;
    piece.is_alive = true;
    piece.square = square;
    piece.previous_square = None;
    piece.turns_without_moving = 0;
    piece.progress = TurnProgress::default();
    pieces.exhume(id);
    debug!(piece = %id, %square, "piece revived");
    events.push(GameEvent::PieceRevived { piece: id, square });
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn capture(
    board: &mut Board,
    pieces: &mut Pieces,
    engine: &mut EffectEngine,
    victim: PieceId,
    by: PieceId,
    turn: u32,
    outcome: &mut MoveOutcome,
    events: &mut Vec<GameEvent>,
) -> ActionResult<()> {
    let piece = pieces.get_mut(victim).ok_or(RejectReason::InvalidTarget)?;
    let square = piece.square;
    let (kind, side, home) = (piece.kind, piece.side, piece.home);
    let second_life = piece.capabilities().can_revive;
    piece.is_alive = false;
    for kind in piece.clear_effects() {
        events.push(GameEvent::EffectExpired {
            piece: victim,
            kind,
        });
    }
    engine.forget(victim);
    board.remove(square);
    pieces.bury(GraveRecord {
        piece: victim,
        side,
        kind,
        square,
        turn,
    });
    outcome.captured.push(victim);
    events.push(GameEvent::PieceCaptured {
        piece: victim,
        by,
        square,
    });
    debug!(piece = %victim, by = %by, %square, "piece captured");

    // The mover has not landed yet on the main capture, so its destination
    // is excluded explicitly.
    if second_life && home != outcome.to && board.is_empty(home) {
        revive(board, pieces, victim, home, events)?;
        outcome.revived.push(victim);
        return Ok(());
    }
    if kind == PieceKind::King {
        outcome.winner = Some(side.other());
    }
    Ok(())
}

/// Cancel a capture on a guarded king and push the attacker back.
fn repel(
    board: &mut Board,
    pieces: &mut Pieces,
    engine: &mut EffectEngine,
    attacker: PieceId,
    king: PieceId,
    (df, dr): (i8, i8),
    events: &mut Vec<GameEvent>,
) -> ActionResult<Square> {
    let from = pieces.live(attacker)?.square;
    let mut landed = from;
    if let Some(back) = board.offset(from, -df.signum(), -dr.signum()) {
        if board.is_empty(back) {
            board.remove(from);
            board.place(attacker, back)?;
            landed = back;
        }
    }
    engine.remove_effect(pieces, king, EffectKind::NotToday, events);

    let piece = pieces.get_mut(attacker).ok_or(RejectReason::InvalidTarget)?;
    if landed != from {
        piece.previous_square = Some(from);
        piece.square = landed;
    }
    piece.is_first_move = false;
    piece.turns_without_moving = 0;
    let allowed = piece.moves_allowed();
    piece.progress.moves_made = allowed;
    events.push(GameEvent::AttackRepelled {
        attacker,
        king,
        pushed_to: landed,
    });
    Ok(landed)
}

/// Keep capturing along the diagonal beyond the landing square.
#[allow(clippy::too_many_arguments)]
fn collide(
    board: &mut Board,
    pieces: &mut Pieces,
    engine: &mut EffectEngine,
    id: PieceId,
    (df, dr): (i8, i8),
    limit: u8,
    turn: u32,
    outcome: &mut MoveOutcome,
    events: &mut Vec<GameEvent>,
) -> ActionResult<()> {
    let step = (df.signum(), dr.signum());
    let mut cur = outcome.to;
    let mut remaining = limit;
    while remaining > 0 {
        let Some(next) = board.offset(cur, step.0, step.1) else {
            break;
        };
        cur = next;
        let Some(other) = board.piece_at(next) else {
            continue;
        };
        let (Some(mover), Some(victim)) = (pieces.get(id), pieces.get(other)) else {
            break;
        };
        let guarded = victim.kind == PieceKind::King && victim.capabilities().guards_king;
        if guarded || !can_capture(mover, victim) {
            break;
        }
        capture(board, pieces, engine, other, id, turn, outcome, events)?;
        remaining -= 1;
    }
    Ok(())
}

/// Far-rank promotion, or in-place promotion when the pawn carries it.
fn promote(
    board: &Board,
    pieces: &mut Pieces,
    engine: &mut EffectEngine,
    id: PieceId,
    events: &mut Vec<GameEvent>,
) -> Option<PieceKind> {
    let piece = pieces.get(id)?;
    if piece.kind != PieceKind::Pawn {
        return None;
    }
    let far_rank = match piece.side {
        Side::First => board.size() - 1,
        Side::Second => 0,
    };
    let at_far_rank = piece.square.rank == far_rank;
    let in_place = piece
        .effect(EffectKind::InPlacePromotion)
        .map(|e| e.definition.promotion_kind());
    let new_kind = match in_place {
        Some(kind) => {
            engine.remove_effect(pieces, id, EffectKind::InPlacePromotion, events);
            kind
        }
        None if at_far_rank => PieceKind::Queen,
        None => return None,
    };

    pieces.get_mut(id)?.kind = new_kind;
    debug!(piece = %id, kind = ?new_kind, "pawn promoted");
    events.push(GameEvent::PiecePromoted {
        piece: id,
        kind: new_kind,
    });
    Some(new_kind)
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod resolver_tests;
