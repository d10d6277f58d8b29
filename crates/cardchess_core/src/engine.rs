//! Effect engine: card activation, effect bookkeeping and ticking.
//!
//! This is the one place where cards turn into piece state. Each sub-effect of
//! a card is checked and applied independently and the caller receives a
//! composite [`EffectOutcome`] listing what happened to each of them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::Board;
use crate::cards::{Card, CardId};
use crate::effects::{EffectDefinition, EffectKind, TargetFilter, TurnBucket};
use crate::error::{ActionResult, RejectReason};
use crate::events::GameEvent;
use crate::piece::{EffectApplication, Pieces};
use crate::resolver;
use crate::types::*;

/// What a card is pointed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Piece(PieceId),
    Square(Square),
}

/// Result of one sub-effect of a played card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectResult {
    pub kind: EffectKind,
    pub result: ActionResult<EffectApplication>,
}

/// Composite result of a card activation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectOutcome {
    pub card: CardId,
    pub target: Target,
    pub bucket: TurnBucket,
    pub results: Vec<EffectResult>,
    /// Piece brought back by a resurrection sub-effect.
    pub revived: Option<PieceId>,
    /// Filled in by the game once the turn policy has run.
    pub turn_ended: bool,
}

impl EffectOutcome {
    pub fn applied(&self) -> usize {
        self.results.iter().filter(|r| r.result.is_ok()).count()
    }

    pub fn fully_applied(&self) -> bool {
        self.applied() == self.results.len()
    }
}

/// Tracks which pieces carry effects and routes every effect mutation.
#[derive(Clone, Debug, Default)]
pub struct EffectEngine {
    tracked: BTreeSet<PieceId>,
}

impl EffectEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pieces currently holding at least one effect.
    pub fn tracked(&self) -> impl Iterator<Item = PieceId> + '_ {
        self.tracked.iter().copied()
    }

    pub fn is_tracked(&self, id: PieceId) -> bool {
        self.tracked.contains(&id)
    }

    /// Drop a piece from tracking (capture clears its effects).
    pub(crate) fn forget(&mut self, id: PieceId) {
        self.tracked.remove(&id);
    }

    /// Check whether `def`, played by `side`, may land on `target`.
    ///
    /// For effects that sit on a piece this includes a dry run against the
    /// piece's current effects, so freeze and protection rules are reported
    /// here exactly as `apply_effect` would report them.
    pub fn can_apply_effect_to_target(
        &self,
        board: &Board,
        pieces: &Pieces,
        def: &EffectDefinition,
        side: Side,
        target: Target,
        turn: u32,
    ) -> ActionResult<()> {
        if def.kind.is_instant() {
            return resurrection_target(board, pieces, side, target).map(|_| ());
        }

        let Target::Piece(id) = target else {
            return Err(RejectReason::InvalidTarget);
        };
        let piece = pieces.live(id)?;
        let side_ok = match def.kind.target() {
            TargetFilter::OwnPiece => piece.side == side,
            TargetFilter::EnemyPiece => piece.side != side,
            TargetFilter::EitherPiece => true,
            TargetFilter::EmptySquare => false,
        };
        if !side_ok {
            return Err(RejectReason::InvalidTarget);
        }
        if !def.kind.eligible_for(piece.kind) {
            return Err(RejectReason::EffectIneligible);
        }
        piece.clone().apply_effect(def, turn).map(|_| ())
    }

    /// Attach one effect to a live piece.
    pub fn apply_effect(
        &mut self,
        pieces: &mut Pieces,
        id: PieceId,
        def: &EffectDefinition,
        turn: u32,
        events: &mut Vec<GameEvent>,
    ) -> ActionResult<EffectApplication> {
        let piece = pieces.get_mut(id).ok_or(RejectReason::InvalidTarget)?;
        let applied = piece.apply_effect(def, turn)?;
        self.tracked.insert(id);
        debug!(piece = %id, kind = ?def.kind, ?applied, "effect applied");
        events.push(GameEvent::EffectApplied {
            piece: id,
            kind: def.kind,
        });
        Ok(applied)
    }

    /// Remove one effect kind, reporting it as expired. Returns whether it was present.
    pub fn remove_effect(
        &mut self,
        pieces: &mut Pieces,
        id: PieceId,
        kind: EffectKind,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        let Some(piece) = pieces.get_mut(id) else {
            return false;
        };
        if !piece.remove_effect(kind) {
            return false;
        }
        if piece.effects().is_empty() {
            self.tracked.remove(&id);
        }
        events.push(GameEvent::EffectExpired { piece: id, kind });
        true
    }

    /// Play every effect of `card` for `side` against `target`.
    ///
    /// Rejected only when no sub-effect applies; the error is the first
    /// sub-effect's reason. Otherwise the outcome lists each result.
    #[allow(clippy::too_many_arguments)]
    pub fn activate_card_on_target(
        &mut self,
        board: &mut Board,
        pieces: &mut Pieces,
        card: &Card,
        side: Side,
        target: Target,
        turn: u32,
        events: &mut Vec<GameEvent>,
    ) -> ActionResult<EffectOutcome> {
        if card.effects.is_empty() {
            return Err(RejectReason::EffectIneligible);
        }

        // Validate against the untouched state first, so a rejected card
        // leaves no trace.
        let checks: Vec<ActionResult<()>> = card
            .effects
            .iter()
            .map(|def| self.can_apply_effect_to_target(board, pieces, def, side, target, turn))
            .collect();
        if checks.iter().all(Result::is_err) {
            let first = checks.into_iter().find_map(Result::err);
            return Err(first.unwrap_or(RejectReason::EffectIneligible));
        }

        let mut results = Vec::with_capacity(card.effects.len());
        let mut revived = None;
        for (def, check) in card.effects.iter().zip(checks) {
            let result = match check {
                Err(reason) => Err(reason),
                Ok(()) if def.kind.is_instant() => {
                    self.resurrect(board, pieces, side, target, events)
                        .map(|id| {
                            revived = Some(id);
                            EffectApplication::Resolved
                        })
                }
                Ok(()) => match target {
                    Target::Piece(id) => self.apply_effect(pieces, id, def, turn, events),
                    Target::Square(_) => Err(RejectReason::InvalidTarget),
                },
            };
            results.push(EffectResult {
                kind: def.kind,
                result,
            });
        }

        let outcome = EffectOutcome {
            card: card.id,
            target,
            bucket: card.bucket(),
            results,
            revived,
            turn_ended: false,
        };
        debug!(
            card = %card.name,
            ?target,
            applied = outcome.applied(),
            total = outcome.results.len(),
            "card activated"
        );
        Ok(outcome)
    }

    fn resurrect(
        &mut self,
        board: &mut Board,
        pieces: &mut Pieces,
        side: Side,
        target: Target,
        events: &mut Vec<GameEvent>,
    ) -> ActionResult<PieceId> {
        let (id, square) = resurrection_target(board, pieces, side, target)?;
        resolver::revive(board, pieces, id, square, events)?;
        Ok(id)
    }

    /// Tick every tracked piece once.
    pub fn tick_all_effects(&mut self, pieces: &mut Pieces, events: &mut Vec<GameEvent>) {
        let ids: Vec<PieceId> = self.tracked.iter().copied().collect();
        for id in ids {
            self.tick_piece(pieces, id, events);
        }
    }

    /// End-of-turn tick for every live piece of `side`.
    pub fn tick_side(&mut self, pieces: &mut Pieces, side: Side, events: &mut Vec<GameEvent>) {
        for id in pieces.ids_of(side) {
            self.tick_piece(pieces, id, events);
        }
    }

    fn tick_piece(&mut self, pieces: &mut Pieces, id: PieceId, events: &mut Vec<GameEvent>) {
        let Some(piece) = pieces.get_mut(id) else {
            self.tracked.remove(&id);
            return;
        };
        for kind in piece.tick_turn() {
            debug!(piece = %id, ?kind, "effect expired");
            events.push(GameEvent::EffectExpired { piece: id, kind });
        }
        if piece.effects().is_empty() {
            self.tracked.remove(&id);
        }
    }
}

/// Resolve a resurrection target to the piece to revive and where.
fn resurrection_target(
    board: &Board,
    pieces: &Pieces,
    side: Side,
    target: Target,
) -> ActionResult<(PieceId, Square)> {
    match target {
        Target::Piece(id) => {
            let piece = pieces.get(id).ok_or(RejectReason::InvalidTarget)?;
            if piece.is_alive || piece.side != side {
                return Err(RejectReason::InvalidTarget);
            }
            let grave = pieces
                .graveyard()
                .iter()
                .rev()
                .find(|r| r.piece == id)
                .ok_or(RejectReason::InvalidTarget)?;
            if !board.is_empty(grave.square) {
                return Err(RejectReason::SquareOccupied(grave.square));
            }
            Ok((id, grave.square))
        }
        Target::Square(sq) => {
            if !board.contains(sq) {
                return Err(RejectReason::OutOfBounds(sq));
            }
            if !board.is_empty(sq) {
                return Err(RejectReason::SquareOccupied(sq));
            }
            let grave = pieces
                .latest_grave(side)
                .ok_or(RejectReason::InvalidTarget)?;
            Ok((grave.piece, sq))
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
