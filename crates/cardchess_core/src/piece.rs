//! Per-piece runtime state.
//!
//! A [`Piece`] owns its [`ActiveEffect`]s. Only `apply_effect`, `remove_effect`
//! and `tick_turn` change them; `capabilities` is a pure fold.

use serde::{Deserialize, Serialize};

use crate::effects::{Capabilities, EffectDefinition, EffectKind, ProtectionTier};
use crate::error::{ActionResult, RejectReason};
use crate::types::*;

/// One effect definition bound to one piece.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub definition: EffectDefinition,
    /// Turns left; ignored when the definition is permanent.
    pub remaining: u32,
    pub applied_on_turn: u32,
    /// Applications folded into this instance (additive kinds only).
    pub stacks: u8,
}

impl ActiveEffect {
    pub fn kind(&self) -> EffectKind {
        self.definition.kind
    }

    pub fn is_permanent(&self) -> bool {
        self.definition.duration == 0
    }
}

/// What `apply_effect` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectApplication {
    Applied,
    Refreshed,
    Stacked,
    /// Instant effect resolved on the spot (resurrection).
    Resolved,
}

/// Movement bookkeeping that resets every time the owner's turn ends.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnProgress {
    pub moves_made: u8,
    pub bonus_moves: u8,
    pub captured: bool,
    pub last_pattern: Option<MovePattern>,
    /// Pattern the next move may not use (set by Dance).
    pub forbidden_pattern: Option<MovePattern>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub kind: PieceKind,
    pub side: Side,
    pub square: Square,
    /// Setup square, where a second life returns the piece.
    pub home: Square,
    pub previous_square: Option<Square>,
    pub is_alive: bool,
    pub is_first_move: bool,
    pub turns_without_moving: u32,
    pub progress: TurnProgress,
    effects: Vec<ActiveEffect>,
}

impl Piece {
    pub fn new(id: PieceId, kind: PieceKind, side: Side, square: Square) -> Self {
        Self {
            id,
            kind,
            side,
            square,
            home: square,
            previous_square: None,
            is_alive: true,
            is_first_move: true,
            turns_without_moving: 0,
            progress: TurnProgress::default(),
            effects: Vec::new(),
        }
    }

    pub fn effects(&self) -> &[ActiveEffect] {
        &self.effects
    }

    pub fn effect(&self, kind: EffectKind) -> Option<&ActiveEffect> {
        self.effects.iter().find(|e| e.kind() == kind)
    }

    pub fn has_effect(&self, kind: EffectKind) -> bool {
        self.effect(kind).is_some()
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::fold(
            self.kind,
            self.effects.iter().map(|e| (&e.definition, e.stacks)),
        )
    }

    /// Attach `def`, refreshing or stacking an existing instance of the same kind.
    pub fn apply_effect(
        &mut self,
        def: &EffectDefinition,
        turn: u32,
    ) -> ActionResult<EffectApplication> {
        if !self.is_alive {
            return Err(RejectReason::InvalidTarget);
        }
        let kind = def.kind;
        if kind.is_instant() || !kind.eligible_for(self.kind) {
            return Err(RejectReason::EffectIneligible);
        }
        if kind != EffectKind::Freeze && self.has_effect(EffectKind::Freeze) {
            return Err(RejectReason::EffectIneligible);
        }
        if kind.is_protection() {
            let held = self
                .effects
                .iter()
                .filter(|e| e.kind().is_protection() && e.kind() != kind)
                .map(|e| e.definition.protection)
                .max()
                .unwrap_or(ProtectionTier::None);
            if held != ProtectionTier::None && held >= def.protection {
                return Err(RejectReason::EffectIneligible);
            }
            // A stronger tier replaces the weaker one outright.
            self.effects
                .retain(|e| !(e.kind().is_protection() && e.kind() != kind));
        }

        if let Some(existing) = self.effects.iter_mut().find(|e| e.definition.kind == kind) {
            existing.remaining = def.duration;
            existing.applied_on_turn = turn;
            if kind.is_additive() {
                existing.stacks = existing.stacks.saturating_add(1);
                return Ok(EffectApplication::Stacked);
            }
            existing.definition = def.clone();
            return Ok(EffectApplication::Refreshed);
        }

        self.effects.push(ActiveEffect {
            definition: def.clone(),
            remaining: def.duration,
            applied_on_turn: turn,
            stacks: 1,
        });
        Ok(EffectApplication::Applied)
    }

    pub fn remove_effect(&mut self, kind: EffectKind) -> bool {
        let before = self.effects.len();
        self.effects.retain(|e| e.kind() != kind);
        self.effects.len() != before
    }

    pub fn clear_effects(&mut self) -> Vec<EffectKind> {
        self.effects.drain(..).map(|e| e.definition.kind).collect()
    }

    /// End-of-turn bookkeeping for this piece's owner. Returns expired kinds.
    pub fn tick_turn(&mut self) -> Vec<EffectKind> {
        let mut expired = Vec::new();
        self.effects.retain_mut(|e| {
            if e.is_permanent() {
                return true;
            }
            e.remaining = e.remaining.saturating_sub(1);
            if e.remaining == 0 {
                expired.push(e.definition.kind);
                false
            } else {
                true
            }
        });
        if self.progress.moves_made == 0 {
            self.turns_without_moving += 1;
        }
        self.progress = TurnProgress::default();
        expired
    }

    /// Moves allowed this turn, including triggered bonus moves.
    pub fn moves_allowed(&self) -> u8 {
        self.capabilities()
            .moves_per_turn()
            .saturating_add(self.progress.bonus_moves)
    }

    pub fn can_move_this_turn(&self) -> ActionResult<()> {
        if !self.is_alive {
            return Err(RejectReason::InvalidTarget);
        }
        if !self.capabilities().can_move() {
            return Err(RejectReason::Blockaded);
        }
        if self.progress.moves_made >= self.moves_allowed() {
            return Err(RejectReason::NoRemainingMoves);
        }
        Ok(())
    }
}

/// Record of a captured piece, kept for resurrection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraveRecord {
    pub piece: PieceId,
    pub side: Side,
    pub kind: PieceKind,
    pub square: Square,
    pub turn: u32,
}

/// Every piece of the game, indexed by id, plus the graveyard.
#[derive(Clone, Debug, Default)]
pub struct Pieces {
    list: Vec<Piece>,
    graveyard: Vec<GraveRecord>,
}

impl Pieces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, kind: PieceKind, side: Side, square: Square) -> PieceId {
        let id = PieceId(self.list.len() as u32);
        self.list.push(Piece::new(id, kind, side, square));
        id
    }

    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        self.list.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.list.get_mut(id.0 as usize)
    }

    /// Live piece lookup; dead ids are treated as invalid targets.
    pub fn live(&self, id: PieceId) -> ActionResult<&Piece> {
        self.get(id)
            .filter(|p| p.is_alive)
            .ok_or(RejectReason::InvalidTarget)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.list.iter()
    }

    pub fn alive(&self) -> impl Iterator<Item = &Piece> {
        self.list.iter().filter(|p| p.is_alive)
    }

    pub fn alive_of(&self, side: Side) -> impl Iterator<Item = &Piece> {
        self.alive().filter(move |p| p.side == side)
    }

    pub fn ids_of(&self, side: Side) -> Vec<PieceId> {
        self.alive_of(side).map(|p| p.id).collect()
    }

    pub fn graveyard(&self) -> &[GraveRecord] {
        &self.graveyard
    }

    pub fn bury(&mut self, record: GraveRecord) {
        self.graveyard.push(record);
    }

    /// Remove and return a grave record.
    pub fn exhume(&mut self, id: PieceId) -> Option<GraveRecord> {
        let pos = self.graveyard.iter().rposition(|r| r.piece == id)?;
        Some(self.graveyard.remove(pos))
    }

    /// Most recently captured piece of `side`.
    pub fn latest_grave(&self, side: Side) -> Option<&GraveRecord> {
        self.graveyard.iter().rev().find(|r| r.side == side)
    }
}

#[cfg(test)]
#[path = "piece_tests.rs"]
mod piece_tests;
