//! Effect catalog data and capability folding.
//!
//! An [`EffectDefinition`] is immutable template data carried by cards. What a
//! piece can actually do is never stored: it is recomputed by folding the
//! piece's active effects over the base rules of its kind, so expiring an effect
//! reverts everything it granted without any bookkeeping.
//!
//! Every per-kind behaviour lives in the `match` arms of this module. Adding an
//! effect kind means adding a variant and filling in those arms.

use serde::{Deserialize, Serialize};

use crate::types::PieceKind;

/// Hard ceiling on the folded move-count bonus, however many effects stack.
pub const MAX_MOVE_BONUS: u8 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    DoubleMove,
    TripleMove,
    StraightMove,
    DiagonalMove,
    StraightOnly,
    SidewaysStep,
    BackwardMove,
    Jump,
    IgnoreBlocking,
    DiagonalAttack,
    StraightAttack,
    LightProtection,
    FullProtection,
    NotToday,
    Blockade,
    Freeze,
    DiagonalCollision,
    Dance,
    NiceDay,
    SecondLife,
    Resurrect,
    InPlacePromotion,
    Unstoppable,
}

/// Which targets an effect may be pointed at, relative to the acting side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetFilter {
    OwnPiece,
    EnemyPiece,
    EitherPiece,
    EmptySquare,
}

/// Whether playing a card ends the acting side's turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TurnBucket {
    Attack,
    Defense,
    Utility,
}

impl TurnBucket {
    /// Attack and defence plays end the turn; movement/utility plays do not.
    pub fn ends_turn(self) -> bool {
        !matches!(self, TurnBucket::Utility)
    }

    /// Classify a set of effect kinds. Attack beats Defense beats Utility.
    /// An empty set is Utility.
    pub fn classify<I>(kinds: I) -> TurnBucket
    where
        I: IntoIterator<Item = EffectKind>,
    {
        kinds
            .into_iter()
            .map(EffectKind::bucket)
            .min()
            .unwrap_or(TurnBucket::Utility)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProtectionTier {
    #[default]
    None,
    Light,
    Full,
}

impl EffectKind {
    pub const ALL: [EffectKind; 23] = [
        EffectKind::DoubleMove,
        EffectKind::TripleMove,
        EffectKind::StraightMove,
        EffectKind::DiagonalMove,
        EffectKind::StraightOnly,
        EffectKind::SidewaysStep,
        EffectKind::BackwardMove,
        EffectKind::Jump,
        EffectKind::IgnoreBlocking,
        EffectKind::DiagonalAttack,
        EffectKind::StraightAttack,
        EffectKind::LightProtection,
        EffectKind::FullProtection,
        EffectKind::NotToday,
        EffectKind::Blockade,
        EffectKind::Freeze,
        EffectKind::DiagonalCollision,
        EffectKind::Dance,
        EffectKind::NiceDay,
        EffectKind::SecondLife,
        EffectKind::Resurrect,
        EffectKind::InPlacePromotion,
        EffectKind::Unstoppable,
    ];

    pub fn bucket(self) -> TurnBucket {
        use EffectKind::*;
        match self {
            DiagonalAttack | StraightAttack | DiagonalCollision | Unstoppable | Blockade
            | Freeze | StraightOnly => TurnBucket::Attack,
            LightProtection | FullProtection | NotToday | SecondLife | Resurrect => {
                TurnBucket::Defense
            }
            DoubleMove | TripleMove | StraightMove | DiagonalMove | SidewaysStep
            | BackwardMove | Jump | IgnoreBlocking | Dance | NiceDay | InPlacePromotion => {
                TurnBucket::Utility
            }
        }
    }

    pub fn target(self) -> TargetFilter {
        use EffectKind::*;
        match self {
            Blockade | Freeze | StraightOnly => TargetFilter::EnemyPiece,
            Resurrect => TargetFilter::EmptySquare,
            _ => TargetFilter::OwnPiece,
        }
    }

    /// Reapplying an additive kind stacks instead of only refreshing.
    pub fn is_additive(self) -> bool {
        matches!(self, EffectKind::DoubleMove | EffectKind::TripleMove)
    }

    /// Instant kinds act once on application and never sit on a piece.
    pub fn is_instant(self) -> bool {
        matches!(self, EffectKind::Resurrect)
    }

    pub fn is_protection(self) -> bool {
        matches!(self, EffectKind::LightProtection | EffectKind::FullProtection)
    }

    /// Piece kinds this effect may be attached to.
    pub fn eligible_for(self, kind: PieceKind) -> bool {
        match self {
            EffectKind::InPlacePromotion => kind == PieceKind::Pawn,
            EffectKind::NotToday => kind == PieceKind::King,
            _ => true,
        }
    }

    /// Default parameter bundle for this kind.
    pub fn defaults(self) -> EffectDefinition {
        use EffectKind::*;
        let mut def = EffectDefinition {
            kind: self,
            duration: 3,
            move_bonus: 0,
            protection: ProtectionTier::None,
            steps: 1,
            max_targets: 1,
            piece_kinds: Vec::new(),
        };
        match self {
            DoubleMove => def.move_bonus = 2,
            TripleMove => {
                def.move_bonus = 3;
                def.duration = 2;
            }
            LightProtection => def.protection = ProtectionTier::Light,
            FullProtection => {
                def.protection = ProtectionTier::Full;
                def.duration = 2;
            }
            Blockade | NiceDay | IgnoreBlocking => def.duration = 1,
            Freeze | Dance | StraightOnly | Unstoppable => def.duration = 2,
            DiagonalCollision => {
                def.duration = 2;
                def.max_targets = 2;
            }
            NotToday | SecondLife | Resurrect => def.duration = 0,
            InPlacePromotion => {
                def.duration = 0;
                def.piece_kinds = vec![PieceKind::Queen];
            }
            _ => {}
        }
        if self == Unstoppable {
            def.piece_kinds = vec![
                PieceKind::Pawn,
                PieceKind::Knight,
                PieceKind::Bishop,
                PieceKind::Rook,
                PieceKind::Queen,
            ];
        }
        def
    }

    /// Grant pass: add whatever this effect contributes.
    fn grant(self, caps: &mut Capabilities, def: &EffectDefinition, stacks: u8) {
        use EffectKind::*;
        match self {
            DoubleMove | TripleMove => {
                let add = def.move_bonus.saturating_mul(stacks.max(1));
                caps.move_count_bonus = caps.move_count_bonus.saturating_add(add);
            }
            StraightMove => caps.can_move_straight = true,
            DiagonalMove => caps.can_move_diagonal = true,
            SidewaysStep => {
                caps.can_move_sideways = true;
                caps.sideways_steps = caps.sideways_steps.max(def.steps.max(1));
            }
            BackwardMove => caps.can_move_backward = true,
            Jump => caps.can_jump = true,
            IgnoreBlocking => {
                caps.can_jump = true;
                caps.ignore_blocking = true;
            }
            DiagonalAttack => caps.can_attack_diagonal = true,
            StraightAttack => caps.can_attack_straight = true,
            LightProtection | FullProtection => {
                caps.protection = caps.protection.max(def.protection);
            }
            NotToday => caps.guards_king = true,
            Blockade => caps.is_blockaded = true,
            Freeze => caps.is_frozen = true,
            DiagonalCollision => {
                caps.collision_captures = caps.collision_captures.max(def.max_targets);
            }
            Dance => caps.dance = true,
            NiceDay => caps.nice_day = true,
            SecondLife => caps.can_revive = true,
            InPlacePromotion => caps.can_promote_in_place = true,
            Unstoppable => {
                for kind in &def.piece_kinds {
                    if !caps.pierces.contains(kind) {
                        caps.pierces.push(*kind);
                    }
                }
            }
            StraightOnly | Resurrect => {}
        }
    }

    /// Restriction pass: runs after every grant so restrictions always win.
    fn restrict(self, caps: &mut Capabilities) {
        if self == EffectKind::StraightOnly {
            caps.can_move_diagonal = false;
            caps.can_attack_diagonal = false;
        }
    }
}

/// Immutable parameter bundle for one effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectDefinition {
    pub kind: EffectKind,
    /// Turns the effect lasts; `0` means until removed or consumed.
    pub duration: u32,
    pub move_bonus: u8,
    pub protection: ProtectionTier,
    pub steps: u8,
    /// Upper bound on extra pieces affected (collision captures).
    pub max_targets: u8,
    /// Kind list: pierced kinds for `Unstoppable`, promotion target for
    /// `InPlacePromotion`.
    pub piece_kinds: Vec<PieceKind>,
}

impl EffectDefinition {
    pub fn new(kind: EffectKind) -> Self {
        kind.defaults()
    }

    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_steps(mut self, steps: u8) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_max_targets(mut self, max_targets: u8) -> Self {
        self.max_targets = max_targets;
        self
    }

    pub fn with_piece_kinds(mut self, kinds: Vec<PieceKind>) -> Self {
        self.piece_kinds = kinds;
        self
    }

    /// Kind a pawn turns into under `InPlacePromotion`.
    pub fn promotion_kind(&self) -> PieceKind {
        self.piece_kinds
            .iter()
            .copied()
            .find(|k| !matches!(k, PieceKind::Pawn | PieceKind::King))
            .unwrap_or(PieceKind::Queen)
    }
}

/// Everything a piece may currently do, derived from kind plus active effects.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub can_move_straight: bool,
    pub can_move_diagonal: bool,
    pub can_attack_straight: bool,
    pub can_attack_diagonal: bool,
    pub can_move_backward: bool,
    pub can_move_sideways: bool,
    pub sideways_steps: u8,
    pub can_jump: bool,
    pub ignore_blocking: bool,
    pub move_count_bonus: u8,
    pub protection: ProtectionTier,
    pub is_frozen: bool,
    pub is_blockaded: bool,
    pub can_promote_in_place: bool,
    pub can_revive: bool,
    pub guards_king: bool,
    pub collision_captures: u8,
    pub dance: bool,
    pub nice_day: bool,
    /// Kinds whose protection this piece's attacks ignore.
    pub pierces: Vec<PieceKind>,
}

impl Capabilities {
    /// Capabilities granted by piece kind alone.
    pub fn base(kind: PieceKind) -> Self {
        let mut caps = Capabilities::default();
        match kind {
            PieceKind::Pawn => caps.can_attack_diagonal = true,
            PieceKind::Knight => {}
            PieceKind::Bishop => {
                caps.can_move_diagonal = true;
                caps.can_attack_diagonal = true;
            }
            PieceKind::Rook => {
                caps.can_move_straight = true;
                caps.can_attack_straight = true;
            }
            PieceKind::Queen | PieceKind::King => {
                caps.can_move_straight = true;
                caps.can_move_diagonal = true;
                caps.can_attack_straight = true;
                caps.can_attack_diagonal = true;
            }
        }
        caps
    }

    /// Fold `(definition, stacks)` pairs over the base capabilities of `kind`.
    pub fn fold<'a, I>(kind: PieceKind, effects: I) -> Self
    where
        I: IntoIterator<Item = (&'a EffectDefinition, u8)> + Clone,
    {
        let mut caps = Capabilities::base(kind);
        for (def, stacks) in effects.clone() {
            def.kind.grant(&mut caps, def, stacks);
        }
        for (def, _) in effects {
            def.kind.restrict(&mut caps);
        }
        caps.move_count_bonus = caps.move_count_bonus.min(MAX_MOVE_BONUS);
        caps
    }

    /// Moves the piece may make in one turn before triggered bonuses.
    pub fn moves_per_turn(&self) -> u8 {
        self.move_count_bonus.max(1)
    }

    pub fn can_move(&self) -> bool {
        !self.is_blockaded && !self.is_frozen
    }
}

#[cfg(test)]
#[path = "effects_tests.rs"]
mod effects_tests;
