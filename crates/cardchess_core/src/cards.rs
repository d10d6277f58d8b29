//! Card catalog.
//!
//! Cards are immutable data: a name, a rank and the effect definitions they
//! grant. Target filter, turn bucket and category are derived from the effect
//! kinds so they can never disagree with what the card actually does.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::effects::{EffectDefinition, EffectKind, TargetFilter, TurnBucket};
use crate::types::PieceKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card {}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardRank {
    Common,
    Rare,
    Legendary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardCategory {
    Effect,
    Attack,
    Defend,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub rank: CardRank,
    pub effects: Vec<EffectDefinition>,
}

impl Card {
    pub fn new(id: u32, name: &str, rank: CardRank, effects: Vec<EffectDefinition>) -> Self {
        Self {
            id: CardId(id),
            name: name.to_string(),
            rank,
            effects,
        }
    }

    pub fn kinds(&self) -> impl Iterator<Item = EffectKind> + Clone + '_ {
        self.effects.iter().map(|e| e.kind)
    }

    pub fn bucket(&self) -> TurnBucket {
        TurnBucket::classify(self.kinds())
    }

    pub fn category(&self) -> CardCategory {
        match self.bucket() {
            TurnBucket::Attack => CardCategory::Attack,
            TurnBucket::Defense => CardCategory::Defend,
            TurnBucket::Utility => CardCategory::Effect,
        }
    }

    /// Combined target filter of all bundled effects.
    pub fn target_filter(&self) -> TargetFilter {
        let mut filters = self.kinds().map(EffectKind::target);
        let Some(first) = filters.next() else {
            return TargetFilter::OwnPiece;
        };
        filters.fold(first, |acc, f| match (acc, f) {
            (a, b) if a == b => a,
            (TargetFilter::EmptySquare, _) | (_, TargetFilter::EmptySquare) => {
                TargetFilter::EmptySquare
            }
            _ => TargetFilter::EitherPiece,
        })
    }
}

fn effect(kind: EffectKind) -> EffectDefinition {
    EffectDefinition::new(kind)
}

/// The built-in card set. Ids are stable and dense starting at 0.
pub fn catalog() -> Vec<Card> {
    use CardRank::*;
    use EffectKind::*;
    vec![
        Card::new(0, "Double Step", Common, vec![effect(DoubleMove)]),
        Card::new(1, "Triple Step", Rare, vec![effect(TripleMove)]),
        Card::new(2, "Rook's Path", Common, vec![effect(StraightMove)]),
        Card::new(3, "Bishop's Path", Common, vec![effect(DiagonalMove)]),
        Card::new(4, "Straight Only", Common, vec![effect(StraightOnly)]),
        Card::new(5, "Side Step", Common, vec![effect(SidewaysStep)]),
        Card::new(6, "Retreat", Common, vec![effect(BackwardMove)]),
        Card::new(7, "Powerful", Rare, vec![effect(Jump)]),
        Card::new(8, "Phantom", Legendary, vec![effect(IgnoreBlocking)]),
        Card::new(9, "Sharp Eyes", Common, vec![effect(DiagonalAttack)]),
        Card::new(10, "Head On", Common, vec![effect(StraightAttack)]),
        Card::new(11, "Protected Ring", Rare, vec![effect(LightProtection)]),
        Card::new(12, "Iron Wall", Legendary, vec![effect(FullProtection)]),
        Card::new(13, "Blockade", Common, vec![effect(Blockade)]),
        Card::new(14, "Freeze", Rare, vec![effect(Freeze)]),
        Card::new(15, "Queen Collision", Legendary, vec![effect(DiagonalCollision)]),
        Card::new(16, "Dance", Rare, vec![effect(Dance)]),
        Card::new(17, "Nice Day", Common, vec![effect(NiceDay)]),
        Card::new(18, "Not Today", Legendary, vec![effect(NotToday)]),
        Card::new(19, "Second Life", Rare, vec![effect(SecondLife)]),
        Card::new(20, "Resurrection", Legendary, vec![effect(Resurrect)]),
        Card::new(21, "Crowning", Rare, vec![effect(InPlacePromotion)]),
        Card::new(22, "Unstoppable", Legendary, vec![effect(Unstoppable)]),
        Card::new(
            23,
            "Stand Firm",
            Rare,
            vec![effect(LightProtection).with_duration(2), effect(Blockade)],
        ),
        Card::new(
            24,
            "Charge",
            Rare,
            vec![
                effect(DoubleMove).with_duration(1),
                effect(StraightAttack).with_duration(1),
            ],
        ),
        Card::new(
            25,
            "Knight's Leap",
            Common,
            vec![
                effect(SidewaysStep).with_steps(2),
                effect(Jump).with_duration(2),
            ],
        ),
        Card::new(
            26,
            "Royal Guard",
            Legendary,
            vec![
                effect(FullProtection).with_duration(2),
                effect(Unstoppable)
                    .with_piece_kinds(vec![PieceKind::Pawn, PieceKind::Knight]),
            ],
        ),
    ]
}

pub fn card_by_name<'a>(cards: &'a [Card], name: &str) -> Option<&'a Card> {
    cards.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
#[path = "cards_tests.rs"]
mod cards_tests;
