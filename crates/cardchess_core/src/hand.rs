//! Per-side hands and the shared card pool.
//!
//! Hands hold card ids; the card data itself stays in the immutable catalog
//! owned by the manager.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cards::{Card, CardId};
use crate::error::{ActionResult, RejectReason};
use crate::types::Side;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    /// Cards that can be played.
    pub active: Vec<CardId>,
    pub storage: Vec<CardId>,
}

impl Hand {
    pub fn contains(&self, card: CardId) -> bool {
        self.active.contains(&card) || self.storage.contains(&card)
    }
}

/// Capacity limits for one game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandLimits {
    pub active_capacity: usize,
    pub storage_capacity: usize,
    pub active_per_side: usize,
    /// Turns between periodic redistributions; `0` disables them.
    pub redistribution_interval: u32,
}

impl Default for HandLimits {
    fn default() -> Self {
        Self {
            active_capacity: 3,
            storage_capacity: 5,
            active_per_side: 3,
            redistribution_interval: 5,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HandManager {
    cards: Vec<Card>,
    hands: [Hand; 2],
    /// Cards in no hand and not yet played.
    reserve: Vec<CardId>,
    discard: Vec<CardId>,
    limits: HandLimits,
    last_redistribution: u32,
}

impl HandManager {
    /// All `cards` start in the reserve.
    pub fn new(cards: Vec<Card>, limits: HandLimits) -> Self {
        let reserve = cards.iter().map(|c| c.id).collect();
        Self {
            cards,
            hands: [Hand::default(), Hand::default()],
            reserve,
            discard: Vec::new(),
            limits,
            last_redistribution: 0,
        }
    }

    pub fn hand(&self, side: Side) -> &Hand {
        &self.hands[side.idx()]
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn reserve(&self) -> &[CardId] {
        &self.reserve
    }

    pub fn discard(&self) -> &[CardId] {
        &self.discard
    }

    pub fn limits(&self) -> HandLimits {
        self.limits
    }

    pub fn last_redistribution(&self) -> u32 {
        self.last_redistribution
    }

    /// Move a card from storage to the active list.
    pub fn activate(&mut self, side: Side, card: CardId) -> ActionResult<()> {
        let cap = self.limits.active_capacity;
        let hand = &mut self.hands[side.idx()];
        let pos = hand
            .storage
            .iter()
            .position(|c| *c == card)
            .ok_or(RejectReason::CardNotInHand)?;
        if hand.active.len() >= cap {
            return Err(RejectReason::HandCapacityExceeded);
        }
        hand.storage.remove(pos);
        hand.active.push(card);
        Ok(())
    }

    /// Move a card from the active list back to storage.
    pub fn deactivate(&mut self, side: Side, card: CardId) -> ActionResult<()> {
        let cap = self.limits.storage_capacity;
        let hand = &mut self.hands[side.idx()];
        let pos = hand
            .active
            .iter()
            .position(|c| *c == card)
            .ok_or(RejectReason::CardNotInHand)?;
        if hand.storage.len() >= cap {
            return Err(RejectReason::HandCapacityExceeded);
        }
        hand.active.remove(pos);
        hand.storage.push(card);
        Ok(())
    }

    /// Put a card from the reserve or discard into `side`'s storage.
    pub fn add_to_storage(&mut self, side: Side, card: CardId) -> ActionResult<()> {
        if self.card(card).is_none() {
            return Err(RejectReason::InvalidTarget);
        }
        if self.hands.iter().any(|h| h.contains(card)) {
            return Err(RejectReason::InvalidTarget);
        }
        if self.hands[side.idx()].storage.len() >= self.limits.storage_capacity {
            return Err(RejectReason::HandCapacityExceeded);
        }
        self.reserve.retain(|c| *c != card);
        self.discard.retain(|c| *c != card);
        self.hands[side.idx()].storage.push(card);
        Ok(())
    }

    /// A card `side` may play right now.
    pub fn playable(&self, side: Side, card: CardId) -> ActionResult<&Card> {
        if !self.hand(side).active.contains(&card) {
            return Err(RejectReason::CardNotInHand);
        }
        self.card(card).ok_or(RejectReason::CardNotInHand)
    }

    /// Move a played card from the active list to the discard pile.
    pub fn discard_played(&mut self, side: Side, card: CardId) -> ActionResult<()> {
        let hand = &mut self.hands[side.idx()];
        let pos = hand
            .active
            .iter()
            .position(|c| *c == card)
            .ok_or(RejectReason::CardNotInHand)?;
        hand.active.remove(pos);
        self.discard.push(card);
        Ok(())
    }

    /// Clear both hands and deal `pool` afresh.
    ///
    /// Each side gets `active_per_side` active cards, dealt alternately; the
    /// rest alternate into storage until both are full and the overflow goes
    /// to the reserve.
    pub fn redistribute<R: Rng + ?Sized>(
        &mut self,
        pool: &[CardId],
        rng: &mut R,
    ) -> ActionResult<()> {
        let per_side = self.limits.active_per_side;
        if pool.len() < per_side * 2 {
            return Err(RejectReason::CardPoolExhausted);
        }

        let mut deck = pool.to_vec();
        deck.shuffle(rng);
        let mut deck = deck.into_iter();

        self.hands = [Hand::default(), Hand::default()];
        for i in 0..per_side * 2 {
            if let Some(card) = deck.next() {
                self.hands[i % 2].active.push(card);
            }
        }

        self.reserve.clear();
        self.discard.clear();
        let mut side = 0;
        for card in deck {
            let cap = self.limits.storage_capacity;
            if self.hands[side].storage.len() < cap {
                self.hands[side].storage.push(card);
            } else if self.hands[1 - side].storage.len() < cap {
                self.hands[1 - side].storage.push(card);
            } else {
                self.reserve.push(card);
            }
            side = 1 - side;
        }
        Ok(())
    }

    /// Redistribute every card the game was created with.
    pub fn redistribute_all<R: Rng + ?Sized>(&mut self, rng: &mut R, turn: u32) -> ActionResult<()> {
        let pool: Vec<CardId> = self.cards.iter().map(|c| c.id).collect();
        self.redistribute(&pool, rng)?;
        self.last_redistribution = turn;
        info!(turn, cards = pool.len(), "cards redistributed");
        Ok(())
    }

    pub fn should_redistribute(&self, turn: u32) -> bool {
        let interval = self.limits.redistribution_interval;
        interval > 0 && turn.saturating_sub(self.last_redistribution) >= interval
    }

    /// Periodic check run by the turn controller. Returns whether cards were dealt.
    pub fn maybe_redistribute<R: Rng + ?Sized>(&mut self, rng: &mut R, turn: u32) -> bool {
        if !self.should_redistribute(turn) {
            return false;
        }
        match self.redistribute_all(rng, turn) {
            Ok(()) => true,
            Err(reason) => {
                warn!(turn, %reason, "redistribution skipped");
                self.last_redistribution = turn;
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "hand_tests.rs"]
mod hand_tests;
