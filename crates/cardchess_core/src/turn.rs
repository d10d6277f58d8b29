//! Turn sequencing.
//!
//! The controller owns only the turn state. Advancing a turn issues commands
//! to the effect engine and the hand manager; it never touches pieces or cards
//! directly.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::EffectEngine;
use crate::error::{ActionResult, RejectReason};
use crate::events::GameEvent;
use crate::hand::HandManager;
use crate::piece::Pieces;
use crate::types::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    #[default]
    WaitingForAction,
    ActionResolving,
    TurnEnding,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub current_side: Side,
    /// Starts at 1; increments when play returns to `Side::First`.
    pub turn_number: u32,
    pub phase: TurnPhase,
    /// Piece that still has moves left and alone may move for the rest of the turn.
    pub locked_piece: Option<PieceId>,
    /// Whether the side to move has done anything yet this turn.
    pub acted: bool,
}

impl Default for TurnState {
    fn default() -> Self {
        Self {
            current_side: Side::First,
            turn_number: 1,
            phase: TurnPhase::WaitingForAction,
            locked_piece: None,
            acted: false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TurnController {
    state: TurnState,
}

impl TurnController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TurnState {
        &self.state
    }

    pub fn current_side(&self) -> Side {
        self.state.current_side
    }

    pub fn turn_number(&self) -> u32 {
        self.state.turn_number
    }

    pub fn phase(&self) -> TurnPhase {
        self.state.phase
    }

    pub fn locked_piece(&self) -> Option<PieceId> {
        self.state.locked_piece
    }

    pub fn is_turn_of(&self, side: Side) -> bool {
        self.state.current_side == side && self.state.phase == TurnPhase::WaitingForAction
    }

    /// Reject a move of `piece` while another piece holds the turn.
    pub fn check_piece(&self, piece: PieceId) -> ActionResult<()> {
        match self.state.locked_piece {
            Some(locked) if locked != piece => Err(RejectReason::PieceLocked(locked)),
            _ => Ok(()),
        }
    }

    /// `WaitingForAction -> ActionResolving` for `side`.
    pub fn begin_action(&mut self, side: Side) -> ActionResult<()> {
        if !self.is_turn_of(side) {
            return Err(RejectReason::NotYourTurn);
        }
        self.state.phase = TurnPhase::ActionResolving;
        Ok(())
    }

    /// Back to `WaitingForAction` after a rejected action.
    pub fn abort_action(&mut self) {
        if self.state.phase == TurnPhase::ActionResolving {
            self.state.phase = TurnPhase::WaitingForAction;
        }
    }

    /// Leave `ActionResolving`. When the side keeps acting, `continuing`
    /// locks further moves to that piece.
    pub fn finish_action(&mut self, ends_turn: bool, continuing: Option<PieceId>) {
        self.state.acted = true;
        if ends_turn {
            self.state.phase = TurnPhase::TurnEnding;
        } else {
            self.state.phase = TurnPhase::WaitingForAction;
            if continuing.is_some() {
                self.state.locked_piece = continuing;
            }
        }
    }

    /// Voluntary end of turn: `WaitingForAction -> TurnEnding`.
    pub fn end_turn(&mut self, side: Side) -> ActionResult<()> {
        self.begin_action(side)?;
        self.state.phase = TurnPhase::TurnEnding;
        Ok(())
    }

    /// `TurnEnding -> WaitingForAction` for the next side.
    ///
    /// Ticks the effects of the side whose turn ended, flips the side, bumps
    /// the turn number on the wrap to `Side::First` and runs the periodic
    /// redistribution check.
    pub fn advance_turn<R: Rng + ?Sized>(
        &mut self,
        engine: &mut EffectEngine,
        pieces: &mut Pieces,
        hands: &mut HandManager,
        rng: &mut R,
        events: &mut Vec<GameEvent>,
    ) {
        let ending = self.state.current_side;
        engine.tick_side(pieces, ending, events);

        let next = ending.other();
        self.state.current_side = next;
        if next == Side::First {
            self.state.turn_number += 1;
            if hands.maybe_redistribute(rng, self.state.turn_number) {
                events.push(GameEvent::CardsRedistributed {
                    turn: self.state.turn_number,
                });
            }
        }
        self.state.phase = TurnPhase::WaitingForAction;
        self.state.locked_piece = None;
        self.state.acted = false;

        info!(side = ?next, turn = self.state.turn_number, "turn changed");
        events.push(GameEvent::TurnChanged {
            side: next,
            turn: self.state.turn_number,
        });
    }

    /// Freeze the controller once the game is decided.
    pub(crate) fn conclude(&mut self) {
        self.state.phase = TurnPhase::TurnEnding;
        self.state.locked_piece = None;
    }
}

#[cfg(test)]
#[path = "turn_tests.rs"]
mod turn_tests;
