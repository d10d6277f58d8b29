//! The command surface collaborators talk to.
//!
//! A [`Game`] wires the components together and runs each command to
//! completion: validate, mutate, apply the turn policy, then hand buffered
//! events to listeners. Rejected commands leave the game untouched.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::board::Board;
use crate::cards::{Card, CardId, catalog};
use crate::config::{ConfigError, GameConfig};
use crate::effects::{Capabilities, EffectKind};
use crate::engine::{EffectEngine, EffectOutcome, Target};
use crate::error::{ActionResult, RejectReason};
use crate::events::{GameEvent, GameListener, dispatch};
use crate::hand::{Hand, HandManager};
use crate::layout::{Layout, LayoutError, Placement};
use crate::movegen;
use crate::piece::{ActiveEffect, GraveRecord, Pieces};
use crate::resolver::{self, MoveOutcome};
use crate::turn::{TurnController, TurnPhase, TurnState};
use crate::types::*;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("initial deal failed: {0}")]
    Deal(RejectReason),
}

/// One command a player can issue on their turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Move { piece: PieceId, to: Square },
    PlayCard { card: CardId, target: Target },
    EndTurn,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceView {
    pub id: PieceId,
    pub kind: PieceKind,
    pub side: Side,
    pub square: Square,
    pub is_first_move: bool,
    pub effects: Vec<ActiveEffect>,
}

/// Read-only, serializable view of a whole game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub board_size: u8,
    /// Live pieces as a placement string.
    pub placement: String,
    pub pieces: Vec<PieceView>,
    pub graveyard: Vec<GraveRecord>,
    pub hands: Vec<Hand>,
    pub turn: TurnState,
    pub winner: Option<Side>,
}

pub struct Game<R = StdRng> {
    config: GameConfig,
    board: Board,
    pieces: Pieces,
    engine: EffectEngine,
    hands: HandManager,
    turn: TurnController,
    rng: R,
    winner: Option<Side>,
    /// Events of the command in progress.
    pending: Vec<GameEvent>,
    /// Delivered events not yet drained.
    log: Vec<GameEvent>,
    listeners: Vec<Box<dyn GameListener>>,
}

impl Game<StdRng> {
    /// Game with the built-in catalog and an RNG seeded from `config.seed`.
    pub fn new(config: GameConfig) -> Result<Self, SetupError> {
        let rng = StdRng::seed_from_u64(config.seed);
        Game::with_rng(config, catalog(), rng)
    }
}

impl<R: Rng> Game<R> {
    pub fn with_rng(config: GameConfig, cards: Vec<Card>, mut rng: R) -> Result<Self, SetupError> {
        config.validate()?;
        let (board, pieces) = config.layout()?.build()?;
        let mut hands = HandManager::new(cards, config.hand_limits());
        let mut log = Vec::new();
        if config.deal_on_start {
            hands
                .redistribute_all(&mut rng, 1)
                .map_err(SetupError::Deal)?;
            // No listener can be attached yet; the deal is only logged.
            log.push(GameEvent::CardsRedistributed { turn: 1 });
        }
        info!(
            board_size = board.size(),
            pieces = pieces.alive().count(),
            cards = hands.cards().len(),
            "game created"
        );

        Ok(Self {
            config,
            board,
            pieces,
            engine: EffectEngine::new(),
            hands,
            turn: TurnController::new(),
            rng,
            winner: None,
            pending: Vec::new(),
            log,
            listeners: Vec::new(),
        })
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Move a piece of the side to move.
    pub fn try_move(&mut self, piece: PieceId, to: Square) -> ActionResult<MoveOutcome> {
        self.ensure_running()?;
        let side = self.pieces.live(piece)?.side;
        self.turn.begin_action(side)?;
        if let Err(reason) = self.turn.check_piece(piece) {
            self.turn.abort_action();
            return Err(reason);
        }

        let turn = self.turn.turn_number();
        let result = resolver::execute_move(
            &mut self.board,
            &mut self.pieces,
            &mut self.engine,
            piece,
            to,
            turn,
            &mut self.pending,
        );
        let mut outcome = match result {
            Ok(outcome) => outcome,
            Err(reason) => {
                self.turn.abort_action();
                return Err(reason);
            }
        };

        if let Some(winner) = outcome.winner {
            outcome.turn_ended = true;
            self.finish_game(winner);
        } else if outcome.moves_left {
            self.turn.finish_action(false, Some(piece));
        } else {
            self.turn.finish_action(true, None);
            self.advance();
        }
        self.flush_events();
        Ok(outcome)
    }

    /// Play an active card of `side` against `target`.
    pub fn try_activate_card(
        &mut self,
        side: Side,
        card: CardId,
        target: Target,
    ) -> ActionResult<EffectOutcome> {
        self.ensure_running()?;
        self.turn.begin_action(side)?;
        let mut outcome = match self.play_card(side, card, target) {
            Ok(outcome) => outcome,
            Err(reason) => {
                self.turn.abort_action();
                return Err(reason);
            }
        };

        outcome.turn_ended = outcome.bucket.ends_turn();
        self.turn.finish_action(outcome.turn_ended, None);
        if outcome.turn_ended {
            self.advance();
        }
        self.flush_events();
        Ok(outcome)
    }

    fn play_card(&mut self, side: Side, card: CardId, target: Target) -> ActionResult<EffectOutcome> {
        let card = self.hands.playable(side, card)?.clone();
        let outcome = self.engine.activate_card_on_target(
            &mut self.board,
            &mut self.pieces,
            &card,
            side,
            target,
            self.turn.turn_number(),
            &mut self.pending,
        )?;
        self.hands.discard_played(side, card.id)?;
        self.pending.push(GameEvent::CardPlayed {
            side,
            card: card.id,
        });
        Ok(outcome)
    }

    /// Voluntarily end `side`'s turn.
    pub fn try_end_turn(&mut self, side: Side) -> ActionResult<()> {
        self.ensure_running()?;
        self.turn.end_turn(side)?;
        self.advance();
        self.flush_events();
        Ok(())
    }

    /// Run an [`Action`] for the side to move.
    pub fn apply(&mut self, action: Action) -> ActionResult<()> {
        let side = self.turn.current_side();
        match action {
            Action::Move { piece, to } => self.try_move(piece, to).map(|_| ()),
            Action::PlayCard { card, target } => {
                self.try_activate_card(side, card, target).map(|_| ())
            }
            Action::EndTurn => self.try_end_turn(side),
        }
    }

    pub fn activate_card(&mut self, side: Side, card: CardId) -> ActionResult<()> {
        self.ensure_running()?;
        self.hands.activate(side, card)
    }

    pub fn deactivate_card(&mut self, side: Side, card: CardId) -> ActionResult<()> {
        self.ensure_running()?;
        self.hands.deactivate(side, card)
    }

    pub fn add_card_to_storage(&mut self, side: Side, card: CardId) -> ActionResult<()> {
        self.ensure_running()?;
        self.hands.add_to_storage(side, card)
    }

    /// Tick every piece that carries effects, outside the normal turn flow.
    pub fn tick_all_effects(&mut self) -> ActionResult<()> {
        self.ensure_running()?;
        self.engine.tick_all_effects(&mut self.pieces, &mut self.pending);
        self.flush_events();
        Ok(())
    }

    fn ensure_running(&self) -> ActionResult<()> {
        match self.winner {
            Some(_) => Err(RejectReason::GameOver),
            None => Ok(()),
        }
    }

    fn advance(&mut self) {
        self.turn.advance_turn(
            &mut self.engine,
            &mut self.pieces,
            &mut self.hands,
            &mut self.rng,
            &mut self.pending,
        );
    }

    fn finish_game(&mut self, winner: Side) {
        self.winner = Some(winner);
        self.turn.conclude();
        info!(?winner, turn = self.turn.turn_number(), "game over");
        self.pending.push(GameEvent::GameOver { winner });
    }

    fn flush_events(&mut self) {
        let events = std::mem::take(&mut self.pending);
        for event in &events {
            for listener in &mut self.listeners {
                dispatch(listener.as_mut(), event);
            }
        }
        self.log.extend(events);
    }
}

impl<R> Game<R> {
    // =========================================================================
    // Queries
    // =========================================================================

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn pieces(&self) -> &Pieces {
        &self.pieces
    }

    pub fn piece_at(&self, sq: Square) -> Option<PieceId> {
        self.board.piece_at(sq)
    }

    pub fn legal_destinations(&self, piece: PieceId) -> Vec<Square> {
        movegen::legal_destinations(&self.board, &self.pieces, piece)
    }

    pub fn effective_capabilities(&self, piece: PieceId) -> Option<Capabilities> {
        self.pieces.get(piece).map(|p| p.capabilities())
    }

    pub fn active_effects(&self, piece: PieceId) -> &[ActiveEffect] {
        self.pieces.get(piece).map(|p| p.effects()).unwrap_or(&[])
    }

    pub fn hand(&self, side: Side) -> &Hand {
        self.hands.hand(side)
    }

    pub fn hands(&self) -> &HandManager {
        &self.hands
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.hands.card(id)
    }

    pub fn effect_engine(&self) -> &EffectEngine {
        &self.engine
    }

    pub fn turn_state(&self) -> &TurnState {
        self.turn.state()
    }

    pub fn current_side(&self) -> Side {
        self.turn.current_side()
    }

    pub fn turn_number(&self) -> u32 {
        self.turn.turn_number()
    }

    pub fn phase(&self) -> TurnPhase {
        self.turn.phase()
    }

    pub fn is_turn_of(&self, side: Side) -> bool {
        self.winner.is_none() && self.turn.is_turn_of(side)
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn add_listener(&mut self, listener: Box<dyn GameListener>) {
        self.listeners.push(listener);
    }

    /// Take every event delivered so far.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.log)
    }

    /// Targets `card` can be played on by `side` with at least one effect landing.
    pub fn card_targets(&self, side: Side, card: CardId) -> Vec<Target> {
        let Some(card) = self.hands.card(card) else {
            return Vec::new();
        };
        let mut candidates: Vec<Target> = self.pieces.iter().map(|p| Target::Piece(p.id)).collect();
        if card.kinds().any(EffectKind::is_instant) {
            let size = self.board.size();
            for rank in 0..size {
                for file in 0..size {
                    let sq = Square::new(file, rank);
                    if self.board.is_empty(sq) {
                        candidates.push(Target::Square(sq));
                    }
                }
            }
        }

        let turn = self.turn.turn_number();
        candidates.retain(|target| {
            card.effects.iter().any(|def| {
                self.engine
                    .can_apply_effect_to_target(&self.board, &self.pieces, def, side, *target, turn)
                    .is_ok()
            })
        });
        candidates
    }

    /// Every action the side to move may take right now.
    pub fn legal_actions(&self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.winner.is_some() {
            return actions;
        }
        let side = self.turn.current_side();

        for piece in self.pieces.alive_of(side) {
            if self.turn.check_piece(piece.id).is_err() || piece.can_move_this_turn().is_err() {
                continue;
            }
            for to in movegen::legal_destinations(&self.board, &self.pieces, piece.id) {
                actions.push(Action::Move { piece: piece.id, to });
            }
        }
        for &card in &self.hands.hand(side).active {
            for target in self.card_targets(side, card) {
                actions.push(Action::PlayCard { card, target });
            }
        }
        if self.turn.state().acted || actions.is_empty() {
            actions.push(Action::EndTurn);
        }
        actions
    }

    /// Every live piece sits on exactly the board cell that names it.
    pub fn verify_occupancy(&self) -> bool {
        let live = self.pieces.alive().count();
        self.board.occupied().count() == live
            && self
                .pieces
                .alive()
                .all(|p| self.board.piece_at(p.square) == Some(p.id))
            && self
                .board
                .occupied()
                .all(|(sq, id)| self.pieces.get(id).is_some_and(|p| p.is_alive && p.square == sq))
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let pieces: Vec<PieceView> = self
            .pieces
            .alive()
            .map(|p| PieceView {
                id: p.id,
                kind: p.kind,
                side: p.side,
                square: p.square,
                is_first_move: p.is_first_move,
                effects: p.effects().to_vec(),
            })
            .collect();
        let layout = Layout {
            size: self.board.size(),
            placements: pieces
                .iter()
                .map(|p| Placement {
                    kind: p.kind,
                    side: p.side,
                    square: p.square,
                })
                .collect(),
        };

        GameSnapshot {
            board_size: self.board.size(),
            placement: layout.to_placement(),
            pieces,
            graveyard: self.pieces.graveyard().to_vec(),
            hands: Side::ALL.iter().map(|s| self.hands.hand(*s).clone()).collect(),
            turn: self.turn.state().clone(),
            winner: self.winner,
        }
    }
}

#[cfg(test)]
#[path = "game_tests.rs"]
mod game_tests;
