//! Notifications for presentation, networking and logging layers.
//!
//! Events are queued while a command resolves and handed to listeners only
//! after the command has fully completed, so a listener never observes a
//! half-applied state and cannot re-enter the game mid-mutation.

use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::effects::EffectKind;
use crate::types::*;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    TurnChanged {
        side: Side,
        turn: u32,
    },
    PieceMoved {
        piece: PieceId,
        from: Square,
        to: Square,
    },
    PieceCaptured {
        piece: PieceId,
        by: PieceId,
        square: Square,
    },
    PiecePromoted {
        piece: PieceId,
        kind: PieceKind,
    },
    PieceRevived {
        piece: PieceId,
        square: Square,
    },
    AttackRepelled {
        attacker: PieceId,
        king: PieceId,
        pushed_to: Square,
    },
    EffectApplied {
        piece: PieceId,
        kind: EffectKind,
    },
    EffectExpired {
        piece: PieceId,
        kind: EffectKind,
    },
    CardPlayed {
        side: Side,
        card: CardId,
    },
    CardsRedistributed {
        turn: u32,
    },
    GameOver {
        winner: Side,
    },
}

/// Observer of game events. Every method has a no-op default.
pub trait GameListener {
    fn on_turn_changed(&mut self, _side: Side, _turn: u32) {}
    fn on_piece_captured(&mut self, _piece: PieceId) {}
    fn on_effect_applied(&mut self, _piece: PieceId, _kind: EffectKind) {}
    fn on_effect_expired(&mut self, _piece: PieceId, _kind: EffectKind) {}
    fn on_cards_redistributed(&mut self) {}

    /// Sees every event, including the ones with a dedicated hook.
    fn on_event(&mut self, _event: &GameEvent) {}
}

pub(crate) fn dispatch(listener: &mut dyn GameListener, event: &GameEvent) {
    match *event {
        GameEvent::TurnChanged { side, turn } => listener.on_turn_changed(side, turn),
        GameEvent::PieceCaptured { piece, .. } => listener.on_piece_captured(piece),
        GameEvent::EffectApplied { piece, kind } => listener.on_effect_applied(piece, kind),
        GameEvent::EffectExpired { piece, kind } => listener.on_effect_expired(piece, kind),
        GameEvent::CardsRedistributed { .. } => listener.on_cards_redistributed(),
        _ => {}
    }
    listener.on_event(event);
}
