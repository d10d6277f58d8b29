//! Rejection reasons for every mutating command.
//!
//! Nothing in the core panics on bad input: each command returns one of these
//! and leaves state untouched, so the caller decides how to give feedback.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{PieceId, Square};

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RejectReason {
    #[error("invalid target")]
    InvalidTarget,
    #[error("square {0} is outside the board")]
    OutOfBounds(Square),
    #[error("square {0} is already occupied")]
    SquareOccupied(Square),
    #[error("destination is occupied by an allied piece")]
    SquareOccupiedByAlly,
    #[error("path is blocked")]
    PathBlocked,
    #[error("destination is not reachable by this piece")]
    UnreachableSquare,
    #[error("target is protected from this attacker")]
    ProtectionPrevents,
    #[error("piece has no moves left this turn")]
    NoRemainingMoves,
    #[error("piece is blockaded")]
    Blockaded,
    #[error("it is not this side's turn")]
    NotYourTurn,
    #[error("hand capacity exceeded")]
    HandCapacityExceeded,
    #[error("card is not in the expected hand list")]
    CardNotInHand,
    #[error("effect cannot be applied to this target")]
    EffectIneligible,
    #[error("not enough cards to distribute")]
    CardPoolExhausted,
    #[error("only piece {0} may act for the rest of this turn")]
    PieceLocked(PieceId),
    #[error("the game is over")]
    GameOver,
}

/// Result type alias for core commands.
pub type ActionResult<T> = Result<T, RejectReason>;
