pub mod board;
pub mod cards;
pub mod config;
pub mod effects;
pub mod engine;
pub mod error;
pub mod events;
pub mod game;
pub mod hand;
pub mod layout;
pub mod movegen;
pub mod piece;
pub mod resolver;
pub mod turn;
pub mod types;

// Re-export the rules engine surface
pub use board::*;
pub use cards::*;
pub use config::{ConfigError, GameConfig};
pub use effects::*;
pub use engine::{EffectEngine, EffectOutcome, EffectResult, Target};
pub use error::*;
pub use events::{GameEvent, GameListener};
pub use game::*;
pub use hand::{Hand, HandLimits, HandManager};
pub use layout::{Layout, LayoutError, Placement};
pub use movegen::{can_capture, legal_destinations};
pub use piece::*;
pub use resolver::MoveOutcome;
pub use turn::{TurnController, TurnPhase, TurnState};
pub use types::*;

// =============================================================================
// Player trait — implemented by everything that picks actions for a side
// =============================================================================

/// Something that decides what the side to move does next.
///
/// Players only see the game through shared references; the caller applies
/// the chosen action, so a player can never mutate the game out of turn.
pub trait Player {
    /// Pick an action for `game.current_side()`, or `None` to resign.
    fn choose_action(&mut self, game: &Game) -> Option<Action>;

    fn name(&self) -> &str;

    /// Reset internal state before a new game.
    fn new_game(&mut self) {}
}
