//! Random Action Player
//!
//! Picks uniformly from everything the side to move may legally do:
//! piece moves, card plays and (once it has acted) ending the turn.
//! Useful for:
//! - Driving self-play before any real strategy exists
//! - Baseline comparisons
//! - Stress testing the rules engine

use cardchess_core::{Action, Game, Player};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;


/// A player that chooses random legal actions.
///
/// Seeded, so a given seed replays the same game against the same opponent.
#[derive(Debug, Clone)]
pub struct RandomPlayer {
    seed: u64,
    rng: StdRng,
    decisions: u64,
}

impl RandomPlayer {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            decisions: 0,
        }
    }

    /// Number of actions chosen since the last `new_game`.
    pub fn decisions(&self) -> u64 {
        self.decisions
    }
}

impl Default for RandomPlayer {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Player for RandomPlayer {
    fn choose_action(&mut self, game: &Game) -> Option<Action> {
        let actions = game.legal_actions();
        let choice = actions.choose(&mut self.rng).copied();
        if choice.is_some() {
            self.decisions += 1;
        }
        choice
    }

    fn name(&self) -> &str {
        "Random v1.0"
    }

    fn new_game(&mut self) {
        self.decisions = 0;
        self.seed = self.seed.wrapping_add(1);
        self.rng = StdRng::seed_from_u64(self.seed);
    }
}
