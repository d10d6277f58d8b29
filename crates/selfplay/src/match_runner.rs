//! Match runner for playing games between players

use std::path::Path;

use cardchess_core::{Game, GameConfig, Player, Side};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Result of a single game, from one player's point of view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameResult {
    Win,
    Loss,
    Draw,
}

impl GameResult {
    pub fn flipped(self) -> Self {
        match self {
            GameResult::Win => GameResult::Loss,
            GameResult::Loss => GameResult::Win,
            GameResult::Draw => GameResult::Draw,
        }
    }
}

/// How a game finished
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Termination {
    KingCaptured,
    Resigned,
    IllegalAction,
    PlyLimit,
}

/// One finished game, recorded from player 1's point of view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameRecord {
    pub game: u32,
    pub seed: u64,
    pub player1_side: Side,
    pub result: GameResult,
    pub termination: Termination,
    pub plies: u32,
    pub turns: u32,
}

/// Result of a match (multiple games)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub games: Vec<GameRecord>,
}

impl MatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_games(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    /// Score from player 1's perspective (1 for win, 0.5 for draw, 0 for loss)
    pub fn score(&self) -> f64 {
        let total = self.total_games() as f64;
        if total == 0.0 {
            return 0.5;
        }
        (self.wins as f64 + 0.5 * self.draws as f64) / total
    }

    fn record(&mut self, game: GameRecord) {
        match game.result {
            GameResult::Win => self.wins += 1,
            GameResult::Loss => self.losses += 1,
            GameResult::Draw => self.draws += 1,
        }
        self.games.push(game);
    }
}

/// Configuration for a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Number of games to play
    pub num_games: u32,
    /// Maximum plies (actions) per game before declaring a draw
    pub max_plies: u32,
    /// Seed of the first game; game `n` uses `seed + n`
    pub seed: u64,
    /// Whether to alternate sides each game
    pub alternate_sides: bool,
    /// Print progress during match
    pub verbose: bool,
    /// Rules settings shared by every game
    pub game: GameConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            num_games: 10,
            max_plies: 400,
            seed: 0,
            alternate_sides: true,
            verbose: true,
            game: GameConfig::default(),
        }
    }
}

impl MatchConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, String> {
        let config: MatchConfig =
            toml::from_str(text).map_err(|e| format!("Failed to parse: {}", e))?;
        config.game.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| format!("Failed to read: {}", e))?;
        Self::from_toml_str(&contents)
    }

    fn game_config(&self, game_num: u32) -> GameConfig {
        GameConfig {
            seed: self.seed.wrapping_add(game_num as u64),
            ..self.game.clone()
        }
    }
}

/// Runs matches between two players
pub struct MatchRunner {
    config: MatchConfig,
}

impl MatchRunner {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Run a match between two players
    ///
    /// Returns the result from player1's perspective
    pub fn run_match(
        &self,
        player1: &mut dyn Player,
        player2: &mut dyn Player,
    ) -> Result<MatchResult, String> {
        let mut result = MatchResult::new();
        info!(
            player1 = player1.name(),
            player2 = player2.name(),
            games = self.config.num_games,
            "match started"
        );

        for game_num in 0..self.config.num_games {
            let player1_first = !self.config.alternate_sides || game_num % 2 == 0;
            let config = self.config.game_config(game_num);
            let seed = config.seed;

            let (outcome, termination, plies, turns) = if player1_first {
                self.play_game(config, player1, player2)?
            } else {
                let (outcome, termination, plies, turns) =
                    self.play_game(config, player2, player1)?;
                (outcome.flipped(), termination, plies, turns)
            };

            let record = GameRecord {
                game: game_num,
                seed,
                player1_side: if player1_first { Side::First } else { Side::Second },
                result: outcome,
                termination,
                plies,
                turns,
            };
            debug!(?record, "game finished");
            result.record(record);

            if self.config.verbose {
                let side = if player1_first { "F" } else { "S" };
                let score = match outcome {
                    GameResult::Win => "1-0",
                    GameResult::Loss => "0-1",
                    GameResult::Draw => "1/2",
                };
                println!(
                    "Game {}/{}: {} ({}, {:?} after {} plies) - Score: {}-{}-{}",
                    game_num + 1,
                    self.config.num_games,
                    score,
                    side,
                    termination,
                    plies,
                    result.wins,
                    result.losses,
                    result.draws
                );
            }
        }

        info!(
            wins = result.wins,
            losses = result.losses,
            draws = result.draws,
            "match finished"
        );
        Ok(result)
    }

    /// Play a single game; the result is from `first`'s perspective.
    fn play_game(
        &self,
        config: GameConfig,
        first: &mut dyn Player,
        second: &mut dyn Player,
    ) -> Result<(GameResult, Termination, u32, u32), String> {
        let mut game = Game::new(config).map_err(|e| e.to_string())?;
        first.new_game();
        second.new_game();

        let from_first = |side: Side| {
            if side == Side::First {
                GameResult::Win
            } else {
                GameResult::Loss
            }
        };

        for ply in 0..self.config.max_plies {
            let side = game.current_side();
            let player: &mut dyn Player = if side == Side::First {
                &mut *first
            } else {
                &mut *second
            };

            let Some(action) = player.choose_action(&game) else {
                debug!(?side, ply, "player resigned");
                return Ok((
                    from_first(side.other()),
                    Termination::Resigned,
                    ply,
                    game.turn_number(),
                ));
            };

            if let Err(reason) = game.apply(action) {
                warn!(?side, ?action, %reason, "player chose an illegal action");
                return Ok((
                    from_first(side.other()),
                    Termination::IllegalAction,
                    ply,
                    game.turn_number(),
                ));
            }

            if let Some(winner) = game.winner() {
                return Ok((
                    from_first(winner),
                    Termination::KingCaptured,
                    ply + 1,
                    game.turn_number(),
                ));
            }
        }

        Ok((
            GameResult::Draw,
            Termination::PlyLimit,
            self.config.max_plies,
            game.turn_number(),
        ))
    }
}

/// Quick utility to run a single match with default settings
pub fn quick_match(
    player1: &mut dyn Player,
    player2: &mut dyn Player,
    num_games: u32,
    seed: u64,
) -> Result<MatchResult, String> {
    let config = MatchConfig {
        num_games,
        seed,
        verbose: false,
        ..Default::default()
    };
    MatchRunner::new(config).run_match(player1, player2)
}

#[cfg(test)]
#[path = "match_runner_tests.rs"]
mod match_runner_tests;
