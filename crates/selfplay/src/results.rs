//! Self-play results storage and reporting

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::match_runner::{MatchConfig, MatchResult, Termination};

/// Everything one invocation of the runner produced
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelfPlayResults {
    /// Name/description of the run
    pub name: String,
    pub participants: Vec<String>,
    pub matches: Vec<MatchEntry>,
    /// Configuration used
    pub config: MatchConfig,
}

/// A single match entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchEntry {
    pub player1: String,
    pub player2: String,
    pub result: MatchResult,
}

impl SelfPlayResults {
    pub fn new(name: &str, participants: Vec<String>, config: MatchConfig) -> Self {
        Self {
            name: name.to_string(),
            participants,
            matches: Vec::new(),
            config,
        }
    }

    pub fn add_match(&mut self, player1: &str, player2: &str, result: MatchResult) {
        self.matches.push(MatchEntry {
            player1: player1.to_string(),
            player2: player2.to_string(),
            result,
        });
    }

    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize: {}", e))?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write: {}", e))
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> Result<Self, String> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| format!("Failed to read: {}", e))?;
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse: {}", e))
    }

    /// Generate a text report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();
        report.push_str(&format!("=== Self-play: {} ===\n\n", self.name));
        report.push_str(&format!("Participants: {}\n", self.participants.join(", ")));
        report.push_str(&format!(
            "Config: {} games/match, {} plies max, seed {}\n\n",
            self.config.num_games, self.config.max_plies, self.config.seed
        ));

        report.push_str("Results:\n");
        report.push_str(&format!(
            "{:<20} vs {:<20} {:>5}-{:<5}-{:<5} {:>8}\n",
            "Player 1", "Player 2", "W", "L", "D", "Captures"
        ));
        report.push_str(&"-".repeat(70));
        report.push('\n');

        for entry in &self.matches {
            let decisive = entry
                .result
                .games
                .iter()
                .filter(|g| g.termination == Termination::KingCaptured)
                .count();
            report.push_str(&format!(
                "{:<20} vs {:<20} {:>5}-{:<5}-{:<5} {:>8}\n",
                entry.player1,
                entry.player2,
                entry.result.wins,
                entry.result.losses,
                entry.result.draws,
                decisive
            ));
        }

        let plies: u32 = self
            .matches
            .iter()
            .flat_map(|m| &m.result.games)
            .map(|g| g.plies)
            .sum();
        let games: u32 = self.matches.iter().map(|m| m.result.total_games()).sum();
        if games > 0 {
            report.push_str(&format!(
                "\nAverage game length: {:.1} plies\n",
                plies as f64 / games as f64
            ));
        }

        report
    }

    /// Print report to stdout
    pub fn print_report(&self) {
        println!("{}", self.generate_report());
    }
}

#[cfg(test)]
#[path = "results_tests.rs"]
mod results_tests;
