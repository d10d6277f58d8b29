//! Self-play runner for card chess
//!
//! This crate provides infrastructure for:
//! - Running matches between players
//! - Saving match results as JSON
//! - Generating text reports
//!
//! # Usage
//!
//! ```bash
//! # Twenty games between two differently seeded random players
//! cargo run -p selfplay -- match random:1 random:2 --games 20
//!
//! # Settings from a TOML file, results written to disk
//! cargo run -p selfplay -- match random random --config match.toml --out results.json
//! ```

mod match_runner;
mod results;

pub use match_runner::*;
pub use results::*;
