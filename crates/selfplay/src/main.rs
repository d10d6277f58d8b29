//! Self-play CLI
//!
//! Run matches between players and report the results.

use cardchess_core::Player;
use random_player::RandomPlayer;
use selfplay::{MatchConfig, MatchRunner, SelfPlayResults};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn print_usage() {
    println!("Card chess self-play runner");
    println!();
    println!("Usage:");
    println!("  selfplay match <player1> <player2> [--games N] [--max-plies N] [--seed S]");
    println!("                 [--config FILE.toml] [--out FILE.json] [--quiet]");
    println!("  selfplay report <FILE.json>");
    println!();
    println!("Players:");
    println!("  random        - Uniform random legal actions (seed 0)");
    println!("  random:SEED   - Random player with a specific seed");
    println!();
    println!("Examples:");
    println!("  selfplay match random:1 random:2 --games 20");
    println!("  selfplay match random random --config match.toml --out results.json");
}

fn create_player(spec: &str) -> Result<Box<dyn Player>, String> {
    let parts: Vec<&str> = spec.split(':').collect();
    match parts[0].to_lowercase().as_str() {
        "random" | "rand" => {
            let seed = match parts.get(1) {
                Some(seed) => seed
                    .parse()
                    .map_err(|_| format!("Invalid seed in player spec: {}", spec))?,
                None => 0,
            };
            Ok(Box::new(RandomPlayer::new(seed)))
        }
        _ => Err(format!("Unknown player: {}", spec)),
    }
}

fn flag_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{} needs a value", flag))
}

fn parse_number<T: std::str::FromStr>(value: &str, flag: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid value for {}: {}", flag, value))
}

fn run_match(args: &[String]) -> Result<(), String> {
    if args.len() < 2 {
        print_usage();
        return Err("match requires two player specifications".into());
    }

    let player1_spec = &args[0];
    let player2_spec = &args[1];

    let mut config_path: Option<PathBuf> = None;
    let mut out: Option<PathBuf> = None;
    let mut games: Option<u32> = None;
    let mut max_plies: Option<u32> = None;
    let mut seed: Option<u64> = None;
    let mut quiet = false;

    let mut i = 2;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--games" | "-g" => games = Some(parse_number(flag_value(args, &mut i, flag)?, flag)?),
            "--max-plies" | "-p" => {
                max_plies = Some(parse_number(flag_value(args, &mut i, flag)?, flag)?)
            }
            "--seed" | "-s" => seed = Some(parse_number(flag_value(args, &mut i, flag)?, flag)?),
            "--config" | "-c" => config_path = Some(flag_value(args, &mut i, flag)?.into()),
            "--out" | "-o" => out = Some(flag_value(args, &mut i, flag)?.into()),
            "--quiet" | "-q" => quiet = true,
            other => return Err(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    // File settings first, then command-line overrides
    let mut config = match &config_path {
        Some(path) => MatchConfig::load(path)?,
        None => MatchConfig::default(),
    };
    if let Some(games) = games {
        config.num_games = games;
    }
    if let Some(max_plies) = max_plies {
        config.max_plies = max_plies;
    }
    if let Some(seed) = seed {
        config.seed = seed;
    }
    if quiet {
        config.verbose = false;
    }

    println!("=== Match: {} vs {} ===", player1_spec, player2_spec);
    println!(
        "Games: {}, Max plies: {}, Seed: {}",
        config.num_games, config.max_plies, config.seed
    );
    println!();

    let mut player1 = create_player(player1_spec)?;
    let mut player2 = create_player(player2_spec)?;

    let runner = MatchRunner::new(config.clone());
    let result = runner.run_match(player1.as_mut(), player2.as_mut())?;

    println!();
    println!("=== Final Result ===");
    println!(
        "{}: {} wins, {} losses, {} draws",
        player1_spec, result.wins, result.losses, result.draws
    );
    println!("Score: {:.1}%", result.score() * 100.0);

    let mut results = SelfPlayResults::new(
        &format!("{} vs {}", player1_spec, player2_spec),
        vec![player1_spec.to_string(), player2_spec.to_string()],
        config,
    );
    results.add_match(player1_spec, player2_spec, result);

    if let Some(path) = out {
        results.save(&path)?;
        println!("Results written to {}", path.display());
    }
    Ok(())
}

fn show_report(args: &[String]) -> Result<(), String> {
    let path = args.first().ok_or("report requires a results file")?;
    SelfPlayResults::load(Path::new(path))?.print_report();
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let outcome = match args[1].as_str() {
        "match" => run_match(&args[2..]),
        "report" => show_report(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            Err(format!("Unknown command: {}", other))
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
