// Batch simulator: many seeded bot-versus-bot games in parallel
//
// Usage:
//   cargo run --release --bin simulate -- [options]
//
// Options:
//   --games <n>            Number of games (default from Duel.toml)
//   --first-seed <n>       Seed of the first game; game k uses first_seed + k
//   --level <name|path>    Level to play on
//   --bot1 <name|uuid>     Bot for player 1
//   --bot2 <name|uuid>     Bot for player 2
//   --config <path>        Path to Duel.toml (default: Duel.toml)

use std::env;
use std::process;
use std::sync::Arc;
use std::time::Instant;

use snake_duel::bot::BotRegistry;
use snake_duel::config::Config;
use snake_duel::levels;
use snake_duel::simulator::{SimulationSummary, Simulator};

fn print_usage() {
    eprintln!("Snake Duel Simulator");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  simulate [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --games <n>             Number of games");
    eprintln!("  --first-seed <n>        Seed of the first game");
    eprintln!("  --level <name|path>     Level to play on");
    eprintln!("  --bot1 <name|uuid>      Bot for player 1");
    eprintln!("  --bot2 <name|uuid>      Bot for player 2");
    eprintln!("  --config <path>         Path to Duel.toml (default: Duel.toml)");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("AVAILABLE BOTS:");
    for info in BotRegistry::default().infos() {
        eprintln!("  {:<12} {}", info.name, info.id);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.contains(&"--help".to_string()) {
        print_usage();
        process::exit(0);
    }

    let mut config_path = "Duel.toml".to_string();
    let mut games: Option<usize> = None;
    let mut first_seed: Option<u64> = None;
    let mut level_arg: Option<String> = None;
    let mut bot1: Option<String> = None;
    let mut bot2: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let Some(value) = args.get(i + 1) else {
            eprintln!("Error: {} requires an argument", flag);
            process::exit(1);
        };
        match flag {
            "--games" => {
                games = Some(value.parse().unwrap_or_else(|e| {
                    eprintln!("Error: invalid game count '{}': {}", value, e);
                    process::exit(1);
                }))
            }
            "--first-seed" => {
                first_seed = Some(value.parse().unwrap_or_else(|e| {
                    eprintln!("Error: invalid seed '{}': {}", value, e);
                    process::exit(1);
                }))
            }
            "--level" => level_arg = Some(value.clone()),
            "--bot1" => bot1 = Some(value.clone()),
            "--bot2" => bot2 = Some(value.clone()),
            "--config" => config_path = value.clone(),
            _ => {
                eprintln!("Error: Unknown option '{}'", flag);
                print_usage();
                process::exit(1);
            }
        }
        i += 2;
    }

    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });

    let games = games.unwrap_or(config.simulation.games);
    let first_seed = first_seed.unwrap_or(config.simulation.first_seed);
    let level_name = level_arg.unwrap_or_else(|| config.game.default_level.clone());
    let bot1 = bot1.unwrap_or_else(|| config.game.player1_bot.clone());
    let bot2 = bot2.unwrap_or_else(|| config.game.player2_bot.clone());

    let level = match levels::resolve_level(&level_name) {
        Ok(level) => Arc::new(level),
        Err(e) => {
            eprintln!("Error loading level '{}': {}", level_name, e);
            process::exit(1);
        }
    };

    println!(
        "Running {} games on '{}': {} vs {}",
        games,
        level.name(),
        bot1,
        bot2
    );

    let simulator = Simulator::new(config, BotRegistry::default(), level).with_bots(&bot1, &bot2);
    let start = Instant::now();
    let outcomes = match simulator.run_batch(Simulator::seed_range(first_seed, games)) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    SimulationSummary::from_outcomes(&outcomes).print_report();
    println!("Finished in {:.2}s", start.elapsed().as_secs_f64());
}
