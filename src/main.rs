// Plays a single bot-versus-bot game and optionally records it
//
// Usage:
//   cargo run --bin snake-duel -- [options]
//
// Options:
//   --level <name|path>    Built-in level name or level TOML file
//   --seed <n>             Food and bot seed
//   --bot1 <name|uuid>     Bot for player 1
//   --bot2 <name|uuid>     Bot for player 2
//   --max-steps <n>        Stop after this many steps
//   --record [path]        Write a replay file
//   --config <path>        Path to Duel.toml (default: Duel.toml)

use log::{error, info};
use std::env;
use std::process;
use std::sync::Arc;

use snake_duel::bot::BotRegistry;
use snake_duel::config::Config;
use snake_duel::levels;
use snake_duel::player::PlayerId;
use snake_duel::simulator::Simulator;

struct Options {
    config_path: String,
    level: Option<String>,
    seed: Option<u64>,
    bot1: Option<String>,
    bot2: Option<String>,
    max_steps: Option<u64>,
    record: Option<Option<String>>,
}

fn print_usage() {
    eprintln!("Snake Duel");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  snake-duel [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --level <name|path>     Level to play ({})", levels::builtin_level_names().join(", "));
    eprintln!("  --seed <n>              Seed for food and bots");
    eprintln!("  --bot1 <name|uuid>      Bot for player 1");
    eprintln!("  --bot2 <name|uuid>      Bot for player 2");
    eprintln!("  --max-steps <n>         Step limit");
    eprintln!("  --record [path]         Write a replay (default path from Duel.toml)");
    eprintln!("  --config <path>         Path to Duel.toml (default: Duel.toml)");
    eprintln!("  --help                  Show this help message");
}

fn value_of(args: &[String], i: usize, flag: &str) -> String {
    match args.get(i + 1) {
        Some(value) => value.clone(),
        None => {
            eprintln!("Error: {} requires an argument", flag);
            process::exit(1);
        }
    }
}

fn parse_number(value: &str, flag: &str) -> u64 {
    value.parse().unwrap_or_else(|e| {
        eprintln!("Error: invalid value '{}' for {}: {}", value, flag, e);
        process::exit(1);
    })
}

fn parse_args(args: &[String]) -> Options {
    let mut options = Options {
        config_path: "Duel.toml".to_string(),
        level: None,
        seed: None,
        bot1: None,
        bot2: None,
        max_steps: None,
        record: None,
    };

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--help" => {
                print_usage();
                process::exit(0);
            }
            "--level" => {
                options.level = Some(value_of(args, i, flag));
                i += 1;
            }
            "--seed" => {
                options.seed = Some(parse_number(&value_of(args, i, flag), flag));
                i += 1;
            }
            "--bot1" => {
                options.bot1 = Some(value_of(args, i, flag));
                i += 1;
            }
            "--bot2" => {
                options.bot2 = Some(value_of(args, i, flag));
                i += 1;
            }
            "--max-steps" => {
                options.max_steps = Some(parse_number(&value_of(args, i, flag), flag));
                i += 1;
            }
            "--config" => {
                options.config_path = value_of(args, i, flag);
                i += 1;
            }
            "--record" => match args.get(i + 1) {
                Some(path) if !path.starts_with("--") => {
                    options.record = Some(Some(path.clone()));
                    i += 1;
                }
                _ => options.record = Some(None),
            },
            _ => {
                eprintln!("Error: Unknown option '{}'", flag);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }
    options
}

fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args);

    let mut config = Config::from_file(&options.config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", options.config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });
    if let Some(max_steps) = options.max_steps {
        config.game.max_steps = max_steps;
    }

    let level_name = options.level.unwrap_or_else(|| config.game.default_level.clone());
    let level = match levels::resolve_level(&level_name) {
        Ok(level) => Arc::new(level),
        Err(e) => {
            error!("Cannot load level '{}': {}", level_name, e);
            process::exit(1);
        }
    };
    let seed = options.seed.unwrap_or(config.game.default_seed);
    let bot1 = options.bot1.unwrap_or_else(|| config.game.player1_bot.clone());
    let bot2 = options.bot2.unwrap_or_else(|| config.game.player2_bot.clone());
    let record_path = match options.record {
        Some(Some(path)) => Some(path),
        Some(None) => Some(config.recorder.replay_file_path.clone()),
        None if config.recorder.enabled => Some(config.recorder.replay_file_path.clone()),
        None => None,
    };

    info!(
        "Starting '{}' with seed {}: {} vs {}",
        level.name(),
        seed,
        bot1,
        bot2
    );

    let simulator = Simulator::new(config, BotRegistry::default(), level).with_bots(&bot1, &bot2);
    let result = match &record_path {
        Some(path) => simulator.play_recorded(seed).map(|(outcome, recorder)| {
            if let Err(e) = recorder.save(path) {
                error!("Replay not saved: {}", e);
            }
            outcome
        }),
        None => simulator.play(seed),
    };
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Cannot start game: {}", e);
            process::exit(1);
        }
    };

    match outcome.winner {
        Some(winner) => info!("{} wins after {} steps", winner, outcome.steps),
        None if outcome.timed_out => info!("Step limit reached after {} steps", outcome.steps),
        None => info!("Game over after {} steps, no winner", outcome.steps),
    }
    for id in PlayerId::all() {
        let events: Vec<&str> = outcome.kill_events[id.index()].iter().map(|e| e.as_str()).collect();
        info!(
            "{}: length {}{}",
            id,
            outcome.lengths[id.index()],
            if events.is_empty() {
                String::new()
            } else {
                format!(", {}", events.join(", "))
            }
        );
    }
}
