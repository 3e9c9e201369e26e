// Standalone replay tool for verifying recorded games
//
// Usage:
//   cargo run --bin replay -- <replay_file> [options]
//
// Options:
//   --level <name|path>    Level to replay on (default: built-in level with the recorded id)
//   --steps <s1,s2>        Only report the given steps (comma-separated)
//   --validate <s:p:x,y>   Check head positions, e.g. 5:1:3,4 (player 1 at (3,4) on step 5)
//   --verbose              Show detailed output for each step
//   --config <path>        Path to Duel.toml (default: Duel.toml)

use std::env;
use std::process;
use std::sync::Arc;

use snake_duel::config::Config;
use snake_duel::level::Level;
use snake_duel::levels;
use snake_duel::player::PlayerId;
use snake_duel::replay::{ReplayData, ReplayEngine, ReplaySession};
use snake_duel::types::Position;

fn print_usage() {
    eprintln!("Snake Duel Replay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  replay <replay_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --level <name|path>     Level to replay on");
    eprintln!("  --steps <S1,S2,...>     Only report specific steps (comma-separated)");
    eprintln!("  --validate <S:P:X,Y;..> Validate head positions (step:player:x,y separated by ';')");
    eprintln!("  --verbose               Show detailed output for each step");
    eprintln!("  --config <path>         Path to Duel.toml (default: Duel.toml)");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  replay snake_replay.json");
    eprintln!("  replay snake_replay.json --steps 5,10,15");
    eprintln!("  replay snake_replay.json --validate '5:1:3,8;10:2:11,2'");
}

fn parse_steps(s: &str) -> Result<Vec<u64>, String> {
    s.split(',')
        .map(|t| {
            t.trim()
                .parse::<u64>()
                .map_err(|e| format!("Invalid step number '{}': {}", t, e))
        })
        .collect()
}

fn parse_expected_positions(s: &str) -> Result<Vec<(u64, PlayerId, Position)>, String> {
    s.split(';')
        .map(|entry| {
            let parts: Vec<&str> = entry.trim().split(':').collect();
            if parts.len() != 3 {
                return Err(format!("Invalid format '{}'. Expected 'step:player:x,y'", entry));
            }
            let step = parts[0]
                .parse::<u64>()
                .map_err(|e| format!("Invalid step number '{}': {}", parts[0], e))?;
            let player = match parts[1] {
                "1" => PlayerId::Player1,
                "2" => PlayerId::Player2,
                other => return Err(format!("Invalid player '{}', expected 1 or 2", other)),
            };
            let coords: Vec<i32> = parts[2]
                .split(',')
                .map(|c| c.trim().parse::<i32>())
                .collect::<Result<_, _>>()
                .map_err(|e| format!("Invalid position '{}': {}", parts[2], e))?;
            match coords.as_slice() {
                [x, y] => Ok((step, player, Position::new(*x, *y))),
                _ => Err(format!("Invalid position '{}'", parts[2])),
            }
        })
        .collect()
}

fn load_level(data: &ReplayData, level_arg: Option<&str>) -> Result<Level, String> {
    match level_arg {
        Some(name) => levels::resolve_level(name).map_err(|e| e.to_string()),
        None => levels::builtin_level_by_id(data.level_id).ok_or_else(|| {
            format!(
                "Level '{}' ({}) is not built in, pass it with --level",
                data.level_name, data.level_id
            )
        }),
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.contains(&"--help".to_string()) {
        print_usage();
        process::exit(if args.contains(&"--help".to_string()) {
            0
        } else {
            1
        });
    }

    let replay_file = &args[1];
    let mut config_path = "Duel.toml".to_string();
    let mut level_arg: Option<String> = None;
    let mut steps: Option<Vec<u64>> = None;
    let mut expected: Option<Vec<(u64, PlayerId, Position)>> = None;
    let mut verbose = false;

    let mut i = 2;
    while i < args.len() {
        let flag = args[i].as_str();
        let needs_value = matches!(flag, "--level" | "--steps" | "--validate" | "--config");
        if needs_value && i + 1 >= args.len() {
            eprintln!("Error: {} requires an argument", flag);
            process::exit(1);
        }
        let parsed = match flag {
            "--level" => {
                level_arg = Some(args[i + 1].clone());
                Ok(())
            }
            "--steps" => parse_steps(&args[i + 1]).map(|s| steps = Some(s)),
            "--validate" => parse_expected_positions(&args[i + 1]).map(|e| expected = Some(e)),
            "--config" => {
                config_path = args[i + 1].clone();
                Ok(())
            }
            "--verbose" => {
                verbose = true;
                Ok(())
            }
            _ => {
                eprintln!("Error: Unknown option '{}'", flag);
                print_usage();
                process::exit(1);
            }
        };
        if let Err(e) = parsed {
            eprintln!("Error parsing {}: {}", flag, e);
            process::exit(1);
        }
        i += if needs_value { 2 } else { 1 };
    }

    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });

    println!("Loaded configuration from: {}", config_path);
    println!("Replay file: {}", replay_file);
    println!();

    let engine = ReplayEngine::new(config, verbose);

    let data = match engine.load_replay_file(replay_file) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Error loading replay file: {}", e);
            process::exit(1);
        }
    };

    let level = match load_level(&data, level_arg.as_deref()) {
        Ok(level) => Arc::new(level),
        Err(e) => {
            eprintln!("Error loading level: {}", e);
            process::exit(1);
        }
    };

    println!(
        "Replaying {} recorded steps on '{}'...\n",
        data.recorded_steps(),
        level.name()
    );
    let session = match engine.replay(level, &data) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error during replay: {}", e);
            process::exit(1);
        }
    };

    match &steps {
        Some(steps) => {
            let selected: Vec<_> = engine
                .results_for_steps(&session.results, steps)
                .into_iter()
                .cloned()
                .collect();
            engine.print_report(&ReplaySession {
                final_state: session.final_state.clone(),
                results: selected,
            });
        }
        None => engine.print_report(&session),
    }

    if let Some(expected) = expected {
        println!("Validating {} expected position(s)...\n", expected.len());
        match engine.validate_expected_positions(&session.results, &expected) {
            Ok(()) => println!("✓ All expected positions validated successfully!"),
            Err(e) => {
                eprintln!("✗ Validation failed: {}", e);
                process::exit(1);
            }
        }
    }

    let stats = engine.generate_stats(&session.results);
    if stats.mismatches > 0 {
        process::exit(2);
    }
}
