// Configuration module for reading Duel.toml
// Every tunable of the engine, the bots and the tools lives here

use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub bot: BotConfig,
    pub stuck_detection: StuckDetectionConfig,
    pub game: GameConfig,
    pub recorder: RecorderConfig,
    pub simulation: SimulationConfig,
}

/// Lookahead explorer constants
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BotConfig {
    /// Number of simulated steps explored below each candidate move
    pub lookahead_depth: u8,
    /// Score per level reached; a state scores `depth * depth_weight + branches`
    pub depth_weight: i32,
}

/// Loop detection for bot players
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StuckDetectionConfig {
    pub enabled: bool,
    pub history_length: usize,
    pub repeat_threshold: usize,
}

/// Defaults used by the game runner binaries
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GameConfig {
    pub default_level: String,
    pub default_seed: u64,
    pub max_steps: u64,
    pub player1_bot: String,
    pub player2_bot: String,
}

/// Replay recording
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RecorderConfig {
    pub enabled: bool,
    pub replay_file_path: String,
}

/// Batch simulation
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SimulationConfig {
    pub games: usize,
    pub first_seed: u64,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Duel.toml configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&contents)?)
    }

    /// Loads default configuration from Duel.toml in the project root
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::from_file("Duel.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Duel.toml
    pub fn default_hardcoded() -> Self {
        Config {
            bot: BotConfig {
                lookahead_depth: 3,
                depth_weight: 3,
            },
            stuck_detection: StuckDetectionConfig {
                enabled: true,
                history_length: 64,
                repeat_threshold: 3,
            },
            game: GameConfig {
                default_level: "duel".to_string(),
                default_seed: 1,
                max_steps: 2000,
                player1_bot: "lookahead".to_string(),
                player2_bot: "lookahead".to_string(),
            },
            recorder: RecorderConfig {
                enabled: false,
                replay_file_path: "snake_replay.json".to_string(),
            },
            simulation: SimulationConfig {
                games: 100,
                first_seed: 1,
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            warn!("Could not load Duel.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }
}
