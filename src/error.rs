// Load-time errors. Per-tick operations never fail, so everything here
// originates from reading levels, replays or configuration.

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::types::Position;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse level: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("level '{name}' has invalid dimensions {width}x{height}")]
    InvalidSize { name: String, width: i32, height: i32 },
    #[error("level '{name}' row {row} has length {found}, expected {expected}")]
    RaggedRow {
        name: String,
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("level '{name}' contains unknown cell '{cell}' at row {row}")]
    UnknownCell { name: String, cell: char, row: usize },
    #[error("level '{name}': {what} is not a contiguous snake body")]
    InvalidBody { name: String, what: &'static str },
    #[error("level '{name}': {what} at {position} is outside the board or on a wall")]
    Blocked {
        name: String,
        what: &'static str,
        position: Position,
    },
    #[error("no built-in level named '{0}'")]
    UnknownLevel(String),
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to access replay file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode replay: {0}")]
    Json(#[from] serde_json::Error),
    #[error("replay was recorded on level {expected}, got level {found}")]
    LevelMismatch { expected: Uuid, found: Uuid },
    #[error("replay track for {0} has an invalid initial body")]
    InvalidBody(&'static str),
    #[error("step {step}: expected {player} at {expected}, replay has {found:?}")]
    UnexpectedPosition {
        step: u64,
        player: &'static str,
        expected: Position,
        found: Option<Position>,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("unknown bot '{0}'")]
    UnknownBot(String),
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    Replay(#[from] ReplayError),
}
