// Library exports for the snake duel engine
// The game binary, the replay tool and the simulator all build on these modules

pub mod bot;
pub mod collision;
pub mod config;
pub mod error;
pub mod executer;
pub mod food;
pub mod game_state;
pub mod level;
pub mod levels;
pub mod lookahead;
pub mod player;
pub mod recorder;
pub mod replay;
pub mod rng;
pub mod simulator;
pub mod snake_body;
pub mod stuck;
pub mod types;
