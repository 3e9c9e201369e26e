// Replay files and the verification engine
//
// A replay stores what is needed to re-run a game without its bots:
// 1. The level id and the starting bodies
// 2. Every head position per step while the snake was moving
// 3. The step and cause of each death
// 4. The food position after every step
//
// `ReplayEngine` feeds a recording through `ReplayExecuter` and compares the
// replayed heads with the recorded ones, step by step.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::error::ReplayError;
use crate::executer::{GameExecuter, ReplayExecuter};
use crate::game_state::GameState;
use crate::level::Level;
use crate::player::{KillEvent, PlayerId};
use crate::types::{Direction, Position};

/// Movement history of one snake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerTrack {
    /// Starting body, tail first
    pub initial_body: Vec<Position>,
    pub initial_direction: Direction,
    /// Head position per step; index 0 is the starting head
    pub positions: Vec<Position>,
    #[serde(default)]
    pub death: Option<RecordedDeath>,
}

/// Step on which a snake died and why
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedDeath {
    pub step: u64,
    pub event: KillEvent,
}

/// On-disk recording of a full game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayData {
    pub level_id: Uuid,
    pub level_name: String,
    pub food_rng_seed: u64,
    pub recorded_at: String,
    pub player1: Option<PlayerTrack>,
    pub player2: Option<PlayerTrack>,
    /// Food after every step; index 0 is the starting food
    pub food_positions: Vec<Option<Position>>,
}

impl ReplayData {
    /// Empty recording of `state`, with the tracks of the installed players
    pub fn from_initial_state(state: &GameState, recorded_at: String) -> Self {
        let track = |id: PlayerId| {
            let player = state.player(id);
            player.is_installed().then(|| PlayerTrack {
                initial_body: player.body().position_array(),
                initial_direction: player.body().head().direction,
                positions: Vec::new(),
                death: None,
            })
        };
        ReplayData {
            level_id: state.level().id(),
            level_name: state.level().name().to_string(),
            food_rng_seed: state.food_rng_seed(),
            recorded_at,
            player1: track(PlayerId::Player1),
            player2: track(PlayerId::Player2),
            food_positions: Vec::new(),
        }
    }

    pub fn track(&self, id: PlayerId) -> Option<&PlayerTrack> {
        match id {
            PlayerId::Player1 => self.player1.as_ref(),
            PlayerId::Player2 => self.player2.as_ref(),
        }
    }

    pub(crate) fn track_mut(&mut self, id: PlayerId) -> Option<&mut PlayerTrack> {
        match id {
            PlayerId::Player1 => self.player1.as_mut(),
            PlayerId::Player2 => self.player2.as_mut(),
        }
    }

    /// Number of snapshots recorded, the starting one included
    pub fn recorded_steps(&self) -> usize {
        self.food_positions.len()
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn to_json_string(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ReplayError> {
        let path = path.as_ref();
        fs::write(path, self.to_json_string()?).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Result of replaying a single step for one player
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayResult {
    pub step: u64,
    pub player: PlayerId,
    pub recorded_head: Option<Position>,
    pub replayed_head: Position,
    pub alive: bool,
    pub matches: bool,
}

/// Statistics for a complete replay session
#[derive(Debug, Default, PartialEq)]
pub struct ReplayStats {
    pub total_checks: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Final snapshot plus the per-step comparison
#[derive(Debug, Clone)]
pub struct ReplaySession {
    pub final_state: GameState,
    pub results: Vec<ReplayResult>,
}

impl ReplaySession {
    pub fn kill_events(&self, id: PlayerId) -> &[KillEvent] {
        self.final_state.player(id).kill_events()
    }
}

/// Replay engine for verifying recordings
pub struct ReplayEngine {
    config: Config,
    verbose: bool,
}

impl ReplayEngine {
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine { config, verbose }
    }

    pub fn load_replay_file<P: AsRef<Path>>(&self, path: P) -> Result<ReplayData, ReplayError> {
        let data = ReplayData::load(path)?;
        info!(
            "Loaded replay of level '{}' with {} steps",
            data.level_name,
            data.recorded_steps()
        );
        Ok(data)
    }

    /// Re-runs `data` on `level` until the game ends or the last recorded step
    pub fn replay(&self, level: Arc<Level>, data: &ReplayData) -> Result<ReplaySession, ReplayError> {
        let mut executer = ReplayExecuter::new(data.clone());
        let mut state = executer.initial_state(level)?;
        let mut results = self.compare(&state, data);

        let last_step = data.recorded_steps().saturating_sub(1) as u64;
        let limit = last_step.min(self.config.game.max_steps);
        while !state.is_game_over() && state.number_of_steps() < limit {
            state = executer.run_tick(&state);
            let step_results = self.compare(&state, data);
            if self.verbose {
                for result in &step_results {
                    self.log_result(result);
                }
            }
            results.extend(step_results);
        }

        Ok(ReplaySession {
            final_state: state,
            results,
        })
    }

    fn compare(&self, state: &GameState, data: &ReplayData) -> Vec<ReplayResult> {
        let step = state.number_of_steps();
        PlayerId::all()
            .into_iter()
            .filter_map(|id| {
                let track = data.track(id)?;
                let player = state.player(id);
                let recorded_head = track.positions.get(step as usize).copied();
                let replayed_head = player.body().head().position;
                let matches = match recorded_head {
                    Some(recorded) => recorded == replayed_head,
                    None => !player.is_alive(),
                };
                Some(ReplayResult {
                    step,
                    player: id,
                    recorded_head,
                    replayed_head,
                    alive: player.is_alive(),
                    matches,
                })
            })
            .collect()
    }

    fn log_result(&self, result: &ReplayResult) {
        if result.matches {
            info!(
                "Step {}: ✓ MATCH - {} at {}",
                result.step, result.player, result.replayed_head
            );
        } else {
            warn!(
                "Step {}: ✗ MISMATCH - {} recorded {:?}, replayed {}",
                result.step, result.player, result.recorded_head, result.replayed_head
            );
        }
    }

    /// Results for the given steps only
    pub fn results_for_steps<'a>(&self, results: &'a [ReplayResult], steps: &[u64]) -> Vec<&'a ReplayResult> {
        results.iter().filter(|r| steps.contains(&r.step)).collect()
    }

    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_checks = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_checks - matches;
        let match_rate = if total_checks > 0 {
            (matches as f64 / total_checks as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_checks,
            matches,
            mismatches,
            match_rate,
        }
    }

    pub fn print_report(&self, session: &ReplaySession) {
        let stats = self.generate_stats(&session.results);
        let state = &session.final_state;

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Steps Replayed: {}", state.number_of_steps());
        println!("Head Checks:    {}", stats.total_checks);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        for id in PlayerId::all() {
            let player = state.player(id);
            if !player.is_installed() {
                continue;
            }
            let events: Vec<&str> = player.kill_events().iter().map(|e| e.as_str()).collect();
            println!(
                "{}:        length {}, {}",
                id,
                player.body().length(),
                if events.is_empty() {
                    "alive".to_string()
                } else {
                    events.join(", ")
                }
            );
        }
        println!("═══════════════════════════════════════════════════════════\n");

        let mismatches: Vec<_> = session.results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");
            for result in mismatches {
                println!(
                    "Step {}: {} recorded {:?} → replayed {}",
                    result.step, result.player, result.recorded_head, result.replayed_head
                );
            }
            println!();
        }
    }

    /// Checks that the replayed heads were at the expected positions
    pub fn validate_expected_positions(
        &self,
        results: &[ReplayResult],
        expected: &[(u64, PlayerId, Position)],
    ) -> Result<(), ReplayError> {
        for (step, id, position) in expected {
            let found = results
                .iter()
                .find(|r| r.step == *step && r.player == *id)
                .map(|r| r.replayed_head);
            if found != Some(*position) {
                return Err(ReplayError::UnexpectedPosition {
                    step: *step,
                    player: id.as_str(),
                    expected: *position,
                    found,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelBuilder;
    use crate::player::PlayerRole;

    fn corridor() -> Arc<Level> {
        Arc::new(
            LevelBuilder::new("Corridor", 6, 1)
                .player1_body(vec![Position::new(0, 0), Position::new(1, 0)])
                .build()
                .unwrap(),
        )
    }

    fn recording(level: &Arc<Level>) -> ReplayData {
        let state = GameState::for_level(level.clone(), PlayerRole::Human, PlayerRole::None, 9);
        let mut data = ReplayData::from_initial_state(&state, "2025-01-01T00:00:00+00:00".to_string());
        data.track_mut(PlayerId::Player1).unwrap().positions =
            vec![Position::new(1, 0), Position::new(2, 0), Position::new(3, 0)];
        data.food_positions = vec![None, None, None];
        data
    }

    #[test]
    fn test_replay_follows_recorded_heads() {
        let level = corridor();
        let data = recording(&level);
        let engine = ReplayEngine::new(Config::default_hardcoded(), false);
        let session = engine.replay(level, &data).unwrap();

        let stats = engine.generate_stats(&session.results);
        assert_eq!(stats.total_checks, 3);
        assert_eq!(stats.mismatches, 0);
        assert_eq!(session.final_state.number_of_steps(), 2);
        assert!(session.final_state.player1().is_alive());
        assert_eq!(
            session.final_state.player1().body().head().position,
            Position::new(3, 0)
        );
        engine
            .validate_expected_positions(&session.results, &[(2, PlayerId::Player1, Position::new(3, 0))])
            .unwrap();
    }

    #[test]
    fn test_truncated_track_kills_player() {
        let level = corridor();
        let mut data = recording(&level);
        data.track_mut(PlayerId::Player1).unwrap().positions.truncate(2);
        let engine = ReplayEngine::new(Config::default_hardcoded(), false);
        let session = engine.replay(level, &data).unwrap();

        assert_eq!(session.final_state.number_of_steps(), 2);
        assert_eq!(
            session.kill_events(PlayerId::Player1),
            &[KillEvent::KillAfterAFewTimeSteps]
        );
        assert_eq!(
            session.final_state.player1().body().head().position,
            Position::new(2, 0)
        );
        assert_eq!(engine.generate_stats(&session.results).mismatches, 0);
    }

    #[test]
    fn test_recorded_wall_death_is_reproduced() {
        let level = corridor();
        let mut data = recording(&level);
        let track = data.track_mut(PlayerId::Player1).unwrap();
        track.positions.extend([Position::new(4, 0), Position::new(5, 0)]);
        track.death = Some(RecordedDeath {
            step: 5,
            event: KillEvent::CollisionWithWall,
        });
        data.food_positions = vec![None; 6];
        let engine = ReplayEngine::new(Config::default_hardcoded(), false);
        let session = engine.replay(level, &data).unwrap();

        assert_eq!(session.final_state.number_of_steps(), 5);
        assert_eq!(
            session.kill_events(PlayerId::Player1),
            &[KillEvent::CollisionWithWall]
        );
        assert_eq!(
            session.final_state.player1().body().head().position,
            Position::new(5, 0)
        );
        assert_eq!(engine.generate_stats(&session.results).mismatches, 0);
    }

    #[test]
    fn test_recorded_loop_death_applies_after_the_move() {
        let level = corridor();
        let mut data = recording(&level);
        data.track_mut(PlayerId::Player1).unwrap().death = Some(RecordedDeath {
            step: 2,
            event: KillEvent::StuckInALoop,
        });
        let engine = ReplayEngine::new(Config::default_hardcoded(), false);
        let session = engine.replay(level, &data).unwrap();

        let player = session.final_state.player1();
        assert_eq!(player.kill_events(), &[KillEvent::StuckInALoop]);
        assert_eq!(player.body().head().position, Position::new(3, 0));
        assert_eq!(session.final_state.number_of_steps(), 2);
        assert_eq!(engine.generate_stats(&session.results).mismatches, 0);
    }

    #[test]
    fn test_validation_reports_wrong_position() {
        let level = corridor();
        let data = recording(&level);
        let engine = ReplayEngine::new(Config::default_hardcoded(), false);
        let session = engine.replay(level, &data).unwrap();
        let result =
            engine.validate_expected_positions(&session.results, &[(1, PlayerId::Player1, Position::new(4, 0))]);
        assert!(matches!(result, Err(ReplayError::UnexpectedPosition { step: 1, .. })));
    }

    #[test]
    fn test_json_keeps_all_fields() {
        let level = corridor();
        let data = recording(&level);
        let decoded = ReplayData::from_json_str(&data.to_json_string().unwrap()).unwrap();
        assert_eq!(decoded, data);
        assert!(decoded.player2.is_none());
    }

    #[test]
    fn test_track_without_death_field_loads() {
        let json = r#"{
            "initial_body": [{ "x": 0, "y": 0 }, { "x": 1, "y": 0 }],
            "initial_direction": "Right",
            "positions": [{ "x": 1, "y": 0 }]
        }"#;
        let track: PlayerTrack = serde_json::from_str(json).unwrap();
        assert_eq!(track.death, None);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            ReplayData::load("no_such_replay.json"),
            Err(ReplayError::Io { .. })
        ));
    }
}
