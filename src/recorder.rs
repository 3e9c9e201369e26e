// Game recording
//
// The recorder is a cheap clonable handle; every clone appends to the same
// `ReplayData`. Snapshots are pushed once per step by the game loop and the
// finished recording is written as JSON on request.

use log::{error, info, warn};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

use crate::error::ReplayError;
use crate::game_state::GameState;
use crate::player::PlayerId;
use crate::replay::{RecordedDeath, ReplayData};

#[derive(Clone)]
pub struct GameRecorder {
    data: Arc<Mutex<Option<ReplayData>>>,
    enabled: bool,
}

impl GameRecorder {
    /// Starts recording at `initial_state`, which becomes step 0
    pub fn start(initial_state: &GameState) -> Self {
        let data = ReplayData::from_initial_state(initial_state, chrono::Utc::now().to_rfc3339());
        let recorder = GameRecorder {
            data: Arc::new(Mutex::new(Some(data))),
            enabled: true,
        };
        recorder.record(initial_state);
        recorder
    }

    /// Recorder that ignores everything
    pub fn disabled() -> Self {
        GameRecorder {
            data: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Appends the snapshot reached after a step.
    /// A head is stored while the snake lives, and once more if it moved on
    /// the tick it died. The first step a snake is seen dead is kept with
    /// its kill event.
    pub fn record(&self, state: &GameState) {
        if !self.enabled {
            return;
        }
        let mut guard = self.data.lock();
        let Some(data) = guard.as_mut() else {
            return;
        };

        let step = state.number_of_steps() as usize;
        if data.food_positions.len() != step {
            warn!(
                "Recorder expected step {} but got step {}, snapshot ignored",
                data.food_positions.len(),
                step
            );
            return;
        }
        data.food_positions.push(state.food_position());

        for id in PlayerId::all() {
            let player = state.player(id);
            let Some(track) = data.track_mut(id) else {
                continue;
            };
            if track.death.is_none() && !player.is_alive() {
                if let Some(&event) = player.kill_events().last() {
                    track.death = Some(RecordedDeath {
                        step: step as u64,
                        event,
                    });
                }
            }
            if track.positions.len() != step {
                continue;
            }
            let head = player.body().head().position;
            if player.is_alive() || track.positions.last() != Some(&head) {
                track.positions.push(head);
            }
        }
    }

    /// Copy of everything recorded so far
    pub fn snapshot(&self) -> Option<ReplayData> {
        self.data.lock().clone()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ReplayError> {
        let Some(data) = self.snapshot() else {
            return Ok(());
        };
        match data.save(path.as_ref()) {
            Ok(()) => {
                info!(
                    "Replay with {} steps written to {}",
                    data.recorded_steps(),
                    path.as_ref().display()
                );
                Ok(())
            }
            Err(e) => {
                error!("Failed to write replay: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{Level, LevelBuilder};
    use crate::player::{KillEvent, PlayerRole};
    use crate::types::Position;

    fn state() -> GameState {
        let level: Arc<Level> = Arc::new(
            LevelBuilder::new("Corridor", 6, 1)
                .player1_body(vec![Position::new(0, 0), Position::new(1, 0)])
                .build()
                .unwrap(),
        );
        GameState::for_level(level, PlayerRole::Human, PlayerRole::None, 3)
    }

    #[test]
    fn test_records_heads_and_food() {
        let initial = state();
        let recorder = GameRecorder::start(&initial);
        let moved = initial
            .with_player(
                initial
                    .player1()
                    .with_body(initial.player1().body().state_for_tick(
                        crate::types::Movement::MoveForward,
                        crate::types::Act::DoNothing,
                    )),
            )
            .with_food_position(Some(Position::new(5, 0)))
            .with_step_completed();
        recorder.record(&moved);

        let data = recorder.snapshot().unwrap();
        let track = data.player1.as_ref().unwrap();
        assert_eq!(track.initial_body, vec![Position::new(0, 0), Position::new(1, 0)]);
        assert_eq!(track.positions, vec![Position::new(1, 0), Position::new(2, 0)]);
        assert_eq!(data.food_positions, vec![None, Some(Position::new(5, 0))]);
        assert!(data.player2.is_none());
    }

    #[test]
    fn test_dead_snake_stops_recording() {
        let initial = state();
        let recorder = GameRecorder::start(&initial);
        let dead = initial
            .with_player(initial.player1().kill(KillEvent::CollisionWithWall))
            .with_step_completed();
        recorder.record(&dead);
        recorder.record(&dead.with_step_completed());

        let data = recorder.snapshot().unwrap();
        let track = data.player1.unwrap();
        assert_eq!(track.positions, vec![Position::new(1, 0)]);
        assert_eq!(
            track.death,
            Some(RecordedDeath {
                step: 1,
                event: KillEvent::CollisionWithWall
            })
        );
        assert_eq!(data.food_positions.len(), 3);
    }

    #[test]
    fn test_loop_kill_keeps_the_last_move() {
        let initial = state();
        let recorder = GameRecorder::start(&initial);
        let moved = initial.player1().with_body(
            initial
                .player1()
                .body()
                .state_for_tick(crate::types::Movement::MoveForward, crate::types::Act::DoNothing),
        );
        let stuck = initial
            .with_player(moved.kill(KillEvent::StuckInALoop))
            .with_step_completed();
        recorder.record(&stuck);

        let track = recorder.snapshot().unwrap().player1.unwrap();
        assert_eq!(track.positions, vec![Position::new(1, 0), Position::new(2, 0)]);
        assert_eq!(track.death.map(|d| (d.step, d.event)), Some((1, KillEvent::StuckInALoop)));
    }

    #[test]
    fn test_out_of_order_snapshot_is_ignored() {
        let initial = state();
        let recorder = GameRecorder::start(&initial);
        recorder.record(&initial);
        assert_eq!(recorder.snapshot().unwrap().recorded_steps(), 1);
    }

    #[test]
    fn test_disabled_recorder_is_inert() {
        let recorder = GameRecorder::disabled();
        recorder.record(&state());
        assert!(!recorder.is_enabled());
        assert!(recorder.snapshot().is_none());
        assert!(recorder.save("never_written.json").is_ok());
    }
}
