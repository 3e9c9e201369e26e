// Tick orchestration
//
// One tick, in this order:
//   1. compute_next_bot_movement  fills pending movements for automated players
//   2. execute_step               collisions, deaths, eating, body updates
//   3. place_new_food             only when the food was eaten
//   4. end_of_step                step counter + 1
//
// `InteractiveExecuter` asks the bots and draws food from the seeded RNG.
// `ReplayExecuter` reads both from a recording instead.

use log::{debug, info, warn};
use std::sync::Arc;

use crate::collision::CollisionDetector;
use crate::config::Config;
use crate::error::ReplayError;
use crate::food::FoodGenerator;
use crate::game_state::GameState;
use crate::level::Level;
use crate::player::{KillEvent, Player, PlayerId, PlayerRole};
use crate::replay::ReplayData;
use crate::rng;
use crate::snake_body::SnakeBody;
use crate::stuck::StuckSnakeDetector;
use crate::types::{Act, Movement, Position};

pub trait GameExecuter {
    /// Clears per-game bookkeeping before a new game
    fn reset(&mut self);

    /// Rolls bookkeeping back by one tick; the caller restores the previous state
    fn undo(&mut self);

    /// Resolves collisions and applies the pending movements
    fn execute_step(&mut self, state: &GameState) -> GameState;

    /// Stages movements for players the executer drives
    fn compute_next_bot_movement(&mut self, state: &GameState) -> GameState;

    fn place_new_food(&mut self, state: &GameState) -> GameState;

    fn end_of_step(&mut self, state: &GameState) -> GameState {
        state.with_step_completed()
    }

    /// One full tick
    fn run_tick(&mut self, state: &GameState) -> GameState {
        let state = self.compute_next_bot_movement(state);
        let state = self.execute_step(&state);
        let state = self.place_new_food(&state);
        self.end_of_step(&state)
    }
}

/// Collision pass followed by body updates, shared by both executers
fn resolve_movements(state: &GameState) -> GameState {
    let report = CollisionDetector::detect(state);
    let mut next = state.clone();

    for id in PlayerId::all() {
        let player = state.player(id);
        if !player.is_installed_and_alive() {
            continue;
        }
        let outcome = report.for_player(id);
        let updated = match outcome.collision {
            Some(event) => {
                info!(
                    "Step {}: {} died ({}) at {}",
                    state.number_of_steps(),
                    id,
                    event.as_str(),
                    player.body().head().position
                );
                player.kill(event).cleared_pending()
            }
            None => {
                let act = if outcome.eats_food {
                    Act::Eat
                } else {
                    player.pending_act()
                };
                let body = player.body().state_for_tick(player.pending_movement(), act);
                player.with_body(body).cleared_pending()
            }
        };
        next = next.with_player(updated);
    }

    if report.food_consumed() {
        debug!("Step {}: food eaten", state.number_of_steps());
        next = next.with_food_position(None);
    }
    next
}

/// Live play: bots decide every tick, food comes from the seeded generator
#[derive(Debug, Clone)]
pub struct InteractiveExecuter {
    stuck_detectors: [StuckSnakeDetector; 2],
}

impl InteractiveExecuter {
    pub fn new(config: &Config) -> Self {
        let detector = StuckSnakeDetector::new(&config.stuck_detection);
        InteractiveExecuter {
            stuck_detectors: [detector.clone(), detector],
        }
    }
}

impl GameExecuter for InteractiveExecuter {
    fn reset(&mut self) {
        for detector in &mut self.stuck_detectors {
            detector.reset();
        }
    }

    fn undo(&mut self) {
        for detector in &mut self.stuck_detectors {
            detector.undo();
        }
    }

    fn execute_step(&mut self, state: &GameState) -> GameState {
        let mut next = resolve_movements(state);

        for id in PlayerId::all() {
            let player = next.player(id);
            if !player.is_bot() || !player.is_installed_and_alive() {
                continue;
            }
            let detector = &mut self.stuck_detectors[id.index()];
            detector.feed(player.body());
            if detector.is_stuck() {
                info!("Step {}: {} is stuck in a loop", state.number_of_steps(), id);
                let killed = player.kill(KillEvent::StuckInALoop);
                next = next.with_player(killed);
            }
        }
        next
    }

    fn compute_next_bot_movement(&mut self, state: &GameState) -> GameState {
        let mut next = state.clone();
        for id in PlayerId::all() {
            let player = state.player(id);
            let Some(bot) = player.bot() else {
                continue;
            };
            if !player.is_alive() || player.pending_movement() != Movement::DontMove {
                continue;
            }

            // Both bots read the same frozen snapshot
            let mut rng = rng::bot_rng(state.food_rng_seed(), state.number_of_steps(), id.index());
            let bot = bot.compute(
                state.level(),
                player,
                state.opponent_of(id),
                state.food_position(),
                &mut rng,
            );
            let movement = bot.planned_movement();
            next = next.with_player(player.with_bot(bot).with_pending_movement(movement));
        }
        next
    }

    fn place_new_food(&mut self, state: &GameState) -> GameState {
        FoodGenerator::place_new_food(state)
    }
}

/// Re-runs a recording: movements and food positions come from `ReplayData`
#[derive(Debug, Clone)]
pub struct ReplayExecuter {
    replay: ReplayData,
}

impl ReplayExecuter {
    pub fn new(replay: ReplayData) -> Self {
        ReplayExecuter { replay }
    }

    pub fn replay(&self) -> &ReplayData {
        &self.replay
    }

    /// Starting snapshot of the recording. Fails when `level` is not the
    /// recorded level or a recorded body is malformed.
    pub fn initial_state(&self, level: Arc<Level>) -> Result<GameState, ReplayError> {
        if level.id() != self.replay.level_id {
            return Err(ReplayError::LevelMismatch {
                expected: self.replay.level_id,
                found: level.id(),
            });
        }

        let mut state = GameState::new(level, self.replay.food_rng_seed)
            .with_food_position(self.replay.food_positions.first().copied().flatten());
        for id in PlayerId::all() {
            let Some(track) = self.replay.track(id) else {
                continue;
            };
            let body = SnakeBody::from_positions(&track.initial_body)
                .ok_or(ReplayError::InvalidBody(id.as_str()))?
                .with_direction(track.initial_direction);
            state = state.with_player(Player::new(id, PlayerRole::Replay, body));
        }
        Ok(state)
    }

    fn replayed_movement(&self, state: &GameState, player: &Player) -> Option<Movement> {
        let target = self.recorded_head(player.id(), state.number_of_steps() + 1)?;
        let body = player.body();
        if target == body.head().position && body.length() == 1 {
            return Some(Movement::DontMove);
        }
        body.move_toward(&target)
    }

    fn recorded_head(&self, id: PlayerId, step: u64) -> Option<Position> {
        let track = self.replay.track(id)?;
        track.positions.get(step as usize).copied()
    }

    fn death_at(&self, id: PlayerId, step: u64) -> Option<KillEvent> {
        let death = self.replay.track(id)?.death?;
        (death.step == step).then_some(death.event)
    }

    /// Movement that runs into the recorded collision without killing an
    /// opponent the recording keeps alive
    fn fatal_movement(&self, state: &GameState, id: PlayerId, event: KillEvent) -> Movement {
        let opponent = id.opponent();
        let opponent_dies = self.death_at(opponent, state.number_of_steps() + 1).is_some();
        let candidates = [
            Movement::MoveForward,
            Movement::TurnLeft,
            Movement::TurnRight,
            Movement::DontMove,
        ];
        let found = candidates.into_iter().find(|&movement| {
            let report = CollisionDetector::detect(&state.with_pending_movement(id, movement));
            report.for_player(id).collision == Some(event)
                && (opponent_dies || report.for_player(opponent).survives())
        });
        found.unwrap_or_else(|| {
            warn!(
                "Step {}: no movement of {} reproduces {}",
                state.number_of_steps(),
                id,
                event.as_str()
            );
            Movement::DontMove
        })
    }
}

impl GameExecuter for ReplayExecuter {
    fn reset(&mut self) {}

    fn undo(&mut self) {}

    fn execute_step(&mut self, state: &GameState) -> GameState {
        let mut next = resolve_movements(state);
        let step = state.number_of_steps() + 1;

        for id in PlayerId::all() {
            let Some(event) = self.death_at(id, step) else {
                continue;
            };
            let player = next.player(id);
            if player.is_alive() {
                // Deaths decided after the move, such as a loop kill
                info!("Step {}: {} died ({}) as recorded", state.number_of_steps(), id, event.as_str());
                next = next.with_player(player.kill(event));
            } else if player.kill_events().last() != Some(&event) {
                warn!(
                    "Step {}: {} recorded {} but replayed {:?}",
                    state.number_of_steps(),
                    id,
                    event.as_str(),
                    player.kill_events().last()
                );
            }
        }
        next
    }

    fn compute_next_bot_movement(&mut self, state: &GameState) -> GameState {
        let step = state.number_of_steps() + 1;
        let mut next = state.clone();
        let mut dying = Vec::new();

        for id in PlayerId::all() {
            let player = state.player(id);
            if *player.role() != PlayerRole::Replay || !player.is_alive() {
                continue;
            }
            if self.recorded_head(id, step).is_none() {
                if let Some(event) = self.death_at(id, step) {
                    dying.push((id, event));
                    continue;
                }
            }
            let updated = match self.replayed_movement(state, player) {
                Some(movement) => player.with_pending_movement(movement),
                None => {
                    info!(
                        "Step {}: replay for {} cannot continue from {}",
                        state.number_of_steps(),
                        id,
                        player.body().head().position
                    );
                    player.kill(KillEvent::KillAfterAFewTimeSteps)
                }
            };
            next = next.with_player(updated);
        }

        // Collisions depend on where the survivors go, so they are staged first
        for (id, event) in dying {
            let movement = self.fatal_movement(&next, id, event);
            next = next.with_pending_movement(id, movement);
        }
        next
    }

    fn place_new_food(&mut self, state: &GameState) -> GameState {
        if state.food_position().is_some() {
            return state.clone();
        }
        let step = state.number_of_steps() as usize + 1;
        match self.replay.food_positions.get(step).copied().flatten() {
            Some(food) if state.is_free(&food) => state.with_food_position(Some(food)),
            Some(food) => {
                warn!("Step {}: recorded food {} is not free, skipping", step, food);
                state.clone()
            }
            None => state.clone(),
        }
    }
}
