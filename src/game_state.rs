// Immutable snapshot of a game at one step
//
// Every transformation returns a fresh value; a published GameState is never
// changed afterwards, so renderers and recorders can hold on to any snapshot.

use log::warn;
use std::collections::HashSet;
use std::sync::Arc;

use crate::level::Level;
use crate::player::{Player, PlayerId, PlayerRole};
use crate::types::{Movement, Position};

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    level: Arc<Level>,
    food_position: Option<Position>,
    player1: Player,
    player2: Player,
    food_rng_seed: u64,
    food_rng_count: u64,
    number_of_steps: u64,
}

impl GameState {
    /// Empty game on `level`: both slots uninstalled, food from the level
    pub fn new(level: Arc<Level>, food_rng_seed: u64) -> Self {
        let food_position = level.initial_food_position();
        GameState {
            level,
            food_position,
            player1: Player::uninstalled(PlayerId::Player1),
            player2: Player::uninstalled(PlayerId::Player2),
            food_rng_seed,
            food_rng_count: 0,
            number_of_steps: 0,
        }
    }

    /// Game with both slots installed at the level's spawn bodies.
    /// A role for a slot the level has no spawn body for is dropped.
    pub fn for_level(level: Arc<Level>, role1: PlayerRole, role2: PlayerRole, food_rng_seed: u64) -> Self {
        let spawn1 = level.player1_body().cloned();
        let spawn2 = level.player2_body().cloned();
        let state = GameState::new(level, food_rng_seed);

        let player1 = match (role1, spawn1) {
            (PlayerRole::None, _) => Player::uninstalled(PlayerId::Player1),
            (role, Some(body)) => Player::new(PlayerId::Player1, role, body),
            (_, None) => {
                warn!("Level '{}' has no spawn for player1", state.level.name());
                Player::uninstalled(PlayerId::Player1)
            }
        };
        let player2 = match (role2, spawn2) {
            (PlayerRole::None, _) => Player::uninstalled(PlayerId::Player2),
            (role, Some(body)) => Player::new(PlayerId::Player2, role, body),
            (_, None) => {
                warn!("Level '{}' has no spawn for player2", state.level.name());
                Player::uninstalled(PlayerId::Player2)
            }
        };

        state.with_player(player1).with_player(player2)
    }

    pub fn level(&self) -> &Arc<Level> {
        &self.level
    }

    pub fn food_position(&self) -> Option<Position> {
        self.food_position
    }

    pub fn player1(&self) -> &Player {
        &self.player1
    }

    pub fn player2(&self) -> &Player {
        &self.player2
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        match id {
            PlayerId::Player1 => &self.player1,
            PlayerId::Player2 => &self.player2,
        }
    }

    pub fn opponent_of(&self, id: PlayerId) -> &Player {
        self.player(id.opponent())
    }

    pub fn food_rng_seed(&self) -> u64 {
        self.food_rng_seed
    }

    pub fn food_rng_count(&self) -> u64 {
        self.food_rng_count
    }

    pub fn number_of_steps(&self) -> u64 {
        self.number_of_steps
    }

    /// Replaces the slot matching `player.id()`
    pub fn with_player(&self, player: Player) -> GameState {
        let mut next = self.clone();
        match player.id() {
            PlayerId::Player1 => next.player1 = player,
            PlayerId::Player2 => next.player2 = player,
        }
        next
    }

    pub fn with_food_position(&self, food_position: Option<Position>) -> GameState {
        GameState {
            food_position,
            ..self.clone()
        }
    }

    pub fn with_food_rng_count(&self, food_rng_count: u64) -> GameState {
        GameState {
            food_rng_count,
            ..self.clone()
        }
    }

    /// Stages a movement for the next tick (human input)
    pub fn with_pending_movement(&self, id: PlayerId, movement: Movement) -> GameState {
        let player = self.player(id).with_pending_movement(movement);
        self.with_player(player)
    }

    /// Step counter advanced by one; only the executers complete a tick
    pub(crate) fn with_step_completed(&self) -> GameState {
        GameState {
            number_of_steps: self.number_of_steps + 1,
            ..self.clone()
        }
    }

    pub fn players(&self) -> [&Player; 2] {
        [&self.player1, &self.player2]
    }

    /// Every cell covered by an installed player's body, dead or alive
    pub fn occupied_positions(&self) -> HashSet<Position> {
        self.players()
            .into_iter()
            .filter(|p| p.is_installed())
            .flat_map(|p| p.body().positions().copied())
            .collect()
    }

    /// Cell is inside the board, not a wall and not under a snake
    pub fn is_free(&self, position: &Position) -> bool {
        !self.level.is_blocked(position)
            && !self
                .players()
                .into_iter()
                .any(|p| p.is_installed() && p.body().contains(position))
    }

    /// A duel ends when at most one snake is left; a solo game when its snake dies
    pub fn is_game_over(&self) -> bool {
        let installed = self.players().into_iter().filter(|p| p.is_installed()).count();
        let alive = self
            .players()
            .into_iter()
            .filter(|p| p.is_installed_and_alive())
            .count();
        match installed {
            0 => true,
            1 => alive == 0,
            _ => alive <= 1,
        }
    }

    /// Sole survivor of a finished duel
    pub fn winner(&self) -> Option<PlayerId> {
        if !self.player1.is_installed() || !self.player2.is_installed() || !self.is_game_over() {
            return None;
        }
        match (self.player1.is_alive(), self.player2.is_alive()) {
            (true, false) => Some(PlayerId::Player1),
            (false, true) => Some(PlayerId::Player2),
            _ => None,
        }
    }
}
