// Deterministic food placement

use log::debug;

use crate::game_state::GameState;
use crate::rng;
use crate::types::Position;

pub struct FoodGenerator;

impl FoodGenerator {
    /// Places food on a free cell when none is present.
    ///
    /// Returns the input unchanged when food already exists or when the board
    /// has no free cell left. The draw uses and advances the state's
    /// `(food_rng_seed, food_rng_count)` pair only.
    pub fn place_new_food(state: &GameState) -> GameState {
        if state.food_position().is_some() {
            return state.clone();
        }

        let free = Self::free_cells(state);
        if free.is_empty() {
            debug!("No free cell for food at step {}", state.number_of_steps());
            return state.clone();
        }

        let (index, next_count) = rng::draw_index(state.food_rng_seed(), state.food_rng_count(), free.len());
        let position = free[index];
        debug!(
            "Placed food at {} (draw {}, {} free cells)",
            position,
            state.food_rng_count(),
            free.len()
        );
        state
            .with_food_position(Some(position))
            .with_food_rng_count(next_count)
    }

    /// Cells that are inside the level, not walls and not under any snake,
    /// in row-major order
    pub fn free_cells(state: &GameState) -> Vec<Position> {
        let occupied = state.occupied_positions();
        let level = state.level();
        level
            .cells()
            .filter(|p| !level.is_wall(p) && !occupied.contains(p))
            .collect()
    }
}
