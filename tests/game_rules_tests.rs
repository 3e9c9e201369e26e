// Integration tests for the tick pipeline
//
// These drive whole ticks through the public executer API and check the
// rules a player can observe: collisions, step counting and food placement.

use snake_duel::config::Config;
use snake_duel::executer::{GameExecuter, InteractiveExecuter};
use snake_duel::food::FoodGenerator;
use snake_duel::game_state::GameState;
use snake_duel::level::{Level, LevelBuilder};
use snake_duel::levels;
use snake_duel::player::{KillEvent, PlayerId, PlayerRole};
use snake_duel::types::{Direction, Movement, Position};
use std::sync::Arc;

fn p(x: i32, y: i32) -> Position {
    Position::new(x, y)
}

fn facing_level(left: Vec<Position>, right: Vec<Position>) -> Arc<Level> {
    Arc::new(
        LevelBuilder::new("Facing", 7, 3)
            .player1_body(left)
            .player2_body(right)
            .build()
            .expect("valid level"),
    )
}

fn bot_state(seed: u64) -> GameState {
    let config = Config::default_hardcoded();
    let registry = snake_duel::bot::BotRegistry::default();
    let level = Arc::new(levels::builtin_level("duel").unwrap());
    let bot = |name| PlayerRole::Bot(registry.create(name, &config).unwrap());
    FoodGenerator::place_new_food(&GameState::for_level(level, bot("lookahead"), bot("lookahead"), seed))
}

#[test]
fn test_head_to_head_kills_both_players() {
    let level = facing_level(vec![p(1, 1), p(2, 1)], vec![p(5, 1), p(4, 1)]);
    let state = GameState::for_level(level, PlayerRole::Human, PlayerRole::Human, 0);
    let mut executer = InteractiveExecuter::new(&Config::default_hardcoded());

    let next = executer.run_tick(&state);

    for id in PlayerId::all() {
        let player = next.player(id);
        assert!(!player.is_alive(), "{} should be dead", id);
        assert_eq!(player.kill_events(), &[KillEvent::CollisionWithOpponent]);
    }
    assert!(next.is_game_over());
    assert_eq!(next.winner(), None);
}

#[test]
fn test_head_to_head_is_symmetric() {
    // Same collision with the slots swapped
    let level = facing_level(vec![p(5, 1), p(4, 1)], vec![p(1, 1), p(2, 1)]);
    let state = GameState::for_level(level, PlayerRole::Human, PlayerRole::Human, 0);
    let mut executer = InteractiveExecuter::new(&Config::default_hardcoded());

    let next = executer.run_tick(&state);

    assert_eq!(next.player1().kill_events(), next.player2().kill_events());
    assert!(!next.player1().is_alive() && !next.player2().is_alive());
}

#[test]
fn test_dead_player_body_stays_an_obstacle() {
    let level = facing_level(vec![p(0, 1), p(1, 1)], vec![p(3, 2), p(3, 1)]);
    let state = GameState::for_level(level, PlayerRole::Human, PlayerRole::Human, 0);
    let state = state.with_player(state.player2().kill(KillEvent::CollisionWithWall));
    let mut executer = InteractiveExecuter::new(&Config::default_hardcoded());

    // Player 1 moves right twice and runs into the frozen body at (3, 1)
    let state = executer.run_tick(&state);
    assert!(state.player1().is_alive());
    let state = executer.run_tick(&state);
    assert_eq!(state.player1().kill_events(), &[KillEvent::CollisionWithOpponent]);
    assert_eq!(state.player1().body().head().position, p(2, 1));
}

#[test]
fn test_steps_advance_once_per_tick() {
    let mut executer = InteractiveExecuter::new(&Config::default_hardcoded());
    let mut state = bot_state(5);
    for n in 1..=25 {
        state = executer.run_tick(&state);
        assert_eq!(state.number_of_steps(), n);
    }
}

#[test]
fn test_human_input_uses_absolute_direction() {
    let level = facing_level(vec![p(1, 1), p(2, 1)], vec![p(6, 0), p(6, 1)]);
    let state = GameState::for_level(level, PlayerRole::Human, PlayerRole::Human, 0);
    let heading = state.player1().body().head().direction;
    assert_eq!(heading, Direction::Right);

    let up = Movement::from_desired_direction(heading, Direction::Up);
    let reverse = Movement::from_desired_direction(heading, Direction::Left);
    assert_eq!(up, Movement::TurnLeft);
    assert_eq!(reverse, Movement::MoveForward);

    let mut executer = InteractiveExecuter::new(&Config::default_hardcoded());
    let next = executer.run_tick(&state.with_pending_movement(PlayerId::Player1, up));
    assert_eq!(next.player1().body().head().position, p(2, 2));
    assert_eq!(next.player1().body().head().direction, Direction::Up);
}

#[test]
fn test_food_placement_is_deterministic() {
    let level = Arc::new(levels::builtin_level("pillars").unwrap());
    let empty = GameState::for_level(level, PlayerRole::Human, PlayerRole::Human, 99).with_food_position(None);

    let a = FoodGenerator::place_new_food(&empty);
    let b = FoodGenerator::place_new_food(&empty.clone());
    assert_eq!(a.food_position(), b.food_position());
    assert_eq!(a.food_rng_count(), 1);

    let food = a.food_position().expect("free cells exist");
    assert!(empty.is_free(&food));

    // Existing food is left alone and the counter does not move
    let again = FoodGenerator::place_new_food(&a);
    assert_eq!(again, a);
}

#[test]
fn test_bot_games_are_reproducible() {
    let run = |seed| {
        let mut executer = InteractiveExecuter::new(&Config::default_hardcoded());
        let mut state = bot_state(seed);
        let mut heads = Vec::new();
        while !state.is_game_over() && state.number_of_steps() < 120 {
            state = executer.run_tick(&state);
            heads.push((
                state.player1().body().head().position,
                state.player2().body().head().position,
                state.food_position(),
            ));
        }
        heads
    };
    assert_eq!(run(11), run(11));
}
