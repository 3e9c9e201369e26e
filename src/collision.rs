// Simultaneous collision resolution for one tick
//
// Both players are resolved against the same frozen snapshot. Each alive
// player's next head and next body are computed first, then every head is
// checked against walls, its own next body and the opponent's next body.
// Because the opponent's next body includes its next head, two heads meeting
// kill both players regardless of processing order. Two heads trading cells
// also collide, even when neither cell stays in a next body.

use crate::game_state::GameState;
use crate::player::{KillEvent, Player, PlayerId};
use crate::snake_body::{SnakeBody, SnakeHead};
use crate::types::{Act, Position};

/// Outcome of the collision pass for one player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerCollision {
    pub collision: Option<KillEvent>,
    pub eats_food: bool,
}

impl PlayerCollision {
    pub fn survives(&self) -> bool {
        self.collision.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionReport {
    pub player1: PlayerCollision,
    pub player2: PlayerCollision,
}

impl CollisionReport {
    pub fn for_player(&self, id: PlayerId) -> &PlayerCollision {
        match id {
            PlayerId::Player1 => &self.player1,
            PlayerId::Player2 => &self.player2,
        }
    }

    /// True when a surviving player eats this tick
    pub fn food_consumed(&self) -> bool {
        [self.player1, self.player2]
            .iter()
            .any(|c| c.eats_food && c.survives())
    }
}

/// Per-player data computed before any check runs
struct Projection {
    current: Option<Position>,
    head: Option<SnakeHead>,
    body: Option<SnakeBody>,
    eats_food: bool,
}

pub struct CollisionDetector;

impl CollisionDetector {
    /// Resolves the pending movements of both players. Never fails.
    pub fn detect(state: &GameState) -> CollisionReport {
        let food = state.food_position();
        let p1 = Self::project(state.player1(), food);
        let p2 = Self::project(state.player2(), food);

        CollisionReport {
            player1: Self::check(state, &p1, &p2),
            player2: Self::check(state, &p2, &p1),
        }
    }

    fn project(player: &Player, food: Option<Position>) -> Projection {
        if !player.is_installed() {
            return Projection {
                current: None,
                head: None,
                body: None,
                eats_food: false,
            };
        }
        if !player.is_alive() {
            // Dead snakes stay on the board as obstacles
            return Projection {
                current: Some(player.body().head().position),
                head: None,
                body: Some(player.body().clone()),
                eats_food: false,
            };
        }

        let movement = player.pending_movement();
        let head = player.body().next_head(movement);
        let eats_food = food == Some(head.position) && head.position != player.body().head().position;
        let act = if eats_food { Act::Eat } else { player.pending_act() };
        Projection {
            current: Some(player.body().head().position),
            head: Some(head),
            body: Some(player.body().state_for_tick(movement, act)),
            eats_food,
        }
    }

    fn check(state: &GameState, own: &Projection, opponent: &Projection) -> PlayerCollision {
        let (head, body) = match (&own.head, &own.body) {
            (Some(head), Some(body)) => (head.position, body),
            _ => return PlayerCollision::default(),
        };

        let collision = if state.level().is_blocked(&head) {
            Some(KillEvent::CollisionWithWall)
        } else if Self::hits_own_body(body, &head) {
            Some(KillEvent::CollisionWithItself)
        } else if opponent.body.as_ref().is_some_and(|b| b.contains(&head))
            || Self::swaps_with(own, opponent)
        {
            Some(KillEvent::CollisionWithOpponent)
        } else {
            None
        };

        PlayerCollision {
            collision,
            eats_food: own.eats_food,
        }
    }

    // Heads passing through each other, only possible when the cell left behind is not kept
    fn swaps_with(own: &Projection, opponent: &Projection) -> bool {
        match (own.current, own.head, opponent.current, opponent.head) {
            (Some(own_now), Some(own_next), Some(other_now), Some(other_next)) => {
                own_next.position == other_now && other_next.position == own_now
            }
            _ => false,
        }
    }

    // The next body ends with the head itself, which must not count
    fn hits_own_body(next_body: &SnakeBody, head: &Position) -> bool {
        let segments = next_body.position_array();
        let n = segments.len();
        segments[..n.saturating_sub(1)].contains(head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelBuilder;
    use crate::player::PlayerRole;
    use crate::types::Movement;
    use std::sync::Arc;

    fn positions(points: &[(i32, i32)]) -> Vec<Position> {
        points.iter().map(|&(x, y)| Position::new(x, y)).collect()
    }

    fn state(p1: &[(i32, i32)], p2: Option<&[(i32, i32)]>, food: Option<(i32, i32)>) -> GameState {
        let mut builder = LevelBuilder::new("Arena", 6, 6).player1_body(positions(p1));
        if let Some(p2) = p2 {
            builder = builder.player2_body(positions(p2));
        }
        if let Some((x, y)) = food {
            builder = builder.food(Position::new(x, y));
        }
        let level = Arc::new(builder.build().unwrap());
        let role2 = if p2.is_some() { PlayerRole::Human } else { PlayerRole::None };
        GameState::for_level(level, PlayerRole::Human, role2, 0)
    }

    #[test]
    fn test_wall_collision_out_of_bounds() {
        let s = state(&[(0, 4), (0, 5)], None, None)
            .with_pending_movement(PlayerId::Player1, Movement::MoveForward);
        let report = CollisionDetector::detect(&s);
        assert_eq!(report.player1.collision, Some(KillEvent::CollisionWithWall));
        assert_eq!(report.player2, PlayerCollision::default());
    }

    #[test]
    fn test_moving_into_vacated_tail_is_safe() {
        // 2x2 loop: head at (1,0) facing down, a right turn enters the tail cell
        let s = state(&[(0, 0), (0, 1), (1, 1), (1, 0)], None, None)
            .with_pending_movement(PlayerId::Player1, Movement::TurnRight);
        let report = CollisionDetector::detect(&s);
        assert_eq!(report.player1.collision, None);
    }

    #[test]
    fn test_self_collision() {
        let s = state(&[(0, 0), (0, 1), (1, 1), (2, 1), (2, 0), (1, 0)], None, None)
            .with_pending_movement(PlayerId::Player1, Movement::TurnRight);
        let report = CollisionDetector::detect(&s);
        assert_eq!(report.player1.collision, Some(KillEvent::CollisionWithItself));
    }

    #[test]
    fn test_head_to_head_kills_both() {
        let s = state(&[(0, 2), (1, 2)], Some(&[(4, 2), (3, 2)]), None)
            .with_pending_movement(PlayerId::Player1, Movement::MoveForward)
            .with_pending_movement(PlayerId::Player2, Movement::MoveForward);
        let report = CollisionDetector::detect(&s);
        assert_eq!(report.player1.collision, Some(KillEvent::CollisionWithOpponent));
        assert_eq!(report.player2.collision, Some(KillEvent::CollisionWithOpponent));
    }

    #[test]
    fn test_single_cell_snakes_cannot_swap() {
        // Both face up by default: right turn and left turn trade the two cells
        let s = state(&[(1, 0)], Some(&[(2, 0)]), None)
            .with_pending_movement(PlayerId::Player1, Movement::TurnRight)
            .with_pending_movement(PlayerId::Player2, Movement::TurnLeft);
        let report = CollisionDetector::detect(&s);
        assert_eq!(report.player1.collision, Some(KillEvent::CollisionWithOpponent));
        assert_eq!(report.player2.collision, Some(KillEvent::CollisionWithOpponent));
    }

    #[test]
    fn test_food_is_flagged() {
        let s = state(&[(0, 2), (1, 2)], None, Some((2, 2)))
            .with_pending_movement(PlayerId::Player1, Movement::MoveForward);
        let report = CollisionDetector::detect(&s);
        assert!(report.player1.eats_food);
        assert!(report.player1.survives());
        assert!(report.food_consumed());
    }

    #[test]
    fn test_dead_opponent_is_an_obstacle() {
        let s = state(&[(0, 2), (1, 2)], Some(&[(2, 4), (2, 3), (2, 2)]), None)
            .with_pending_movement(PlayerId::Player1, Movement::MoveForward);
        let dead = s.player2().kill(KillEvent::CollisionWithWall);
        let s = s.with_player(dead);
        let report = CollisionDetector::detect(&s);
        assert_eq!(report.player1.collision, Some(KillEvent::CollisionWithOpponent));
        assert_eq!(report.player2, PlayerCollision::default());
    }
}
