// Player slot: who controls a snake, its body, staged commands and fate

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bot::Bot;
use crate::snake_body::SnakeBody;
use crate::types::{Act, Direction, Movement, Position};

/// The two player slots of a game
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerId {
    Player1,
    Player2,
}

impl PlayerId {
    pub fn all() -> [PlayerId; 2] {
        [PlayerId::Player1, PlayerId::Player2]
    }

    pub fn index(&self) -> usize {
        match self {
            PlayerId::Player1 => 0,
            PlayerId::Player2 => 1,
        }
    }

    pub fn opponent(&self) -> PlayerId {
        match self {
            PlayerId::Player1 => PlayerId::Player2,
            PlayerId::Player2 => PlayerId::Player1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerId::Player1 => "player1",
            PlayerId::Player2 => "player2",
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cause of death recorded on a player
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KillEvent {
    CollisionWithWall,
    CollisionWithItself,
    CollisionWithOpponent,
    StuckInALoop,
    KillAfterAFewTimeSteps,
}

impl KillEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            KillEvent::CollisionWithWall => "collision_with_wall",
            KillEvent::CollisionWithItself => "collision_with_itself",
            KillEvent::CollisionWithOpponent => "collision_with_opponent",
            KillEvent::StuckInALoop => "stuck_in_a_loop",
            KillEvent::KillAfterAFewTimeSteps => "kill_after_a_few_time_steps",
        }
    }
}

/// Who decides the movements of a player
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerRole {
    Human,
    Bot(Bot),
    Replay,
    /// Slot not in use
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    id: PlayerId,
    role: PlayerRole,
    body: SnakeBody,
    pending_movement: Movement,
    pending_act: Act,
    is_alive: bool,
    kill_events: Vec<KillEvent>,
}

impl Player {
    pub fn new(id: PlayerId, role: PlayerRole, body: SnakeBody) -> Self {
        let is_alive = role != PlayerRole::None;
        Player {
            id,
            role,
            body,
            pending_movement: Movement::DontMove,
            pending_act: Act::DoNothing,
            is_alive,
            kill_events: Vec::new(),
        }
    }

    /// Empty slot. It never collides and is never an obstacle.
    pub fn uninstalled(id: PlayerId) -> Self {
        Player::new(
            id,
            PlayerRole::None,
            SnakeBody::new(Position::new(0, 0), Direction::Up),
        )
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn role(&self) -> &PlayerRole {
        &self.role
    }

    pub fn body(&self) -> &SnakeBody {
        &self.body
    }

    pub fn pending_movement(&self) -> Movement {
        self.pending_movement
    }

    pub fn pending_act(&self) -> Act {
        self.pending_act
    }

    pub fn is_alive(&self) -> bool {
        self.is_alive
    }

    pub fn kill_events(&self) -> &[KillEvent] {
        &self.kill_events
    }

    pub fn is_installed(&self) -> bool {
        self.role != PlayerRole::None
    }

    pub fn is_installed_and_alive(&self) -> bool {
        self.is_installed() && self.is_alive
    }

    pub fn is_bot(&self) -> bool {
        matches!(self.role, PlayerRole::Bot(_))
    }

    pub fn bot(&self) -> Option<&Bot> {
        match &self.role {
            PlayerRole::Bot(bot) => Some(bot),
            _ => None,
        }
    }

    pub fn with_role(&self, role: PlayerRole) -> Player {
        Player {
            role,
            ..self.clone()
        }
    }

    /// Replaces the bot payload; a no-op for non-bot players
    pub fn with_bot(&self, bot: Bot) -> Player {
        if self.is_bot() {
            self.with_role(PlayerRole::Bot(bot))
        } else {
            self.clone()
        }
    }

    pub fn with_body(&self, body: SnakeBody) -> Player {
        Player {
            body,
            ..self.clone()
        }
    }

    pub fn with_pending_movement(&self, movement: Movement) -> Player {
        Player {
            pending_movement: movement,
            ..self.clone()
        }
    }

    pub fn with_pending_act(&self, act: Act) -> Player {
        Player {
            pending_act: act,
            ..self.clone()
        }
    }

    /// Pending fields back to their idle values
    pub fn cleared_pending(&self) -> Player {
        Player {
            pending_movement: Movement::DontMove,
            pending_act: Act::DoNothing,
            ..self.clone()
        }
    }

    /// Marks the player dead and appends the cause. The body is kept as is.
    pub fn kill(&self, event: KillEvent) -> Player {
        let mut kill_events = self.kill_events.clone();
        kill_events.push(event);
        Player {
            is_alive: false,
            kill_events,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn human() -> Player {
        Player::new(
            PlayerId::Player1,
            PlayerRole::Human,
            SnakeBody::new(Position::new(2, 2), Direction::Right),
        )
    }

    #[test]
    fn test_new_player_is_alive() {
        let player = human();
        assert!(player.is_alive());
        assert!(player.is_installed_and_alive());
        assert_eq!(player.pending_movement(), Movement::DontMove);
        assert!(player.kill_events().is_empty());
    }

    #[test]
    fn test_uninstalled_player_is_never_alive() {
        let player = Player::uninstalled(PlayerId::Player2);
        assert!(!player.is_installed());
        assert!(!player.is_installed_and_alive());
    }

    #[test]
    fn test_kill_keeps_body_and_accumulates_events() {
        let player = human();
        let dead = player.kill(KillEvent::CollisionWithWall).kill(KillEvent::StuckInALoop);
        assert!(!dead.is_alive());
        assert_eq!(dead.body(), player.body());
        assert_eq!(
            dead.kill_events(),
            &[KillEvent::CollisionWithWall, KillEvent::StuckInALoop]
        );
        // The original value is untouched
        assert!(player.is_alive());
    }

    #[test]
    fn test_cleared_pending() {
        let player = human()
            .with_pending_movement(Movement::TurnLeft)
            .with_pending_act(Act::Eat)
            .cleared_pending();
        assert_eq!(player.pending_movement(), Movement::DontMove);
        assert_eq!(player.pending_act(), Act::DoNothing);
    }

    #[test]
    fn test_opponent_ids() {
        assert_eq!(PlayerId::Player1.opponent(), PlayerId::Player2);
        assert_eq!(PlayerId::Player2.opponent().index(), 0);
    }
}
