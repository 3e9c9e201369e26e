// Snake body model: an ordered run of segments from tail to head

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::types::{Act, Direction, Movement, Position};

/// Position and heading of the front segment
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnakeHead {
    pub position: Position,
    pub direction: Direction,
}

impl SnakeHead {
    /// Head after one tick of `movement`. `DontMove` returns the head unchanged.
    pub fn simulate_tick(&self, movement: Movement) -> SnakeHead {
        match movement.new_direction(self.direction) {
            Some(direction) => SnakeHead {
                position: direction.apply(&self.position),
                direction,
            },
            None => *self,
        }
    }
}

/// Body segments ordered tail first, head last.
/// Always holds at least one segment.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnakeBody {
    segments: VecDeque<Position>,
    direction: Direction,
}

impl SnakeBody {
    /// Single segment snake heading `direction`
    pub fn new(head: Position, direction: Direction) -> Self {
        SnakeBody {
            segments: VecDeque::from(vec![head]),
            direction,
        }
    }

    /// Builds a body from positions ordered tail to head.
    ///
    /// The head direction is derived from the last two segments; a single
    /// segment faces `Up`. Returns `None` for an empty list or when two
    /// consecutive segments are not orthogonal neighbours.
    pub fn from_positions(positions: &[Position]) -> Option<Self> {
        let head = *positions.last()?;
        for pair in positions.windows(2) {
            Direction::between(&pair[0], &pair[1])?;
        }
        let direction = match positions.len() {
            1 => Direction::Up,
            n => Direction::between(&positions[n - 2], &head)?,
        };
        Some(SnakeBody {
            segments: positions.iter().copied().collect(),
            direction,
        })
    }

    /// Same segments with an explicit head direction
    pub fn with_direction(&self, direction: Direction) -> Self {
        SnakeBody {
            segments: self.segments.clone(),
            direction,
        }
    }

    pub fn head(&self) -> SnakeHead {
        SnakeHead {
            position: *self.segments.back().unwrap_or(&Position::new(0, 0)),
            direction: self.direction,
        }
    }

    pub fn tail(&self) -> Position {
        *self.segments.front().unwrap_or(&Position::new(0, 0))
    }

    /// The segment directly behind the head, if any
    pub fn neck(&self) -> Option<Position> {
        let n = self.segments.len();
        if n >= 2 {
            self.segments.get(n - 2).copied()
        } else {
            None
        }
    }

    pub fn length(&self) -> usize {
        self.segments.len()
    }

    /// Segments ordered tail to head
    pub fn position_array(&self) -> Vec<Position> {
        self.segments.iter().copied().collect()
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.segments.iter()
    }

    pub fn contains(&self, position: &Position) -> bool {
        self.segments.contains(position)
    }

    /// Head position after applying `movement`, without touching the body.
    /// Matches the head that `state_for_tick` would produce.
    pub fn next_head(&self, movement: Movement) -> SnakeHead {
        let head = self.head();
        let movement = self.effective_movement(movement);
        let next = head.simulate_tick(movement);
        if Some(next.position) == self.neck() {
            head
        } else {
            next
        }
    }

    /// Advances the body by one tick.
    ///
    /// `Eat` keeps the tail so the body grows by one segment. Asking to move
    /// onto the neck leaves the body unchanged.
    pub fn state_for_tick(&self, movement: Movement, act: Act) -> SnakeBody {
        let movement = self.effective_movement(movement);
        if movement == Movement::DontMove {
            return self.clone();
        }
        let next = self.head().simulate_tick(movement);
        if Some(next.position) == self.neck() {
            return self.clone();
        }

        let mut segments = self.segments.clone();
        segments.push_back(next.position);
        if act != Act::Eat {
            segments.pop_front();
        }
        SnakeBody {
            segments,
            direction: next.direction,
        }
    }

    /// Single-step movement that brings the head onto an adjacent `target`.
    /// `None` when the target is not an orthogonal neighbour or lies behind the head.
    pub fn move_toward(&self, target: &Position) -> Option<Movement> {
        let head = self.head();
        let wanted = Direction::between(&head.position, target)?;
        if wanted == head.direction {
            Some(Movement::MoveForward)
        } else if wanted == head.direction.rotated_ccw() {
            Some(Movement::TurnLeft)
        } else if wanted == head.direction.rotated_cw() {
            Some(Movement::TurnRight)
        } else {
            None
        }
    }

    // Only a single segment snake may stand still; longer snakes keep going
    fn effective_movement(&self, movement: Movement) -> Movement {
        if movement == Movement::DontMove && self.segments.len() > 1 {
            Movement::MoveForward
        } else {
            movement
        }
    }
}
