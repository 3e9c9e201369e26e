// Geometry primitives shared by every part of the engine
// (0,0) is the bottom-left cell and Up increases y

use serde::{Deserialize, Serialize};
use std::fmt;

/// 2D grid position
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// Returns the position one cell away in the given direction
    pub fn offset(&self, direction: Direction) -> Position {
        direction.apply(self)
    }

    /// Manhattan distance between two positions
    pub fn manhattan_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Orthogonal neighbours in `Direction::all()` order
    pub fn neighbours(&self) -> [Position; 4] {
        Direction::all().map(|d| d.apply(self))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Represents the four possible headings of a snake
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns all possible directions
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
    }

    /// Converts direction to its lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Quarter turn counter-clockwise (a left turn from the snake's point of view)
    pub fn rotated_ccw(&self) -> Direction {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }

    /// Quarter turn clockwise (a right turn from the snake's point of view)
    pub fn rotated_cw(&self) -> Direction {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    /// Unit step as (dx, dy)
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Calculates the next coordinate when moving in this direction
    pub fn apply(&self, position: &Position) -> Position {
        let (dx, dy) = self.delta();
        Position {
            x: position.x + dx,
            y: position.y + dy,
        }
    }

    /// Direction leading from `from` to an orthogonally adjacent `to`
    pub fn between(from: &Position, to: &Position) -> Option<Direction> {
        Direction::all()
            .into_iter()
            .find(|d| d.apply(from) == *to)
    }
}

/// Relative steering command applied to a snake for one tick
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Movement {
    #[default]
    DontMove,
    MoveForward,
    TurnLeft,
    TurnRight,
}

impl Movement {
    /// New head direction for a snake currently heading `current`,
    /// `None` when the movement keeps the snake in place
    pub fn new_direction(&self, current: Direction) -> Option<Direction> {
        match self {
            Movement::DontMove => None,
            Movement::MoveForward => Some(current),
            Movement::TurnLeft => Some(current.rotated_ccw()),
            Movement::TurnRight => Some(current.rotated_cw()),
        }
    }

    /// Normalizes an absolute direction request into a relative movement.
    /// Asking to reverse is clamped to `MoveForward`.
    pub fn from_desired_direction(current: Direction, desired: Direction) -> Movement {
        if desired == current.rotated_ccw() {
            Movement::TurnLeft
        } else if desired == current.rotated_cw() {
            Movement::TurnRight
        } else {
            Movement::MoveForward
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Movement::DontMove => "dont_move",
            Movement::MoveForward => "forward",
            Movement::TurnLeft => "left",
            Movement::TurnRight => "right",
        }
    }
}

/// What a player does with the cell its head enters
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Act {
    #[default]
    DoNothing,
    Eat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotations_are_inverse() {
        for d in Direction::all() {
            assert_eq!(d.rotated_ccw().rotated_cw(), d);
            assert_eq!(d.rotated_cw().rotated_cw(), d.opposite());
        }
    }

    #[test]
    fn test_between_only_accepts_neighbours() {
        let origin = Position::new(3, 3);
        assert_eq!(
            Direction::between(&origin, &Position::new(3, 4)),
            Some(Direction::Up)
        );
        assert_eq!(
            Direction::between(&origin, &Position::new(2, 3)),
            Some(Direction::Left)
        );
        assert_eq!(Direction::between(&origin, &Position::new(4, 4)), None);
        assert_eq!(Direction::between(&origin, &origin), None);
    }

    #[test]
    fn test_reversal_request_is_clamped_to_forward() {
        assert_eq!(
            Movement::from_desired_direction(Direction::Up, Direction::Down),
            Movement::MoveForward
        );
        assert_eq!(
            Movement::from_desired_direction(Direction::Up, Direction::Left),
            Movement::TurnLeft
        );
        assert_eq!(
            Movement::from_desired_direction(Direction::Up, Direction::Right),
            Movement::TurnRight
        );
        assert_eq!(
            Movement::from_desired_direction(Direction::Right, Direction::Right),
            Movement::MoveForward
        );
    }

    #[test]
    fn test_dont_move_has_no_direction() {
        assert_eq!(Movement::DontMove.new_direction(Direction::Left), None);
        assert_eq!(
            Movement::TurnRight.new_direction(Direction::Left),
            Some(Direction::Up)
        );
    }
}
