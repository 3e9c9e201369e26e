// Static board description: size, walls, spawn bodies and the first food
//
// Levels are immutable once built and shared between every game state
// through an Arc. They can be assembled in code with `LevelBuilder` or
// loaded from a TOML file such as:
//
//   name = "Duel"
//   id = "6f1c0e4e-3c1a-4a57-9d0e-2a1c5a0f0d11"
//   rows = ["#####", "#...#", "#####"]
//   player1_body = [{ x = 1, y = 1 }]
//   food = { x = 3, y = 1 }
//
// The first row is the top of the board. `#` marks a wall, `.` an open cell.

use log::debug;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::error::LevelError;
use crate::snake_body::SnakeBody;
use crate::types::Position;

const MAX_SIDE: i32 = 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    id: Uuid,
    name: String,
    width: i32,
    height: i32,
    walls: HashSet<Position>,
    player1_body: Option<SnakeBody>,
    player2_body: Option<SnakeBody>,
    initial_food_position: Option<Position>,
}

impl Level {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    pub fn walls(&self) -> &HashSet<Position> {
        &self.walls
    }

    pub fn player1_body(&self) -> Option<&SnakeBody> {
        self.player1_body.as_ref()
    }

    pub fn player2_body(&self) -> Option<&SnakeBody> {
        self.player2_body.as_ref()
    }

    pub fn initial_food_position(&self) -> Option<Position> {
        self.initial_food_position
    }

    pub fn is_inside(&self, position: &Position) -> bool {
        position.x >= 0 && position.y >= 0 && position.x < self.width && position.y < self.height
    }

    pub fn is_wall(&self, position: &Position) -> bool {
        self.walls.contains(position)
    }

    /// Outside the board or on a wall
    pub fn is_blocked(&self, position: &Position) -> bool {
        !self.is_inside(position) || self.is_wall(position)
    }

    /// Every cell of the board in row-major order, bottom row first
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }

    /// Parses a level from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, LevelError> {
        let file: LevelFile = toml::from_str(contents)?;
        file.into_level()
    }

    /// Loads a level from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LevelError> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|source| LevelError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

/// On-disk level description
#[derive(Debug, Deserialize)]
struct LevelFile {
    name: String,
    id: Uuid,
    rows: Vec<String>,
    #[serde(default)]
    player1_body: Option<Vec<Position>>,
    #[serde(default)]
    player2_body: Option<Vec<Position>>,
    #[serde(default)]
    food: Option<Position>,
}

impl LevelFile {
    fn into_level(self) -> Result<Level, LevelError> {
        let height = self.rows.len() as i32;
        let width = self.rows.first().map(|r| r.chars().count()).unwrap_or(0) as i32;
        let mut builder = LevelBuilder::new(&self.name, width, height).id(self.id);

        for (row_index, row) in self.rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width as usize {
                return Err(LevelError::RaggedRow {
                    name: self.name,
                    row: row_index,
                    found,
                    expected: width as usize,
                });
            }
            let y = height - 1 - row_index as i32;
            for (x, cell) in row.chars().enumerate() {
                match cell {
                    '#' => builder = builder.wall(Position::new(x as i32, y)),
                    '.' => {}
                    other => {
                        return Err(LevelError::UnknownCell {
                            name: self.name,
                            cell: other,
                            row: row_index,
                        })
                    }
                }
            }
        }

        if let Some(body) = self.player1_body {
            builder = builder.player1_body(body);
        }
        if let Some(body) = self.player2_body {
            builder = builder.player2_body(body);
        }
        if let Some(food) = self.food {
            builder = builder.food(food);
        }
        builder.build()
    }
}

/// Assembles and validates a `Level`
#[derive(Debug, Clone)]
pub struct LevelBuilder {
    id: Option<Uuid>,
    name: String,
    width: i32,
    height: i32,
    walls: HashSet<Position>,
    player1_body: Option<Vec<Position>>,
    player2_body: Option<Vec<Position>>,
    food: Option<Position>,
}

impl LevelBuilder {
    pub fn new(name: &str, width: i32, height: i32) -> Self {
        LevelBuilder {
            id: None,
            name: name.to_string(),
            width,
            height,
            walls: HashSet::new(),
            player1_body: None,
            player2_body: None,
            food: None,
        }
    }

    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn wall(mut self, position: Position) -> Self {
        self.walls.insert(position);
        self
    }

    /// Surrounds the board with a one cell thick wall
    pub fn border_walls(mut self) -> Self {
        for x in 0..self.width {
            self.walls.insert(Position::new(x, 0));
            self.walls.insert(Position::new(x, self.height - 1));
        }
        for y in 0..self.height {
            self.walls.insert(Position::new(0, y));
            self.walls.insert(Position::new(self.width - 1, y));
        }
        self
    }

    /// Spawn body for player 1, ordered tail to head
    pub fn player1_body(mut self, positions: Vec<Position>) -> Self {
        self.player1_body = Some(positions);
        self
    }

    /// Spawn body for player 2, ordered tail to head
    pub fn player2_body(mut self, positions: Vec<Position>) -> Self {
        self.player2_body = Some(positions);
        self
    }

    pub fn food(mut self, position: Position) -> Self {
        self.food = Some(position);
        self
    }

    pub fn build(self) -> Result<Level, LevelError> {
        if self.width <= 0 || self.height <= 0 || self.width > MAX_SIDE || self.height > MAX_SIDE {
            return Err(LevelError::InvalidSize {
                name: self.name,
                width: self.width,
                height: self.height,
            });
        }

        let mut level = Level {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            name: self.name.clone(),
            width: self.width,
            height: self.height,
            walls: self.walls,
            player1_body: None,
            player2_body: None,
            initial_food_position: None,
        };

        level.player1_body = match self.player1_body {
            Some(positions) => Some(validated_body(&level, &positions, "player1 body")?),
            None => None,
        };
        level.player2_body = match self.player2_body {
            Some(positions) => Some(validated_body(&level, &positions, "player2 body")?),
            None => None,
        };

        if let (Some(a), Some(b)) = (&level.player1_body, &level.player2_body) {
            if let Some(shared) = a.positions().find(|p| b.contains(p)) {
                return Err(LevelError::Blocked {
                    name: level.name.clone(),
                    what: "player2 body",
                    position: *shared,
                });
            }
        }

        if let Some(food) = self.food {
            let occupied = level.player1_body.iter().chain(level.player2_body.iter()).any(|b| b.contains(&food));
            if level.is_blocked(&food) || occupied {
                return Err(LevelError::Blocked {
                    name: level.name.clone(),
                    what: "food",
                    position: food,
                });
            }
            level.initial_food_position = Some(food);
        }

        debug!(
            "Built level '{}' {}x{} with {} walls",
            level.name,
            level.width,
            level.height,
            level.walls.len()
        );
        Ok(level)
    }
}

fn validated_body(level: &Level, positions: &[Position], what: &'static str) -> Result<SnakeBody, LevelError> {
    let body = SnakeBody::from_positions(positions).ok_or_else(|| LevelError::InvalidBody {
        name: level.name.clone(),
        what,
    })?;

    let mut seen = HashSet::new();
    for position in body.positions() {
        if level.is_blocked(position) || !seen.insert(*position) {
            return Err(LevelError::Blocked {
                name: level.name.clone(),
                what,
                position: *position,
            });
        }
    }
    Ok(body)
}
