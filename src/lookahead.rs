// Lookahead explorer
//
// The bot copies the board into a dense buffer and simulates its own snake a
// few steps into the future. Every own body cell carries the direction toward
// the next segment, so one synchronous step is a slide of all segments along
// their tags: the tail vacates and the neck moves into the head cell. The head
// then picks one of the free neighbours.
//
// Exploration is a depth-first search over an explicit stack of frames. A
// reached state scores `depth * depth_weight + open_neighbours`, and each root
// move keeps the best score found anywhere below it. The opponent is frozen in
// place and treated as a static obstacle.

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

use crate::config::BotConfig;
use crate::level::Level;
use crate::player::Player;
use crate::types::{Direction, Movement, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Empty,
    Wall,
    Food,
    Obstacle,
    /// Own body segment; `heading` points at the next segment toward the head
    Own { heading: Option<Direction> },
}

impl Cell {
    fn is_open(&self) -> bool {
        matches!(self, Cell::Empty | Cell::Food)
    }
}

/// Inconsistency found while stepping the private board copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anomaly {
    BrokenBody { at: Position },
    Occupied { at: Position },
    NotAdjacent { from: Position, to: Position },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::BrokenBody { at } => write!(f, "body chain broken at {}", at),
            Anomaly::Occupied { at } => write!(f, "cell {} already occupied", at),
            Anomaly::NotAdjacent { from, to } => write!(f, "{} is not next to {}", to, from),
        }
    }
}

#[derive(Debug, Clone)]
struct Board {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Board {
    fn new(width: i32, height: i32) -> Self {
        Board {
            width,
            height,
            cells: vec![Cell::Empty; (width.max(0) * height.max(0)) as usize],
        }
    }

    fn index(&self, p: &Position) -> Option<usize> {
        if p.x < 0 || p.y < 0 || p.x >= self.width || p.y >= self.height {
            None
        } else {
            Some((p.y * self.width + p.x) as usize)
        }
    }

    fn get(&self, p: &Position) -> Cell {
        self.index(p).map_or(Cell::Wall, |i| self.cells[i])
    }

    fn set(&mut self, p: &Position, cell: Cell) {
        if let Some(i) = self.index(p) {
            self.cells[i] = cell;
        }
    }
}

/// Private simulation of the bot's own snake on a board copy
#[derive(Debug, Clone)]
struct Simulation {
    board: Board,
    head: Position,
    direction: Direction,
    tail: Position,
    length: usize,
    /// Cell the tail left during the last slide, restored when the head eats
    vacated: Option<Position>,
}

impl Simulation {
    fn rasterize(level: &Level, player: &Player, opponent: &Player, food: Option<Position>) -> Self {
        let mut board = Board::new(level.width(), level.height());
        for wall in level.walls() {
            board.set(wall, Cell::Wall);
        }
        if let Some(food) = food {
            board.set(&food, Cell::Food);
        }
        if opponent.is_installed() {
            for p in opponent.body().positions() {
                board.set(p, Cell::Obstacle);
            }
        }

        let segments = player.body().position_array();
        for (i, p) in segments.iter().enumerate() {
            let heading = segments.get(i + 1).and_then(|next| Direction::between(p, next));
            board.set(p, Cell::Own { heading });
        }

        let head = player.body().head();
        Simulation {
            board,
            head: head.position,
            direction: head.direction,
            tail: player.body().tail(),
            length: segments.len(),
            vacated: None,
        }
    }

    /// Slides every own segment one cell along its heading into a fresh buffer.
    /// The head cell is taken over by the neck, or emptied for a single segment.
    fn slide(&self) -> Result<Simulation, Anomaly> {
        let mut chain = Vec::with_capacity(self.length);
        let mut at = self.tail;
        loop {
            let heading = match self.board.get(&at) {
                Cell::Own { heading } => heading,
                _ => return Err(Anomaly::BrokenBody { at }),
            };
            chain.push((at, heading));
            match heading {
                Some(d) if chain.len() < self.length => at = d.apply(&at),
                _ => break,
            }
        }
        if chain.len() != self.length || at != self.head {
            return Err(Anomaly::BrokenBody { at });
        }

        let mut board = self.board.clone();
        for (p, _) in &chain {
            board.set(p, Cell::Empty);
        }
        // Segment i moves into the cell of segment i + 1 and inherits its heading
        for window in chain.windows(2) {
            let (p, heading) = window[1];
            board.set(&p, Cell::Own { heading });
        }

        let (tail, vacated) = match chain.get(1) {
            Some((next_tail, _)) => (*next_tail, Some(self.tail)),
            None => (self.head, None),
        };
        Ok(Simulation {
            board,
            head: self.head,
            direction: self.direction,
            tail,
            length: self.length,
            vacated,
        })
    }

    /// Free neighbours of the head after a slide, never the cell behind it
    fn candidates(&self) -> Vec<Position> {
        let behind = self.direction.opposite();
        Direction::all()
            .into_iter()
            .filter(|d| *d != behind)
            .map(|d| d.apply(&self.head))
            .filter(|p| self.board.get(p).is_open())
            .collect()
    }

    /// Moves the head onto `target` after a slide
    fn place_head(&self, target: Position) -> Result<Simulation, Anomaly> {
        let direction = Direction::between(&self.head, &target).ok_or(Anomaly::NotAdjacent {
            from: self.head,
            to: target,
        })?;
        let eats = match self.board.get(&target) {
            Cell::Empty => false,
            Cell::Food => true,
            _ => return Err(Anomaly::Occupied { at: target }),
        };

        let mut next = self.clone();
        let mut length = self.length;
        match self.board.get(&self.head) {
            Cell::Own { .. } => {
                next.board.set(&self.head, Cell::Own { heading: Some(direction) });
                if eats {
                    if let Some(old_tail) = self.vacated {
                        let heading = Direction::between(&old_tail, &self.tail);
                        next.board.set(&old_tail, Cell::Own { heading });
                        next.tail = old_tail;
                        length += 1;
                    }
                }
            }
            _ if eats => {
                next.board.set(&self.head, Cell::Own { heading: Some(direction) });
                next.tail = self.head;
                length += 1;
            }
            _ => next.tail = target,
        }

        next.board.set(&target, Cell::Own { heading: None });
        next.head = target;
        next.direction = direction;
        next.length = length;
        next.vacated = None;
        Ok(next)
    }
}

/// One pending level of the depth-first search
struct Frame {
    sim: Simulation,
    candidates: Vec<Position>,
    depth: u8,
}

/// Result of one planning call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookaheadPlan {
    pub movement: Movement,
    pub target: Option<Position>,
    pub score: i32,
    pub explored_states: usize,
}

impl LookaheadPlan {
    fn fallback(explored_states: usize) -> Self {
        LookaheadPlan {
            movement: Movement::MoveForward,
            target: None,
            score: 0,
            explored_states,
        }
    }
}

/// Chooses the next movement for `player` by exploring its own future moves
pub fn plan<R: Rng + ?Sized>(
    level: &Level,
    player: &Player,
    opponent: &Player,
    food: Option<Position>,
    config: &BotConfig,
    rng: &mut R,
) -> LookaheadPlan {
    let start = match Simulation::rasterize(level, player, opponent, food).slide() {
        Ok(sim) => sim,
        Err(anomaly) => {
            warn!("{}: cannot step initial board: {}", player.id(), anomaly);
            return LookaheadPlan::fallback(0);
        }
    };

    let mut roots = start.candidates();
    if roots.is_empty() {
        debug!("{}: boxed in, keeping forward", player.id());
        return LookaheadPlan::fallback(0);
    }
    roots.shuffle(rng);

    let mut explored_states = 0;
    let mut best: Option<(Position, i32)> = None;
    for root in roots {
        let Some(score) = explore(&start, root, config, rng, &mut explored_states) else {
            continue;
        };
        debug!("{}: candidate {} scores {}", player.id(), root, score);
        if score > best.map_or(0, |(_, s)| s) {
            best = Some((root, score));
        }
    }

    let Some((target, score)) = best else {
        debug!("{}: no candidate scored, keeping forward", player.id());
        return LookaheadPlan::fallback(explored_states);
    };

    let head = player.body().head().position;
    if target == head {
        warn!("{}: explorer picked the current head {}", player.id(), head);
        return LookaheadPlan::fallback(explored_states);
    }

    match player.body().move_toward(&target) {
        Some(movement) => LookaheadPlan {
            movement,
            target: Some(target),
            score,
            explored_states,
        },
        None => {
            warn!("{}: target {} is not reachable from {}", player.id(), target, head);
            LookaheadPlan::fallback(explored_states)
        }
    }
}

/// Best score reachable below `root`, `None` when the move itself is inconsistent
fn explore<R: Rng + ?Sized>(
    start: &Simulation,
    root: Position,
    config: &BotConfig,
    rng: &mut R,
    explored_states: &mut usize,
) -> Option<i32> {
    let first = match start.place_head(root).and_then(|s| s.slide()) {
        Ok(sim) => sim,
        Err(anomaly) => {
            warn!("Dropping candidate {}: {}", root, anomaly);
            return None;
        }
    };
    *explored_states += 1;

    let mut candidates = first.candidates();
    candidates.shuffle(rng);
    let mut best = score(1, candidates.len(), config);
    let mut stack = vec![Frame {
        sim: first,
        candidates,
        depth: 1,
    }];

    while let Some(frame) = stack.last_mut() {
        if frame.depth >= config.lookahead_depth {
            stack.pop();
            continue;
        }
        let Some(next) = frame.candidates.pop() else {
            stack.pop();
            continue;
        };
        let depth = frame.depth + 1;
        match frame.sim.place_head(next).and_then(|s| s.slide()) {
            Ok(sim) => {
                *explored_states += 1;
                let mut candidates = sim.candidates();
                candidates.shuffle(rng);
                best = best.max(score(depth, candidates.len(), config));
                stack.push(Frame {
                    sim,
                    candidates,
                    depth,
                });
            }
            Err(anomaly) => warn!("Dropping branch at {}: {}", next, anomaly),
        }
    }
    Some(best)
}

fn score(depth: u8, branches: usize, config: &BotConfig) -> i32 {
    depth as i32 * config.depth_weight + branches as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelBuilder;
    use crate::player::{PlayerId, PlayerRole};
    use crate::snake_body::SnakeBody;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn config() -> BotConfig {
        BotConfig {
            lookahead_depth: 3,
            depth_weight: 3,
        }
    }

    fn player(points: &[(i32, i32)]) -> Player {
        let positions: Vec<Position> = points.iter().map(|&(x, y)| Position::new(x, y)).collect();
        Player::new(
            PlayerId::Player1,
            PlayerRole::Human,
            SnakeBody::from_positions(&positions).unwrap(),
        )
    }

    #[test]
    fn test_slide_vacates_tail_and_keeps_head_cell() {
        let level = LevelBuilder::new("Open", 5, 5).build().unwrap();
        let me = player(&[(1, 1), (1, 2), (1, 3)]);
        let sim = Simulation::rasterize(&level, &me, &Player::uninstalled(PlayerId::Player2), None);
        let slid = sim.slide().unwrap();
        assert_eq!(slid.board.get(&Position::new(1, 1)), Cell::Empty);
        assert_eq!(slid.board.get(&Position::new(1, 3)), Cell::Own { heading: None });
        assert_eq!(
            slid.board.get(&Position::new(1, 2)),
            Cell::Own {
                heading: Some(Direction::Up)
            }
        );
        assert_eq!(slid.tail, Position::new(1, 2));
    }

    #[test]
    fn test_candidates_exclude_reverse_and_blocked() {
        let level = LevelBuilder::new("Open", 5, 5).build().unwrap();
        let me = player(&[(0, 2), (0, 3), (0, 4)]);
        let sim = Simulation::rasterize(&level, &me, &Player::uninstalled(PlayerId::Player2), None)
            .slide()
            .unwrap();
        assert_eq!(sim.candidates(), vec![Position::new(1, 4)]);
    }

    #[test]
    fn test_eating_restores_tail() {
        let level = LevelBuilder::new("Open", 5, 5).build().unwrap();
        let me = player(&[(1, 1), (1, 2)]);
        let food = Some(Position::new(1, 3));
        let sim = Simulation::rasterize(&level, &me, &Player::uninstalled(PlayerId::Player2), food)
            .slide()
            .unwrap();
        let grown = sim.place_head(Position::new(1, 3)).unwrap();
        assert_eq!(grown.length, 3);
        assert_eq!(grown.tail, Position::new(1, 1));
        // The grown body still slides as one consistent chain
        assert!(grown.slide().is_ok());
    }

    #[test]
    fn test_place_head_on_wall_is_anomaly() {
        let level = LevelBuilder::new("Walled", 5, 5).border_walls().build().unwrap();
        let me = player(&[(1, 1), (1, 2)]);
        let sim = Simulation::rasterize(&level, &me, &Player::uninstalled(PlayerId::Player2), None)
            .slide()
            .unwrap();
        assert_eq!(
            sim.place_head(Position::new(0, 2)).err(),
            Some(Anomaly::Occupied {
                at: Position::new(0, 2)
            })
        );
    }

    #[test]
    fn test_plan_prefers_open_space() {
        // Corridor to the left is a dead end, the right side is open
        let level = LevelBuilder::new("Split", 7, 3)
            .wall(Position::new(1, 2))
            .wall(Position::new(1, 0))
            .build()
            .unwrap();
        let me = player(&[(2, 0), (2, 1)]);
        let mut rng = Pcg32::seed_from_u64(3);
        let result = plan(
            &level,
            &me,
            &Player::uninstalled(PlayerId::Player2),
            None,
            &config(),
            &mut rng,
        );
        assert_ne!(result.movement, Movement::TurnLeft);
        assert!(result.score > 0);
        assert!(result.explored_states > 0);
    }

    #[test]
    fn test_plan_is_deterministic_for_seed() {
        let level = LevelBuilder::new("Open", 9, 9).build().unwrap();
        let me = player(&[(4, 2), (4, 3), (4, 4)]);
        let other = Player::uninstalled(PlayerId::Player2);
        let a = plan(&level, &me, &other, None, &config(), &mut Pcg32::seed_from_u64(77));
        let b = plan(&level, &me, &other, None, &config(), &mut Pcg32::seed_from_u64(77));
        assert_eq!(a, b);
    }
}
