// Bot strategies and the registry that creates them
//
// A bot is a value: `compute` reads the board and returns a new bot carrying
// the planned movement. Strategies are variants of one enum, so adding a new
// one means a new variant plus a registry entry; the executers only ever call
// `Bot::compute` and `Bot::planned_movement`.

use log::debug;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::fmt;
use uuid::Uuid;

use crate::config::{BotConfig, Config};
use crate::level::Level;
use crate::lookahead::{self, LookaheadPlan};
use crate::player::Player;
use crate::types::{Movement, Position};

pub const LOOKAHEAD_BOT_ID: Uuid = Uuid::from_u128(0x6c1b_2f0a_4e3d_4b7a_9c58_d1e2_f3a4_b501);
pub const RANDOM_BOT_ID: Uuid = Uuid::from_u128(0x2a9e_7c41_b03f_4d12_8e6a_51c7_0f9d_3e02);

/// Explores its own future moves and keeps the most open path
#[derive(Debug, Clone, PartialEq)]
pub struct LookaheadBot {
    config: BotConfig,
    iteration: u64,
    planned_movement: Movement,
    last_plan: Option<LookaheadPlan>,
}

impl LookaheadBot {
    pub fn new(config: BotConfig) -> Self {
        LookaheadBot {
            config,
            iteration: 0,
            planned_movement: Movement::DontMove,
            last_plan: None,
        }
    }

    /// Number of decisions taken so far
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn last_plan(&self) -> Option<&LookaheadPlan> {
        self.last_plan.as_ref()
    }
}

/// Picks uniformly among the moves that do not crash this tick
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RandomBot {
    planned_movement: Movement,
}

impl RandomBot {
    fn choose<R: Rng + ?Sized>(level: &Level, player: &Player, opponent: &Player, rng: &mut R) -> Movement {
        let body = player.body();
        let tail = body.tail();
        let safe: Vec<Movement> = [Movement::MoveForward, Movement::TurnLeft, Movement::TurnRight]
            .into_iter()
            .filter(|m| {
                let next = body.next_head(*m).position;
                let own_hit = body.contains(&next) && !(next == tail && body.length() > 1);
                let other_hit = opponent.is_installed() && opponent.body().contains(&next);
                !level.is_blocked(&next) && !own_hit && !other_hit
            })
            .collect();
        safe.choose(rng).copied().unwrap_or(Movement::MoveForward)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Bot {
    Lookahead(LookaheadBot),
    Random(RandomBot),
}

impl Bot {
    pub fn id(&self) -> Uuid {
        match self {
            Bot::Lookahead(_) => LOOKAHEAD_BOT_ID,
            Bot::Random(_) => RANDOM_BOT_ID,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Bot::Lookahead(_) => "lookahead",
            Bot::Random(_) => "random",
        }
    }

    /// Movement decided by the last `compute` call
    pub fn planned_movement(&self) -> Movement {
        match self {
            Bot::Lookahead(bot) => bot.planned_movement,
            Bot::Random(bot) => bot.planned_movement,
        }
    }

    /// Decides the next movement for `player` and returns the updated bot
    pub fn compute<R: Rng + ?Sized>(
        &self,
        level: &Level,
        player: &Player,
        opponent: &Player,
        food: Option<Position>,
        rng: &mut R,
    ) -> Bot {
        match self {
            Bot::Lookahead(bot) => {
                let plan = lookahead::plan(level, player, opponent, food, &bot.config, rng);
                debug!(
                    "{} lookahead #{}: {} (score {}, {} states)",
                    player.id(),
                    bot.iteration,
                    plan.movement.as_str(),
                    plan.score,
                    plan.explored_states
                );
                Bot::Lookahead(LookaheadBot {
                    config: bot.config.clone(),
                    iteration: bot.iteration + 1,
                    planned_movement: plan.movement,
                    last_plan: Some(plan),
                })
            }
            Bot::Random(_) => Bot::Random(RandomBot {
                planned_movement: RandomBot::choose(level, player, opponent, rng),
            }),
        }
    }
}

/// Registry entry: stable id, human-readable name and constructor
#[derive(Clone, Copy)]
pub struct BotInfo {
    pub id: Uuid,
    pub name: &'static str,
    pub build: fn(&Config) -> Bot,
}

impl fmt::Debug for BotInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotInfo")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// Maps bot identifiers to constructors
#[derive(Debug, Clone)]
pub struct BotRegistry {
    entries: Vec<BotInfo>,
}

impl Default for BotRegistry {
    fn default() -> Self {
        let mut registry = BotRegistry::empty();
        registry.register(BotInfo {
            id: LOOKAHEAD_BOT_ID,
            name: "lookahead",
            build: |config| Bot::Lookahead(LookaheadBot::new(config.bot.clone())),
        });
        registry.register(BotInfo {
            id: RANDOM_BOT_ID,
            name: "random",
            build: |_| Bot::Random(RandomBot::default()),
        });
        registry
    }
}

impl BotRegistry {
    pub fn empty() -> Self {
        BotRegistry { entries: Vec::new() }
    }

    /// Adds an entry, replacing any entry with the same id
    pub fn register(&mut self, info: BotInfo) {
        self.entries.retain(|e| e.id != info.id);
        self.entries.push(info);
    }

    pub fn infos(&self) -> &[BotInfo] {
        &self.entries
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<&BotInfo> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&BotInfo> {
        self.entries.iter().find(|e| e.name.eq_ignore_ascii_case(name))
    }

    /// Builds a bot from a name or a UUID string
    pub fn create(&self, name_or_id: &str, config: &Config) -> Option<Bot> {
        let info = match Uuid::parse_str(name_or_id) {
            Ok(id) => self.find_by_id(id),
            Err(_) => self.find_by_name(name_or_id),
        }?;
        Some((info.build)(config))
    }
}
