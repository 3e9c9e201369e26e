// Headless bot-versus-bot games
//
// A game is fully determined by the level, the two bot names and the seed,
// so batches fan out over rayon's pool with one seed per game.

use log::{debug, info};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;

use crate::bot::BotRegistry;
use crate::config::Config;
use crate::error::SetupError;
use crate::executer::{GameExecuter, InteractiveExecuter};
use crate::food::FoodGenerator;
use crate::game_state::GameState;
use crate::level::Level;
use crate::player::{KillEvent, PlayerId, PlayerRole};
use crate::recorder::GameRecorder;

/// How one game ended
#[derive(Debug, Clone, PartialEq)]
pub struct GameOutcome {
    pub seed: u64,
    pub steps: u64,
    pub winner: Option<PlayerId>,
    /// Reached `max_steps` with the game still running
    pub timed_out: bool,
    pub lengths: [usize; 2],
    pub kill_events: [Vec<KillEvent>; 2],
}

impl GameOutcome {
    fn from_final_state(seed: u64, state: &GameState) -> Self {
        GameOutcome {
            seed,
            steps: state.number_of_steps(),
            winner: state.winner(),
            timed_out: !state.is_game_over(),
            lengths: [state.player1().body().length(), state.player2().body().length()],
            kill_events: [
                state.player1().kill_events().to_vec(),
                state.player2().kill_events().to_vec(),
            ],
        }
    }
}

pub struct Simulator {
    config: Config,
    registry: BotRegistry,
    level: Arc<Level>,
    bots: [String; 2],
}

impl Simulator {
    /// Uses the bots named in the configuration
    pub fn new(config: Config, registry: BotRegistry, level: Arc<Level>) -> Self {
        let bots = [config.game.player1_bot.clone(), config.game.player2_bot.clone()];
        Simulator {
            config,
            registry,
            level,
            bots,
        }
    }

    pub fn with_bots(mut self, player1: &str, player2: &str) -> Self {
        self.bots = [player1.to_string(), player2.to_string()];
        self
    }

    pub fn level(&self) -> &Arc<Level> {
        &self.level
    }

    fn role_for(&self, id: PlayerId, has_spawn: bool) -> Result<PlayerRole, SetupError> {
        if !has_spawn {
            return Ok(PlayerRole::None);
        }
        let name = &self.bots[id.index()];
        self.registry
            .create(name, &self.config)
            .map(PlayerRole::Bot)
            .ok_or_else(|| SetupError::UnknownBot(name.clone()))
    }

    /// Starting snapshot for `seed`, food placed
    pub fn initial_state(&self, seed: u64) -> Result<GameState, SetupError> {
        let role1 = self.role_for(PlayerId::Player1, self.level.player1_body().is_some())?;
        let role2 = self.role_for(PlayerId::Player2, self.level.player2_body().is_some())?;
        let state = GameState::for_level(self.level.clone(), role1, role2, seed);
        Ok(FoodGenerator::place_new_food(&state))
    }

    /// Plays one game to the end or to `max_steps`
    pub fn play(&self, seed: u64) -> Result<GameOutcome, SetupError> {
        let state = self.initial_state(seed)?;
        Ok(self.play_from(state, &GameRecorder::disabled()))
    }

    /// Same as `play`, keeping a recording of every step
    pub fn play_recorded(&self, seed: u64) -> Result<(GameOutcome, GameRecorder), SetupError> {
        let state = self.initial_state(seed)?;
        let recorder = GameRecorder::start(&state);
        let outcome = self.play_from(state, &recorder);
        Ok((outcome, recorder))
    }

    fn play_from(&self, mut state: GameState, recorder: &GameRecorder) -> GameOutcome {
        let mut executer = InteractiveExecuter::new(&self.config);
        executer.reset();

        while !state.is_game_over() && state.number_of_steps() < self.config.game.max_steps {
            state = executer.run_tick(&state);
            recorder.record(&state);
        }

        let outcome = GameOutcome::from_final_state(state.food_rng_seed(), &state);
        debug!(
            "Seed {}: {} steps, winner {:?}",
            outcome.seed, outcome.steps, outcome.winner
        );
        outcome
    }

    /// Seeds of `games` consecutive games, clamped at the largest seed
    pub fn seed_range(first_seed: u64, games: usize) -> Range<u64> {
        first_seed..first_seed.saturating_add(games as u64)
    }

    /// Plays one game per seed in parallel
    pub fn run_batch(&self, seeds: Range<u64>) -> Result<Vec<GameOutcome>, SetupError> {
        info!(
            "Simulating {} games on '{}' with {} threads",
            seeds.end.saturating_sub(seeds.start),
            self.level.name(),
            rayon::current_num_threads()
        );
        seeds
            .into_par_iter()
            .map(|seed| self.play(seed))
            .collect()
    }
}

/// Aggregate of a batch
#[derive(Debug, Default, PartialEq)]
pub struct SimulationSummary {
    pub games: usize,
    pub wins: [usize; 2],
    pub draws: usize,
    pub timeouts: usize,
    pub average_steps: f64,
    pub average_lengths: [f64; 2],
    pub kill_counts: BTreeMap<&'static str, usize>,
}

impl SimulationSummary {
    pub fn from_outcomes(outcomes: &[GameOutcome]) -> Self {
        let mut summary = SimulationSummary {
            games: outcomes.len(),
            ..Default::default()
        };
        if outcomes.is_empty() {
            return summary;
        }

        for outcome in outcomes {
            match outcome.winner {
                Some(id) => summary.wins[id.index()] += 1,
                None if outcome.timed_out => summary.timeouts += 1,
                None => summary.draws += 1,
            }
            for event in outcome.kill_events.iter().flatten() {
                *summary.kill_counts.entry(event.as_str()).or_insert(0) += 1;
            }
        }

        let games = outcomes.len() as f64;
        summary.average_steps = outcomes.iter().map(|o| o.steps as f64).sum::<f64>() / games;
        for id in PlayerId::all() {
            summary.average_lengths[id.index()] =
                outcomes.iter().map(|o| o.lengths[id.index()] as f64).sum::<f64>() / games;
        }
        summary
    }

    pub fn print_report(&self) {
        println!("\n═══════════════════════════════════════════════════════════");
        println!("                  SIMULATION REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Games:          {}", self.games);
        println!("Player 1 Wins:  {}", self.wins[0]);
        println!("Player 2 Wins:  {}", self.wins[1]);
        println!("Draws:          {}", self.draws);
        println!("Timeouts:       {}", self.timeouts);
        println!("Average Steps:  {:.1}", self.average_steps);
        println!(
            "Average Length: {:.1} / {:.1}",
            self.average_lengths[0], self.average_lengths[1]
        );
        if !self.kill_counts.is_empty() {
            println!("Deaths:");
            for (event, count) in &self.kill_counts {
                println!("  {:<26} {}", event, count);
            }
        }
        println!("═══════════════════════════════════════════════════════════\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels;

    fn simulator() -> Simulator {
        let level = Arc::new(levels::builtin_level("duel").unwrap());
        let mut config = Config::default_hardcoded();
        config.game.max_steps = 150;
        Simulator::new(config, BotRegistry::default(), level)
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let sim = simulator();
        let first = sim.play(7).unwrap();
        let second = sim.play(7).unwrap();
        assert_eq!(first, second);
        assert!(first.steps <= 150);
    }

    #[test]
    fn test_batch_matches_sequential_games() {
        let sim = simulator();
        let batch = sim.run_batch(1..5).unwrap();
        assert_eq!(batch.len(), 4);
        for outcome in &batch {
            assert_eq!(*outcome, sim.play(outcome.seed).unwrap());
        }
    }

    #[test]
    fn test_seed_range_saturates() {
        assert_eq!(Simulator::seed_range(10, 3), 10..13);
        assert_eq!(Simulator::seed_range(u64::MAX - 1, 5), u64::MAX - 1..u64::MAX);
        assert!(Simulator::seed_range(u64::MAX, 2).is_empty());
    }

    #[test]
    fn test_unknown_bot_is_rejected() {
        let sim = simulator().with_bots("lookahead", "nobody");
        assert!(matches!(sim.initial_state(1), Err(SetupError::UnknownBot(name)) if name == "nobody"));
    }

    #[test]
    fn test_summary_counts() {
        let outcome = |winner, timed_out| GameOutcome {
            seed: 0,
            steps: 10,
            winner,
            timed_out,
            lengths: [3, 5],
            kill_events: [vec![KillEvent::CollisionWithWall], vec![]],
        };
        let summary = SimulationSummary::from_outcomes(&[
            outcome(Some(PlayerId::Player2), false),
            outcome(None, false),
            outcome(None, true),
        ]);
        assert_eq!(summary.wins, [0, 1]);
        assert_eq!(summary.draws, 1);
        assert_eq!(summary.timeouts, 1);
        assert_eq!(summary.average_lengths, [3.0, 5.0]);
        assert_eq!(summary.kill_counts.get("collision_with_wall"), Some(&3));
    }
}
