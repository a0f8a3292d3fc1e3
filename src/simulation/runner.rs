//! Headless self-play over many battles.

use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::ai::{ActionGenerator, GeneratorKind};
use crate::battle_log::LogTarget;
use crate::board::{BattleSetup, DEFAULT_BOT_HEALTH, DEFAULT_TOP_HEALTH};
use crate::cards::{CardCatalog, CardFamily, CardId};
use crate::core::{BattleConfig, EngineError, EngineMode, LogError, PlayerId, PlayerMap, PLAYER_COUNT};
use crate::engine::ActionEngine;

/// Hard stop for a single battle, far beyond any real turn cap.
const MAX_TICKS_PER_BATTLE: u64 = 1_000_000;

/// What to simulate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of battles.
    pub iterations: usize,
    /// Fixed seeds, cycled through. When empty, battle `i` uses `seed_offset + i`.
    pub seeds: Vec<u64>,
    pub seed_offset: u64,
    pub top_deck: Vec<CardId>,
    pub bot_deck: Vec<CardId>,
    pub top_health: i32,
    pub bot_health: i32,
    /// Battles still running after this many turns count as unfinished.
    pub max_turns: u32,
    pub top_generator: GeneratorKind,
    pub bot_generator: GeneratorKind,
    /// Rules for every battle. The mode is forced to headless.
    pub battle: BattleConfig,
    /// Write each battle's log here.
    pub log_dir: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let catalog = CardCatalog::standard();
        Self {
            iterations: 100,
            seeds: Vec::new(),
            seed_offset: 0,
            top_deck: catalog.family_deck(CardFamily::Insects),
            bot_deck: catalog.family_deck(CardFamily::Dinosaurs),
            top_health: DEFAULT_TOP_HEALTH,
            bot_health: DEFAULT_BOT_HEALTH,
            max_turns: 100,
            top_generator: GeneratorKind::Naive,
            bot_generator: GeneratorKind::Naive,
            battle: BattleConfig::headless(),
            log_dir: None,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_seeds(mut self, seeds: Vec<u64>) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn with_seed_offset(mut self, offset: u64) -> Self {
        self.seed_offset = offset;
        self
    }

    pub fn with_decks(mut self, top: Vec<CardId>, bot: Vec<CardId>) -> Self {
        self.top_deck = top;
        self.bot_deck = bot;
        self
    }

    pub fn with_healths(mut self, top: i32, bot: i32) -> Self {
        self.top_health = top;
        self.bot_health = bot;
        self
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_generators(mut self, top: GeneratorKind, bot: GeneratorKind) -> Self {
        self.top_generator = top;
        self.bot_generator = bot;
        self
    }

    pub fn with_battle_config(mut self, battle: BattleConfig) -> Self {
        self.battle = battle;
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Seed of battle `iteration`.
    #[must_use]
    pub fn seed_for(&self, iteration: usize) -> u64 {
        if self.seeds.is_empty() {
            self.seed_offset.wrapping_add(iteration as u64)
        } else {
            self.seeds[iteration % self.seeds.len()]
        }
    }

    /// Starting state of a battle with `seed`.
    #[must_use]
    pub fn setup(&self, seed: u64) -> BattleSetup {
        BattleSetup::new(seed, self.top_deck.clone(), self.bot_deck.clone())
            .with_health(self.top_health, self.bot_health)
    }
}

/// How one battle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleOutcome {
    pub seed: u64,
    pub winner: Option<PlayerId>,
    pub turns: u32,
    /// A content error stopped the battle.
    pub aborted: bool,
    /// Final board digest.
    pub digest: Option<u64>,
}

/// Aggregate over a simulation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub battles: usize,
    pub wins: [usize; PLAYER_COUNT],
    /// Hit the turn cap without a winner.
    pub unfinished: usize,
    pub aborted: usize,
    pub total_turns: u64,
}

impl SimulationReport {
    fn add(&mut self, outcome: &BattleOutcome) {
        self.battles += 1;
        self.total_turns += u64::from(outcome.turns);
        match (outcome.winner, outcome.aborted) {
            (_, true) => self.aborted += 1,
            (Some(winner), false) => self.wins[winner.index()] += 1,
            (None, false) => self.unfinished += 1,
        }
    }

    #[must_use]
    pub fn wins_for(&self, player: PlayerId) -> usize {
        self.wins[player.index()]
    }

    /// Share of all battles `player` won.
    #[must_use]
    pub fn win_rate(&self, player: PlayerId) -> f64 {
        if self.battles == 0 {
            return 0.0;
        }
        self.wins_for(player) as f64 / self.battles as f64
    }

    #[must_use]
    pub fn average_turns(&self) -> f64 {
        if self.battles == 0 {
            return 0.0;
        }
        self.total_turns as f64 / self.battles as f64
    }
}

impl std::fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:<20} {}", "battles:", self.battles)?;
        for player in [PlayerId::TOP, PlayerId::BOT] {
            writeln!(
                f,
                "{:<20} {} ({:.1}%)",
                format!("{player} wins:"),
                self.wins_for(player),
                self.win_rate(player) * 100.0
            )?;
        }
        writeln!(f, "{:<20} {}", "unfinished:", self.unfinished)?;
        writeln!(f, "{:<20} {}", "aborted:", self.aborted)?;
        write!(f, "{:<20} {:.2}", "average turns:", self.average_turns())
    }
}

/// Runs battles between two action generators.
#[derive(Clone, Debug)]
pub struct SimulationRunner {
    config: SimulationConfig,
    catalog: Arc<CardCatalog>,
}

impl SimulationRunner {
    pub fn new(mut config: SimulationConfig, catalog: Arc<CardCatalog>) -> Self {
        config.battle.mode = EngineMode::Headless;
        Self { config, catalog }
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run every battle, hand the report to `on_complete` and return it.
    pub fn run<F>(&self, on_complete: F) -> SimulationReport
    where
        F: FnOnce(&SimulationReport),
    {
        let iterations = self.config.iterations;
        let step = (iterations / 10).max(1);
        let mut report = SimulationReport::default();

        for iteration in 0..iterations {
            let seed = self.config.seed_for(iteration);
            let outcome = match &self.config.log_dir {
                Some(dir) => {
                    let log = (format!("sim-{iteration}-{seed}"), LogTarget::File(dir.clone()));
                    let (outcome, mut engine) = self.play(seed, Some(log));
                    if let Err(e) = engine.finish_log() {
                        warn!("Battle {iteration} (seed {seed}) log incomplete: {e}");
                    }
                    outcome
                }
                None => self.run_battle(seed),
            };
            report.add(&outcome);

            if (iteration + 1) % step == 0 {
                info!(
                    "Simulated {}/{iterations} battles ({}%)",
                    iteration + 1,
                    (iteration + 1) * 100 / iterations
                );
            }
        }

        on_complete(&report);
        report
    }

    /// Play one battle.
    #[must_use]
    pub fn run_battle(&self, seed: u64) -> BattleOutcome {
        self.play(seed, None).0
    }

    /// Play one battle with an in-memory log and return the log text.
    pub fn run_recorded_battle(&self, seed: u64) -> Result<(BattleOutcome, String), LogError> {
        let (outcome, mut engine) = self.play(seed, Some((format!("sim-{seed}"), LogTarget::Memory)));
        engine.finish_log()?;
        let contents = engine
            .take_serializer()
            .map(|serializer| serializer.contents())
            .unwrap_or_default();
        Ok((outcome, contents))
    }

    /// Play one battle, logging it under `(battle_id, target)` if given.
    fn play(&self, seed: u64, log: Option<(String, LogTarget)>) -> (BattleOutcome, ActionEngine) {
        let setup = self.config.setup(seed);
        let mut engine = ActionEngine::new(&setup, self.catalog.clone(), self.config.battle.clone());
        if let Some((battle_id, target)) = log {
            engine = engine.with_log(battle_id, target);
        }
        let mut generators = PlayerMap::new(|player| {
            let kind = if player == PlayerId::TOP {
                self.config.top_generator
            } else {
                self.config.bot_generator
            };
            ActionGenerator::new(kind, seed)
        });

        let aborted = match self.drive(&mut engine, &mut generators) {
            Ok(()) => false,
            Err(e) => {
                warn!("Battle with seed {seed} aborted: {e}");
                true
            }
        };

        let board = engine.board();
        let outcome = BattleOutcome {
            seed,
            winner: board.winner(),
            turns: board.turn_counter(),
            aborted,
            digest: board.digest().ok(),
        };
        debug!("Battle {seed}: {outcome:?}");
        (outcome, engine)
    }

    fn drive(
        &self,
        engine: &mut ActionEngine,
        generators: &mut PlayerMap<ActionGenerator>,
    ) -> Result<(), EngineError> {
        loop {
            if engine.is_idle() {
                let board = engine.board();
                if board.is_over() || board.turn_counter() >= self.config.max_turns {
                    return Ok(());
                }
                let player = board.active_player_id();
                generators[player].decide_and_push_next_actions(engine)?;
            }
            engine.update(0.0)?;
            if engine.stats().ticks >= MAX_TICKS_PER_BATTLE {
                warn!("Battle stopped after {MAX_TICKS_PER_BATTLE} ticks");
                return Ok(());
            }
        }
    }
}
