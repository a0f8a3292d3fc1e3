//! Headless battle simulation CLI.
//!
//! Usage:
//!   battle-sim [--iterations N] [--seed-offset N] [--seeds 1,2,3]
//!              [--top FAMILY] [--bot FAMILY] [--max-turns N]
//!              [--top-ai naive|optimised] [--bot-ai naive|optimised]
//!              [--log-dir DIR] [--json]
//!   battle-sim --replay FILE

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::info;

use battle_engine::battle_log::BattleDeserializer;
use battle_engine::cards::{CardCatalog, CardFamily};
use battle_engine::core::BattleConfig;
use battle_engine::engine::ActionEngine;
use battle_engine::simulation::{GeneratorKind, SimulationConfig, SimulationRunner};

#[derive(Parser, Debug)]
#[command(name = "battle-sim")]
#[command(about = "Run headless battles between two decks, or replay a battle log")]
struct Args {
    /// Number of battles to run
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..))]
    iterations: u64,

    /// Battle `i` uses seed `seed_offset + i` when no seed list is given
    #[arg(long, default_value_t = 0)]
    seed_offset: u64,

    /// Fixed seeds, cycled through
    #[arg(long, value_delimiter = ',')]
    seeds: Vec<u64>,

    /// Top player's deck family
    #[arg(long, value_enum, default_value_t = Family::Insects)]
    top: Family,

    /// Bottom player's deck family
    #[arg(long, value_enum, default_value_t = Family::Dinosaurs)]
    bot: Family,

    /// Battles still running after this many turns count as unfinished
    #[arg(long, default_value_t = 100)]
    max_turns: u32,

    #[arg(long, value_enum, default_value_t = Ai::Naive)]
    top_ai: Ai,

    #[arg(long, value_enum, default_value_t = Ai::Naive)]
    bot_ai: Ai,

    /// Write each battle's log into this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Replay and verify a battle log instead of simulating
    #[arg(long, conflicts_with_all = ["iterations", "seeds", "seed_offset", "log_dir", "json"])]
    replay: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Family {
    Insects,
    Rodents,
    Dinosaurs,
    Demons,
}

impl From<Family> for CardFamily {
    fn from(family: Family) -> Self {
        match family {
            Family::Insects => CardFamily::Insects,
            Family::Rodents => CardFamily::Rodents,
            Family::Dinosaurs => CardFamily::Dinosaurs,
            Family::Demons => CardFamily::Demons,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Ai {
    Naive,
    #[value(alias = "optimized")]
    Optimised,
}

impl From<Ai> for GeneratorKind {
    fn from(ai: Ai) -> Self {
        match ai {
            Ai::Naive => GeneratorKind::Naive,
            Ai::Optimised => GeneratorKind::Optimised,
        }
    }
}

impl Args {
    fn simulation_config(&self, catalog: &CardCatalog) -> Result<SimulationConfig> {
        let iterations = usize::try_from(self.iterations).context("--iterations does not fit this platform")?;
        let mut config = SimulationConfig::default()
            .with_iterations(iterations)
            .with_seeds(self.seeds.clone())
            .with_seed_offset(self.seed_offset)
            .with_decks(
                catalog.family_deck(self.top.into()),
                catalog.family_deck(self.bot.into()),
            )
            .with_max_turns(self.max_turns)
            .with_generators(self.top_ai.into(), self.bot_ai.into());
        if let Some(dir) = &self.log_dir {
            config = config.with_log_dir(dir.clone());
        }
        if config.top_deck.is_empty() || config.bot_deck.is_empty() {
            bail!("the standard catalog has no cards for one of the chosen families");
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let catalog = Arc::new(CardCatalog::standard());

    if let Some(path) = &args.replay {
        return replay(path, catalog);
    }

    let config = args.simulation_config(&catalog)?;
    info!(
        "Running {} battles ({:?} vs {:?})",
        config.iterations, config.top_generator, config.bot_generator
    );

    let json = args.json;
    let runner = SimulationRunner::new(config, catalog);
    runner.run(|report| {
        if json {
            match serde_json::to_string_pretty(report) {
                Ok(text) => println!("{text}"),
                Err(e) => eprintln!("could not encode report: {e}"),
            }
        } else {
            println!("{report}");
        }
    });
    Ok(())
}

fn replay(path: &Path, catalog: Arc<CardCatalog>) -> Result<()> {
    let log = BattleDeserializer::open(path)
        .with_context(|| format!("reading battle log {}", path.display()))?;
    let mut engine = ActionEngine::new(log.setup(), catalog, BattleConfig::headless());
    log.replay_actions(&mut engine).context("enqueuing recorded actions")?;
    engine.run_until_idle().context("replaying battle")?;
    log.verify_final_state(engine.board()).context("verifying final state")?;

    let board = engine.board();
    match board.winner() {
        Some(winner) => println!("{winner} won after {} turns; replay verified", board.turn_counter()),
        None => println!("No winner after {} turns; replay verified", board.turn_counter()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("battle-sim").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]).unwrap();
        let config = args.simulation_config(&CardCatalog::standard()).unwrap();

        assert_eq!(config.iterations, 100);
        assert_eq!(config.max_turns, 100);
        assert_eq!(config.top_generator, GeneratorKind::Naive);
        assert!(config.seeds.is_empty());
        assert!(args.replay.is_none());
    }

    #[test]
    fn test_full_simulation_flags() {
        let args = parse(&[
            "--iterations", "3", "--seeds", "4,5,6", "--top", "rodents", "--bot", "demons",
            "--max-turns", "20", "--top-ai", "optimized", "--log-dir", "logs", "--json",
        ])
        .unwrap();
        let catalog = CardCatalog::standard();
        let config = args.simulation_config(&catalog).unwrap();

        assert_eq!(config.iterations, 3);
        assert_eq!(config.seeds, vec![4, 5, 6]);
        assert_eq!(config.top_deck, catalog.family_deck(CardFamily::Rodents));
        assert_eq!(config.bot_deck, catalog.family_deck(CardFamily::Demons));
        assert_eq!(config.max_turns, 20);
        assert_eq!(config.top_generator, GeneratorKind::Optimised);
        assert_eq!(config.bot_generator, GeneratorKind::Naive);
        assert_eq!(config.log_dir, Some(PathBuf::from("logs")));
        assert!(args.json);
    }

    #[test]
    fn test_typo_rejected() {
        assert!(parse(&["--iteratons", "3"]).is_err());
    }

    #[test]
    fn test_missing_value_rejected() {
        assert!(parse(&["--iterations", "3", "--max-turns"]).is_err());
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(parse(&["--iterations", "0"]).is_err());
        assert!(parse(&["--iterations", "many"]).is_err());
        assert!(parse(&["--seeds", "1,x"]).is_err());
        assert!(parse(&["--top", "dragons"]).is_err());
        assert!(parse(&["--bot-ai", "greedy"]).is_err());
    }

    #[test]
    fn test_replay_excludes_simulation_flags() {
        assert!(parse(&["--replay", "battle.jsonl"]).is_ok());
        assert!(parse(&["--replay", "battle.jsonl", "--iterations", "5"]).is_err());
    }
}
