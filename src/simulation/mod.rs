//! Headless statistical self-play.
//!
//! A [`SimulationRunner`] plays many battles between two
//! [`ActionGenerator`]s and aggregates the outcomes.
//!
//! ```
//! use std::sync::Arc;
//! use battle_engine::cards::CardCatalog;
//! use battle_engine::simulation::{SimulationConfig, SimulationRunner};
//!
//! let config = SimulationConfig::default().with_iterations(3).with_max_turns(20);
//! let runner = SimulationRunner::new(config, Arc::new(CardCatalog::standard()));
//! let report = runner.run(|report| println!("{report}"));
//!
//! assert_eq!(report.battles, 3);
//! ```

mod ai;
mod runner;

pub use ai::{ActionGenerator, GeneratorKind};
pub use runner::{BattleOutcome, SimulationConfig, SimulationReport, SimulationRunner};
