//! # battle-engine
//!
//! Deterministic action-queue engine for a two-player card battle.
//!
//! ## Design Principles
//!
//! 1. **One writer**: Only an action's logical phase mutates the board, and
//!    the engine runs exactly one action at a time.
//!
//! 2. **Replayable**: Every random draw comes from one seeded `GameRng`, so
//!    a log of the externally queued actions reproduces the battle exactly.
//!
//! 3. **Presentation is optional**: Actions describe animations as requests
//!    and wait on opaque handles. Headless engines drop the requests and never wait.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: Zones are `im` vectors, so the action
//!   generator clones boards in O(1) to try out plays.
//!
//! - **Name-Keyed Actions**: Actions are built by name from an
//!   `ActionFactory`; logs and generators never name concrete types.
//!
//! ## Modules
//!
//! - `core`: Players, instance ids, RNG, configuration, errors
//! - `cards`: Card data, effect grammar, the catalog
//! - `board`: Board state, player state, card instances
//! - `rules`: Play legality
//! - `actions`: The action contract and every battle action
//! - `engine`: Action queue driver and presenters
//! - `battle_log`: Battle log writer, reader and replay
//! - `simulation`: Action generator and headless simulation runner

pub mod core;
pub mod cards;
pub mod board;
pub mod rules;
pub mod actions;
pub mod engine;
pub mod battle_log;
pub mod simulation;

// Re-export commonly used types
pub use crate::core::{
    PlayerId, PlayerMap, InstanceId,
    GameRng,
    BattleConfig, EngineMode, AnimationTimings,
    ActionError, EngineError, LogError,
};

pub use crate::cards::{CardCatalog, CardData, CardEffect, CardFamily, CardId, EffectComponent};

pub use crate::board::{BattleSetup, BoardState, CardInstance, PlayerState};

pub use crate::rules::RuleEngine;

pub use crate::actions::{
    ActionContext, ActionDescriptor, ActionFactory, ActionParams, ActionPhase,
    AnimationRequest, AnimationStatus, GameAction, SceneHandle,
};

pub use crate::engine::{ActionEngine, ActionOrigin, EngineStats, ExternalPresenter, InstantPresenter, Presenter};

pub use crate::battle_log::{BattleDeserializer, BattleSerializer, LogLine, LogTarget};

pub use crate::simulation::{
    ActionGenerator, BattleOutcome, GeneratorKind,
    SimulationConfig, SimulationReport, SimulationRunner,
};
