//! Core types: players, instance ids, RNG, configuration, errors.
//!
//! These are the building blocks every other module depends on. Nothing in
//! here knows about cards or actions.

pub mod entity;
pub mod player;
pub mod rng;
pub mod config;
pub mod error;

pub use entity::{InstanceAllocator, InstanceId};
pub use player::{PlayerId, PlayerMap, PLAYER_COUNT};
pub use rng::{stable_hash64, GameRng};
pub use config::{AnimationTimings, BattleConfig, EngineMode};
pub use error::{ActionError, EngineError, LogError};
