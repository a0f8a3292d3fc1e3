//! Board state: the authoritative model of a two-player battle.
//!
//! ## Key Types
//!
//! - `BattleSetup`: Seed, deck lists and starting healths (the log header)
//! - `BoardState`: Both players, turn flow, winner, snapshots
//! - `PlayerState`: Zones, vitals, weight, modifiers for one side
//! - `CardInstance`: One card with its stat overrides
//! - `StatMap`, `BoardModifierMask`: Overrides and persistent effects

pub mod stats;
pub mod instance;
pub mod player;
pub mod state;

pub use stats::{BoardModifierMask, BoardModifiers, CardStatType, StatMap};
pub use instance::CardInstance;
pub use player::PlayerState;
pub use state::{BattleSetup, BoardState, DEFAULT_BOT_HEALTH, DEFAULT_TOP_HEALTH};
