//! Action engine: the queue and lifecycle driver of a battle.
//!
//! ## Tick
//!
//! 1. Completion events from the presenter (and any posted by the host) are
//!    delivered to the active action.
//! 2. With nothing active, the next queued action activates: its logical
//!    phase runs, the actions it chained are put at the front of the queue
//!    in request order, and an externally queued serializable action is
//!    written to the battle log. Animated engines then start its animation.
//! 3. The active action's animation is updated; once it reports
//!    `Finished` the action is discarded.
//!
//! A headless engine activates and discards one action per tick.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use battle_engine::actions::{names, ActionParams};
//! use battle_engine::board::BattleSetup;
//! use battle_engine::cards::{CardCatalog, CardId};
//! use battle_engine::core::BattleConfig;
//! use battle_engine::engine::ActionEngine;
//!
//! let setup = BattleSetup::new(42, vec![CardId::new(1); 10], vec![CardId::new(2); 10]);
//! let mut engine = ActionEngine::new(&setup, Arc::new(CardCatalog::standard()), BattleConfig::headless());
//!
//! engine.add_game_action(names::NEXT_PLAYER, ActionParams::new()).unwrap();
//! engine.run_until_idle().unwrap();
//!
//! assert_eq!(engine.board().turn_counter(), 1);
//! assert_eq!(engine.board().active().hand.len(), 4);
//! ```

mod action_engine;
mod presenter;

pub use action_engine::{ActionEngine, ActionOrigin, EngineStats};
pub use presenter::{ExternalPresenter, InstantPresenter, Presenter};
