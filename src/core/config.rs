//! Battle configuration.
//!
//! `BattleConfig` gathers every tunable the rules and actions consult:
//! board and hand limits, draw counts, weight (resource) economy, the rodent
//! dig chance and animation timings. Battles are constructed with an explicit
//! config; there is no global state.
//!
//! ```
//! use battle_engine::core::{BattleConfig, EngineMode};
//!
//! let config = BattleConfig::default()
//!     .with_mode(EngineMode::Headless)
//!     .with_max_board_cards(5);
//!
//! assert_eq!(config.max_board_cards, 5);
//! assert_eq!(config.max_held_cards, 10);
//! ```

use serde::{Deserialize, Serialize};

/// How the action engine drives actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineMode {
    /// Each action runs its animation phase before the next one activates.
    Animated,
    /// Actions apply their logical phase and are discarded immediately.
    Headless,
}

/// Animation durations in milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationTimings {
    pub card_draw_ms: f32,
    pub card_play_ms: f32,
    pub card_attack_ms: f32,
    pub card_dissolve_ms: f32,
    pub card_scale_ms: f32,
    pub stat_change_ms: f32,
    pub banner_ms: f32,
    /// Board slide-in at battle start.
    pub board_entrance_ms: f32,
    /// Board items fade in after the slide-in.
    pub board_fade_in_ms: f32,
    /// Poison damage ticks last this long per stack.
    pub poison_ms_per_stack: f32,
}

impl Default for AnimationTimings {
    fn default() -> Self {
        Self {
            card_draw_ms: 500.0,
            card_play_ms: 400.0,
            card_attack_ms: 600.0,
            card_dissolve_ms: 700.0,
            card_scale_ms: 300.0,
            stat_change_ms: 250.0,
            banner_ms: 1000.0,
            board_entrance_ms: 1000.0,
            board_fade_in_ms: 500.0,
            poison_ms_per_stack: 100.0,
        }
    }
}

/// Tunables for one battle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleConfig {
    /// Driving mode of the action engine.
    pub mode: EngineMode,

    /// Maximum cards a player may have on the board.
    pub max_board_cards: usize,

    /// Maximum cards a player may hold. Draws beyond this are skipped.
    pub max_held_cards: usize,

    /// `DrawCard` actions chained by each turn advance.
    pub cards_drawn_per_turn: usize,

    /// Extra draws granted when the turn passes from the top player.
    pub second_player_bonus_draws: usize,

    /// Chance a rodent digs back instead of being destroyed after attacking.
    pub rodents_respawn_chance: f64,

    /// Weight discount applied to held cards during zero-cost time.
    pub zero_cost_time_weight_value: i32,

    /// Starting total weight of the top player.
    pub top_starting_weight: i32,

    /// Starting total weight of the bottom player.
    pub bot_starting_weight: i32,

    /// Upper bound on total weight.
    pub weight_limit: i32,

    /// Cards summoned by an insect megaswarm.
    pub megaswarm_size: usize,

    /// Animation durations.
    pub timings: AnimationTimings,

    /// Emit `log::debug!` lines for every engine transition.
    pub log_transitions: bool,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            mode: EngineMode::Animated,
            max_board_cards: 4,
            max_held_cards: 10,
            cards_drawn_per_turn: 4,
            second_player_bonus_draws: 1,
            rodents_respawn_chance: 0.5,
            zero_cost_time_weight_value: 100,
            top_starting_weight: 3,
            bot_starting_weight: 6,
            weight_limit: 10,
            megaswarm_size: 3,
            timings: AnimationTimings::default(),
            log_transitions: cfg!(debug_assertions),
        }
    }
}

impl BattleConfig {
    /// Create the default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config in headless mode, as used by simulations and replays.
    pub fn headless() -> Self {
        Self::default().with_mode(EngineMode::Headless)
    }

    /// Set the engine mode.
    pub fn with_mode(mut self, mode: EngineMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the board size limit.
    pub fn with_max_board_cards(mut self, max: usize) -> Self {
        self.max_board_cards = max;
        self
    }

    /// Set the hand size limit.
    pub fn with_max_held_cards(mut self, max: usize) -> Self {
        self.max_held_cards = max;
        self
    }

    /// Set the per-turn draw count.
    pub fn with_cards_drawn_per_turn(mut self, count: usize) -> Self {
        self.cards_drawn_per_turn = count;
        self
    }

    /// Set the rodent dig chance.
    pub fn with_rodents_respawn_chance(mut self, chance: f64) -> Self {
        self.rodents_respawn_chance = chance;
        self
    }

    /// Set both starting weights.
    pub fn with_starting_weights(mut self, top: i32, bot: i32) -> Self {
        self.top_starting_weight = top;
        self.bot_starting_weight = bot;
        self
    }

    /// Set the weight limit.
    pub fn with_weight_limit(mut self, limit: i32) -> Self {
        self.weight_limit = limit;
        self
    }

    /// Set animation timings.
    pub fn with_timings(mut self, timings: AnimationTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Enable or disable transition logging.
    pub fn with_transition_logging(mut self, enabled: bool) -> Self {
        self.log_transitions = enabled;
        self
    }
}
