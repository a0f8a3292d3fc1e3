//! One side of the battle.
//!
//! ## Zones
//!
//! Every card instance is in exactly one of the five zones:
//!
//! - **deck**: drawable cards (draws pick a random index)
//! - **hand**: held cards, bounded by `max_held_cards`
//! - **board**: cards in play, bounded by `max_board_cards`
//! - **graveyard**: destroyed or discarded cards, recycled into an empty deck
//! - **exile**: single-use spells and sacrificed cards, gone for good
//!
//! Zones are `im::Vector`s so the action generator can clone a whole board
//! for look-ahead without copying card lists.

use im::{OrdSet, Vector};
use serde::{Deserialize, Serialize};

use super::instance::CardInstance;
use super::stats::{BoardModifierMask, BoardModifiers};
use crate::cards::CardId;
use crate::core::InstanceId;

/// State of one player.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerState {
    // === Zones ===
    pub deck: Vector<CardInstance>,
    pub hand: Vector<CardInstance>,
    pub board: Vector<CardInstance>,
    pub graveyard: Vector<CardInstance>,
    pub exile: Vector<CardInstance>,

    /// The deck list this player started with. Summons draw from it.
    pub initial_deck: Vector<CardId>,

    /// Board cards that attacked and will leave at end of turn.
    pub pending_destruction: OrdSet<InstanceId>,

    // === Vitals ===
    pub health: i32,
    pub max_health: i32,
    pub armor: i32,
    /// Armor regained at the start of each of this player's turns.
    pub armor_recharge: i32,
    pub poison_stack: i32,

    // === Weight ===
    /// Weight refilled at turn start; grows by one each turn up to the limit.
    pub total_weight: i32,
    /// Weight still spendable this turn.
    pub current_weight: i32,
    pub weight_limit: i32,

    // === Modifiers and counters ===
    pub modifiers: BoardModifiers,
    pub played_card_combo_this_turn: u32,
    pub cards_drawn_this_turn: u32,
    pub zero_cost_time: bool,
    pub has_resurrection_active: bool,
}

impl PlayerState {
    /// Create a player with a dealt deck.
    #[must_use]
    pub fn new(deck: Vector<CardInstance>, health: i32, starting_weight: i32, weight_limit: i32) -> Self {
        let initial_deck = deck.iter().map(|c| c.card).collect();
        Self {
            deck,
            hand: Vector::new(),
            board: Vector::new(),
            graveyard: Vector::new(),
            exile: Vector::new(),
            initial_deck,
            pending_destruction: OrdSet::new(),
            health,
            max_health: health,
            armor: 0,
            armor_recharge: 0,
            poison_stack: 0,
            total_weight: starting_weight,
            current_weight: starting_weight,
            weight_limit,
            modifiers: BoardModifiers::default(),
            played_card_combo_this_turn: 0,
            cards_drawn_this_turn: 0,
            zero_cost_time: false,
            has_resurrection_active: false,
        }
    }

    /// Check a board modifier flag.
    #[must_use]
    pub fn has_modifier(&self, flag: BoardModifierMask) -> bool {
        self.modifiers.has(flag)
    }

    /// Total cards across all zones.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.deck.len() + self.hand.len() + self.board.len() + self.graveyard.len() + self.exile.len()
    }

    /// Move the graveyard into an empty deck.
    ///
    /// Returns `false` if the deck was not empty or the graveyard was.
    pub fn recycle_graveyard(&mut self) -> bool {
        if !self.deck.is_empty() || self.graveyard.is_empty() {
            return false;
        }
        self.deck = std::mem::take(&mut self.graveyard);
        true
    }

    /// Damage absorbed by armor first, the rest by health.
    ///
    /// Health is clamped at zero. Returns `true` if this damage left the
    /// player at zero health.
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        if amount <= 0 {
            return false;
        }
        let absorbed = amount.min(self.armor);
        self.armor -= absorbed;
        let remaining = amount - absorbed;
        if remaining > 0 {
            self.health = (self.health - remaining).max(0);
            return self.health == 0;
        }
        false
    }

    /// Restore health, capped at max health.
    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount.max(0)).min(self.max_health);
    }

    /// Check whether a board card has already attacked and awaits removal.
    #[must_use]
    pub fn is_pending_destruction(&self, id: InstanceId) -> bool {
        self.pending_destruction.contains(&id)
    }

    /// Move every pending-destruction board card to the graveyard.
    pub fn bury_pending_destruction(&mut self) {
        if self.pending_destruction.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending_destruction);
        let (dead, alive): (Vector<_>, Vector<_>) =
            self.board.iter().cloned().partition(|c| pending.contains(&c.id));
        self.board = alive;
        self.graveyard.extend(dead);
    }

    /// Move the whole hand to the graveyard.
    pub fn discard_hand(&mut self) {
        let hand = std::mem::take(&mut self.hand);
        self.graveyard.extend(hand);
    }
}
