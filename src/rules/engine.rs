//! Play legality.
//!
//! [`RuleEngine::can_card_be_played`] answers one question: may this player
//! play this held card on this board right now? It never mutates and never
//! fails; anything it cannot make sense of is simply illegal.
//!
//! ## Checks
//!
//! 1. The battle must not be over.
//! 2. The card data must exist and match the held card at `card_index`.
//! 3. Card specific board requirements (megaswarm needs a near-empty board,
//!    hound summons need room, meteor and damage swap need dinosaurs in hand).
//! 4. The player can afford the effective weight (or zero-cost time is on)
//!    and the board has room.

use std::sync::Arc;

use crate::board::{BoardState, CardInstance, PlayerState};
use crate::cards::{CardCatalog, CardData, CardEffect, EffectComponent};
use crate::core::{BattleConfig, PlayerId};

/// Stateless legality queries over a board.
#[derive(Clone, Debug)]
pub struct RuleEngine {
    catalog: Arc<CardCatalog>,
    max_board_cards: usize,
}

impl RuleEngine {
    /// Create a rule engine for a catalog and config.
    #[must_use]
    pub fn new(catalog: Arc<CardCatalog>, config: &BattleConfig) -> Self {
        Self {
            catalog,
            max_board_cards: config.max_board_cards,
        }
    }

    /// The catalog card data is resolved against.
    #[must_use]
    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    /// Weight a held card costs to play.
    ///
    /// The held override replaces the base weight, then non-spells add the
    /// side's global weight modifier. Both steps floor at zero.
    #[must_use]
    pub fn effective_weight(&self, data: &CardData, held: &CardInstance, player: &PlayerState) -> i32 {
        let mut weight = match held.overrides.weight {
            Some(overridden) => overridden.max(0),
            None => data.weight,
        };
        if !data.is_spell() {
            if let Some(global) = player.modifiers.global_stats.weight {
                weight = (weight + global).max(0);
            }
        }
        weight
    }

    /// Damage a board card deals: the override (floored at zero) or the base,
    /// plus the side's global damage modifier, floored at zero.
    #[must_use]
    pub fn effective_damage(&self, data: &CardData, card: &CardInstance, player: &PlayerState) -> i32 {
        let damage = card.overrides.damage.map_or(data.damage, |d| d.max(0));
        match player.modifiers.global_stats.damage {
            Some(global) => (damage + global).max(0),
            None => damage,
        }
    }

    /// Check whether `player` may play the held card at `card_index`.
    #[must_use]
    pub fn can_card_be_played(
        &self,
        card: Option<&CardData>,
        card_index: usize,
        player: PlayerId,
        board: &BoardState,
    ) -> bool {
        if board.is_over() {
            return false;
        }
        let Some(data) = card else {
            return false;
        };
        let state = board.player(player);
        let Some(held) = state.hand.get(card_index) else {
            return false;
        };
        if held.card != data.id {
            return false;
        }

        if data.is_spell() && !self.board_requirements_met(data, state) {
            return false;
        }

        let weight = self.effective_weight(data, held, state);
        let affordable = state.current_weight >= weight || state.zero_cost_time;
        affordable && state.board.len() < self.max_board_cards
    }

    /// Legality of a held card, looking its data up in the catalog.
    #[must_use]
    pub fn can_play_held(&self, card_index: usize, player: PlayerId, board: &BoardState) -> bool {
        let data = board
            .player(player)
            .hand
            .get(card_index)
            .and_then(|held| self.catalog.get(held.card));
        self.can_card_be_played(data, card_index, player, board)
    }

    /// Indices of every held card `player` may play right now.
    #[must_use]
    pub fn playable_indices(&self, player: PlayerId, board: &BoardState) -> Vec<usize> {
        (0..board.player(player).hand.len())
            .filter(|&i| self.can_play_held(i, player, board))
            .collect()
    }

    fn board_requirements_met(&self, data: &CardData, state: &PlayerState) -> bool {
        // A malformed effect cannot be resolved, so the card cannot be played.
        let Ok(effect) = CardEffect::parse(&data.effect) else {
            return false;
        };

        if effect.has(EffectComponent::InsectMegaswarm) && state.board.len() > 1 {
            return false;
        }
        if effect.has(EffectComponent::HoundSummon) {
            let hounds = usize::try_from(effect.value.max(0)).unwrap_or(0);
            if state.board.len() + hounds > self.max_board_cards {
                return false;
            }
        }

        let dinos_in_hand = state
            .hand
            .iter()
            .filter_map(|c| self.catalog.get(c.card))
            .filter(|c| c.is_dino_creature())
            .count();
        if effect.has(EffectComponent::Meteor) && dinos_in_hand == 0 {
            return false;
        }
        if effect.has(EffectComponent::SwapMinMaxDamage) && dinos_in_hand < 2 {
            return false;
        }
        true
    }
}
