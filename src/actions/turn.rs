//! Turn flow.
//!
//! A turn change is two actions. `NextPlayer` hands over the turn and
//! queues everything that happens between turns: the previous player's
//! attacks and discard, poison, cleanup and the new player's draws.
//! `PostNextPlayer` runs once those attacks resolved and tidies up the
//! side that just ended its turn.

use super::animation::{
    AnimationContext, AnimationRequest, AnimationStatus, AnimationTracker, HistoryEntryType, SceneHandle,
    VitalStat,
};
use super::combat::{CardAttackAction, CardDestructionAction};
use super::context::ActionContext;
use super::cosmetic::history_entry;
use super::names::{
    CARD_ATTACK, CARD_DESTRUCTION, CARD_HISTORY_ENTRY_ADDITION, DRAW_CARD, NEXT_PLAYER, POISON_STACK_APPLICATION,
    POST_NEXT_PLAYER, ZERO_COST_TIME,
};
use super::params::ActionParams;
use super::GameAction;
use crate::board::{BoardModifierMask, CardStatType};
use crate::core::{ActionError, PlayerId};

// =============================================================================
// NextPlayer
// =============================================================================

/// Hands the turn to the other player.
#[derive(Debug, Default)]
pub struct NextPlayerAction {
    turn: Option<(PlayerId, u32)>,
    tracker: AnimationTracker,
}

impl GameAction for NextPlayerAction {
    fn name(&self) -> &'static str {
        NEXT_PLAYER
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, _params: &ActionParams) -> Result<(), ActionError> {
        let previous = ctx.board.advance_turn();
        let active_id = ctx.board.active_player_id();
        self.turn = Some((active_id, ctx.board.turn_counter()));

        let active = ctx.board.active_mut();
        active.total_weight = (active.total_weight + 1).min(active.weight_limit);
        active.current_weight = active.total_weight;

        if let Some(previous_id) = previous {
            let previous_state = ctx.board.player(previous_id);
            let board_len = previous_state.board.len();
            let hand: Vec<usize> = (0..previous_state.hand.len()).collect();

            for card_index in 0..board_len {
                ctx.add_game_action(CARD_ATTACK, CardAttackAction::params(previous_id, card_index));
            }
            if !hand.is_empty() {
                ctx.add_game_action(
                    CARD_DESTRUCTION,
                    CardDestructionAction::params(previous_id, &hand, false, false),
                );
            }
        }

        ctx.add_game_action(
            CARD_HISTORY_ENTRY_ADDITION,
            history_entry(active_id, 0, HistoryEntryType::TurnCounter),
        );

        let active = ctx.board.active_mut();
        active.cards_drawn_this_turn = 0;
        if active.has_modifier(BoardModifierMask::PERMANENT_CONTINUAL_WEIGHT_REDUCTION) {
            active.modifiers.global_stats.add(CardStatType::Weight, -1);
        }

        ctx.chain(POISON_STACK_APPLICATION);
        ctx.chain(POST_NEXT_PLAYER);

        let mut draws = ctx.config.cards_drawn_per_turn;
        if previous == Some(PlayerId::TOP) {
            draws += ctx.config.second_player_bonus_draws;
        }
        for _ in 0..draws {
            ctx.chain(DRAW_CARD);
        }
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        if let Some((player, turn)) = self.turn {
            let duration_ms = anim.config.timings.banner_ms;
            let handle = anim.request(AnimationRequest::Banner {
                text: format!("Turn {turn}: {player}"),
                duration_ms,
            });
            self.tracker.track(handle);
        }
    }

    fn update_animation(&mut self, _dt_ms: f32) -> AnimationStatus {
        self.tracker.status()
    }

    fn on_animation_completed(&mut self, handle: SceneHandle) {
        self.tracker.complete(handle);
    }

    fn should_be_serialized(&self) -> bool {
        true
    }

    fn is_checkpoint(&self) -> bool {
        true
    }
}

// =============================================================================
// PostNextPlayer
// =============================================================================

/// End-of-turn cleanup for the player who just passed the turn.
#[derive(Debug, Default)]
pub struct PostNextPlayerAction {
    armor: Option<(PlayerId, i32)>,
    tracker: AnimationTracker,
}

impl GameAction for PostNextPlayerAction {
    fn name(&self) -> &'static str {
        POST_NEXT_PLAYER
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, _params: &ActionParams) -> Result<(), ActionError> {
        let finished = ctx.board.inactive_mut();
        finished.bury_pending_destruction();
        finished.discard_hand();
        finished.modifiers.retain_permanent();
        finished.played_card_combo_this_turn = 0;
        finished.zero_cost_time = false;

        let active_id = ctx.board.active_player_id();
        let active = ctx.board.active_mut();
        active.modifiers.mask.remove(BoardModifierMask::DOUBLE_POISON_ATTACKS);
        if active.armor_recharge > 0 {
            active.armor += active.armor_recharge;
            self.armor = Some((active_id, active.armor));
        }
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        if let Some((player, value)) = self.armor {
            let duration_ms = anim.config.timings.stat_change_ms;
            let handle = anim.request(AnimationRequest::StatChange {
                player,
                stat: VitalStat::Armor,
                value,
                duration_ms,
            });
            self.tracker.track(handle);
        }
    }

    fn update_animation(&mut self, _dt_ms: f32) -> AnimationStatus {
        self.tracker.status()
    }

    fn on_animation_completed(&mut self, handle: SceneHandle) {
        self.tracker.complete(handle);
    }

    fn should_be_serialized(&self) -> bool {
        true
    }
}

// =============================================================================
// ZeroCostTime
// =============================================================================

/// Counts plays under the every-third-card-free modifier.
///
/// The second play opens zero-cost time by pushing every held card's weight
/// override down by the configured amount; the third play closes it again.
#[derive(Debug, Default)]
pub struct ZeroCostTimeAction;

impl GameAction for ZeroCostTimeAction {
    fn name(&self) -> &'static str {
        ZERO_COST_TIME
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, _params: &ActionParams) -> Result<(), ActionError> {
        let shift = ctx.config.zero_cost_time_weight_value;
        let catalog = ctx.catalog;
        let player = ctx.board.active_mut();
        let combo = player.played_card_combo_this_turn + 1;

        let (delta, zero_cost_time, next_combo) = match combo {
            2 => (-shift, true, combo),
            3 => (shift, false, 0),
            _ => {
                player.played_card_combo_this_turn = combo;
                return Ok(());
            }
        };

        // Resolve every held card before touching any of them.
        let held_data = player
            .hand
            .iter()
            .map(|held| {
                catalog.get(held.card).ok_or_else(|| {
                    ActionError::inconsistent(ZERO_COST_TIME, format!("{} is not in the catalog", held.card))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (held, data) in player.hand.iter_mut().zip(held_data) {
            held.adjust(data, CardStatType::Weight, delta);
        }
        player.played_card_combo_this_turn = next_combo;
        player.zero_cost_time = zero_cost_time;
        Ok(())
    }

    fn should_be_serialized(&self) -> bool {
        true
    }
}
