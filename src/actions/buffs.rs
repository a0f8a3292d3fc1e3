//! Dinosaur damage tweaks: the next-dino buffs and the hand damage swap.

use super::animation::{AnimationContext, AnimationRequest, AnimationStatus, AnimationTracker, SceneHandle, VitalStat};
use super::context::ActionContext;
use super::cosmetic::{buffed_debuffed, BUFF_SCALE_FACTOR, DEBUFF_SCALE_FACTOR};
use super::names::{CARD_BUFFED_DEBUFFED_ANIMATION, DINO_DAMAGE_REVERSAL, HEAL_NEXT_DINO_DAMAGE, NEXT_DINO_DAMAGE_DOUBLING};
use super::params::ActionParams;
use super::GameAction;
use crate::board::{CardInstance, CardStatType};
use crate::core::{ActionError, PlayerId};

fn last_board_card(ctx: &ActionContext<'_>, action: &str) -> Result<(usize, CardInstance), ActionError> {
    let board = &ctx.board.active().board;
    match board.last() {
        Some(card) => Ok((board.len() - 1, card.clone())),
        None => Err(ActionError::inconsistent(action, "no dinosaur on the board")),
    }
}

// =============================================================================
// NextDinoDamageDoubling
// =============================================================================

/// The dinosaur just played deals double damage.
#[derive(Debug, Default)]
pub struct NextDinoDamageDoublingAction;

impl GameAction for NextDinoDamageDoublingAction {
    fn name(&self) -> &'static str {
        NEXT_DINO_DAMAGE_DOUBLING
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, _params: &ActionParams) -> Result<(), ActionError> {
        let (index, card) = last_board_card(ctx, NEXT_DINO_DAMAGE_DOUBLING)?;
        let data = ctx.card(NEXT_DINO_DAMAGE_DOUBLING, card.card)?;
        let doubled = card.damage(data) * 2;

        let player = ctx.board.active_player_id();
        ctx.board.active_mut().board[index]
            .overrides
            .set(CardStatType::Damage, doubled);
        ctx.add_game_action(
            CARD_BUFFED_DEBUFFED_ANIMATION,
            buffed_debuffed(player, index, true, BUFF_SCALE_FACTOR),
        );
        Ok(())
    }

    fn should_be_serialized(&self) -> bool {
        true
    }
}

// =============================================================================
// HealNextDinoDamage
// =============================================================================

/// The active player heals by the damage of the dinosaur just played.
#[derive(Debug, Default)]
pub struct HealNextDinoDamageAction {
    healed: Option<(PlayerId, i32)>,
    tracker: AnimationTracker,
}

impl GameAction for HealNextDinoDamageAction {
    fn name(&self) -> &'static str {
        HEAL_NEXT_DINO_DAMAGE
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, _params: &ActionParams) -> Result<(), ActionError> {
        let (_, card) = last_board_card(ctx, HEAL_NEXT_DINO_DAMAGE)?;
        let data = ctx.card(HEAL_NEXT_DINO_DAMAGE, card.card)?;
        let amount = ctx.rules.effective_damage(data, &card, ctx.board.active());
        if amount <= 0 {
            return Ok(());
        }

        let player_id = ctx.board.active_player_id();
        let player = ctx.board.active_mut();
        let before = player.health;
        player.heal(amount);
        if player.health != before {
            self.healed = Some((player_id, player.health));
        }
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        if let Some((player, value)) = self.healed {
            let duration_ms = anim.config.timings.stat_change_ms;
            let handle = anim.request(AnimationRequest::StatChange {
                player,
                stat: VitalStat::Health,
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
// DinoDamageReversal
// =============================================================================

/// Swaps damage between the weakest and the strongest held dinosaurs.
///
/// Weakest and strongest are ranked by base damage; ties keep hand order.
/// The swapped values are the current ones, overrides included.
#[derive(Debug, Default)]
pub struct DinoDamageReversalAction;

impl GameAction for DinoDamageReversalAction {
    fn name(&self) -> &'static str {
        DINO_DAMAGE_REVERSAL
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, _params: &ActionParams) -> Result<(), ActionError> {
        let catalog = ctx.catalog;
        let player_id = ctx.board.active_player_id();

        let mut dinos: Vec<(usize, i32, i32)> = ctx
            .board
            .active()
            .hand
            .iter()
            .enumerate()
            .filter_map(|(i, card)| {
                let data = catalog.get(card.card).filter(|d| d.is_dino_creature())?;
                Some((i, data.damage, card.damage(data)))
            })
            .collect();
        if dinos.len() < 2 {
            return Ok(());
        }
        dinos.sort_by_key(|&(_, base, _)| base);

        let (low, low_base, low_damage) = dinos[0];
        let (high, high_base, high_damage) = dinos[dinos.len() - 1];
        let hand = &mut ctx.board.active_mut().hand;
        hand[low].overrides.set(CardStatType::Damage, high_damage);
        hand[high].overrides.set(CardStatType::Damage, low_damage);

        if low_base != high_base {
            ctx.add_game_action(
                CARD_BUFFED_DEBUFFED_ANIMATION,
                buffed_debuffed(player_id, low, false, BUFF_SCALE_FACTOR),
            );
            ctx.add_game_action(
                CARD_BUFFED_DEBUFFED_ANIMATION,
                buffed_debuffed(player_id, high, false, DEBUFF_SCALE_FACTOR),
            );
        }
        Ok(())
    }

    fn should_be_serialized(&self) -> bool {
        true
    }
}
