use log::debug;

use super::animation::{AnimationContext, AnimationRequest, AnimationStatus, AnimationTracker, HistoryEntryType, SceneHandle};
use super::context::ActionContext;
use super::cosmetic::history_entry;
use super::names::{
    CARD_EFFECT, CARD_PLAYED_PARTICLE_EFFECT, HEAL_NEXT_DINO_DAMAGE, INSECT_DUPLICATION, INSECT_VIRUS,
    NEXT_DINO_DAMAGE_DOUBLING, PLAY_CARD, SPELL_KILL, TRAP_TRIGGERED, ZERO_COST_TIME, CARD_HISTORY_ENTRY_ADDITION,
};
use super::params::ActionParams;
use super::traps::TrapTriggeredAction;
use super::GameAction;
use crate::board::BoardModifierMask;
use crate::cards::{CardFamily, CardId};
use crate::core::{ActionError, InstanceId, PlayerId};

/// The active player plays a held card onto their board.
///
/// An illegal play is dropped without touching the board. Otherwise the card
/// moves with its overrides, its weight is paid, and whatever the card or the
/// player's armed modifiers call for is chained.
#[derive(Debug, Default)]
pub struct PlayCardAction {
    played: Option<(PlayerId, InstanceId, CardId)>,
    tracker: AnimationTracker,
}

impl PlayCardAction {
    /// Index of the card in the active player's hand.
    pub const CARD_INDEX_PARAM: &'static str = "card_index";

    #[must_use]
    pub fn params(card_index: usize) -> ActionParams {
        ActionParams::new().with(Self::CARD_INDEX_PARAM, card_index)
    }

    /// Whether the last activation was dropped as illegal.
    #[must_use]
    pub fn was_aborted(&self) -> bool {
        self.played.is_none()
    }
}

impl GameAction for PlayCardAction {
    fn name(&self) -> &'static str {
        PLAY_CARD
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, params: &ActionParams) -> Result<(), ActionError> {
        let card_index: usize = params.parse(PLAY_CARD, Self::CARD_INDEX_PARAM)?;
        let player_id = ctx.board.active_player_id();

        if !ctx.rules.can_play_held(card_index, player_id, ctx.board) {
            debug!("{player_id} cannot play held card {card_index}, dropping play");
            return Ok(());
        }

        let card_id = ctx.board.active().hand[card_index].card;
        let data = ctx.card(PLAY_CARD, card_id)?;
        let rules = ctx.rules;
        let player = ctx.board.active_mut();
        let held = player.hand.remove(card_index);
        let weight = rules.effective_weight(data, &held, player);

        self.played = Some((player_id, held.id, held.card));
        player.board.push_back(held);
        player.current_weight -= weight;
        let board_index = player.board.len() - 1;
        let mask = player.modifiers.mask;

        if data.particle_effect.is_some() {
            ctx.chain(CARD_PLAYED_PARTICLE_EFFECT);
        }

        let mut consumed = BoardModifierMask::NONE;
        if data.is_spell() {
            if mask.contains(BoardModifierMask::SPELL_KILL_NEXT) {
                ctx.add_game_action(
                    CARD_HISTORY_ENTRY_ADDITION,
                    history_entry(player_id, board_index, HistoryEntryType::Death),
                );
                ctx.chain(SPELL_KILL);
                ctx.board.active_mut().modifiers.mask.remove(BoardModifierMask::SPELL_KILL_NEXT);
                return Ok(());
            }
            ctx.add_game_action(
                CARD_HISTORY_ENTRY_ADDITION,
                history_entry(player_id, board_index, HistoryEntryType::Effect),
            );
            ctx.chain(CARD_EFFECT);
        } else {
            for trap in [BoardModifierMask::KILL_NEXT, BoardModifierMask::DEMON_KILL_NEXT] {
                if mask.contains(trap) {
                    ctx.add_game_action(
                        CARD_HISTORY_ENTRY_ADDITION,
                        history_entry(player_id, board_index, HistoryEntryType::Death),
                    );
                    ctx.add_game_action(TRAP_TRIGGERED, TrapTriggeredAction::kill());
                    ctx.board.active_mut().modifiers.mask.remove(trap);
                    return Ok(());
                }
            }

            if data.family == CardFamily::Dinosaurs {
                if mask.contains(BoardModifierMask::DOUBLE_NEXT_DINO_DAMAGE) {
                    ctx.chain(NEXT_DINO_DAMAGE_DOUBLING);
                    consumed.insert(BoardModifierMask::DOUBLE_NEXT_DINO_DAMAGE);
                }
                if mask.contains(BoardModifierMask::HEAL_NEXT_DINO_DAMAGE) {
                    ctx.chain(HEAL_NEXT_DINO_DAMAGE);
                    consumed.insert(BoardModifierMask::HEAL_NEXT_DINO_DAMAGE);
                }
            }
            if mask.contains(BoardModifierMask::BOARD_SIDE_DEBUFF) {
                ctx.add_game_action(TRAP_TRIGGERED, TrapTriggeredAction::debuff());
            }
            if data.family == CardFamily::Insects && mask.contains(BoardModifierMask::DUPLICATE_NEXT_INSECT) {
                ctx.chain(INSECT_DUPLICATION);
                consumed.insert(BoardModifierMask::DUPLICATE_NEXT_INSECT);
            }
        }
        ctx.board.active_mut().modifiers.mask.remove(consumed);

        if mask.contains(BoardModifierMask::INSECT_VIRUS) {
            ctx.chain(INSECT_VIRUS);
        }
        if mask.contains(BoardModifierMask::EVERY_THIRD_CARD_PLAYED_HAS_ZERO_COST) {
            ctx.chain(ZERO_COST_TIME);
        }
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        if let Some((player, instance, card)) = self.played {
            let duration_ms = anim.config.timings.card_play_ms;
            let handle = anim.request(AnimationRequest::CardPlay { player, instance, card, duration_ms });
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

    fn required_extra_param_names(&self) -> &'static [&'static str] {
        &[Self::CARD_INDEX_PARAM]
    }
}
