//! Presentation-only actions.
//!
//! These never change the board and are never written to the battle log.
//! Their logical phase only parses parameters for the animation.

use super::animation::{
    AnimationContext, AnimationRequest, AnimationStatus, AnimationTimer, AnimationTracker, BattleSubscene,
    HistoryEntryType, SceneHandle,
};
use super::context::ActionContext;
use super::names::{
    BATTLE_INITIAL_SETUP_AND_ANIMATION, CARD_BUFFED_DEBUFFED_ANIMATION, CARD_HISTORY_ENTRY_ADDITION,
    CARD_PLAYED_PARTICLE_EFFECT, IDLE,
};
use super::params::ActionParams;
use super::GameAction;
use crate::core::{ActionError, PlayerId};

/// Scale pulse for a buffed card.
pub(crate) const BUFF_SCALE_FACTOR: f32 = 1.5;

/// Scale pulse for a debuffed card.
pub(crate) const DEBUFF_SCALE_FACTOR: f32 = 0.6;

/// Parameters for a card history entry.
pub(crate) fn history_entry(player: PlayerId, card_index: usize, entry: HistoryEntryType) -> ActionParams {
    ActionParams::new()
        .with(CardHistoryEntryAdditionAction::PLAYER_INDEX_PARAM, player.index())
        .with(CardHistoryEntryAdditionAction::CARD_INDEX_PARAM, card_index)
        .with(CardHistoryEntryAdditionAction::ENTRY_TYPE_PARAM, entry)
        .with(
            CardHistoryEntryAdditionAction::IS_TURN_COUNTER_PARAM,
            entry == HistoryEntryType::TurnCounter,
        )
}

/// Parameters for a buff/debuff pulse on one card.
pub(crate) fn buffed_debuffed(player: PlayerId, card_index: usize, is_board_card: bool, scale_factor: f32) -> ActionParams {
    ActionParams::new()
        .with(CardBuffedDebuffedAnimationAction::CARD_INDEX_PARAM, card_index)
        .with(CardBuffedDebuffedAnimationAction::PLAYER_INDEX_PARAM, player.index())
        .with(CardBuffedDebuffedAnimationAction::IS_BOARD_CARD_PARAM, is_board_card)
        .with(CardBuffedDebuffedAnimationAction::SCALE_FACTOR_PARAM, scale_factor)
}

// =============================================================================
// CardBuffedDebuffedAnimation
// =============================================================================

/// Scale pulse on a buffed or debuffed card.
#[derive(Debug, Default)]
pub struct CardBuffedDebuffedAnimationAction {
    target: Option<(PlayerId, usize, bool, f32)>,
    tracker: AnimationTracker,
}

impl CardBuffedDebuffedAnimationAction {
    pub const CARD_INDEX_PARAM: &'static str = "card_index";
    pub const PLAYER_INDEX_PARAM: &'static str = "player_index";
    pub const IS_BOARD_CARD_PARAM: &'static str = "is_board_card";
    pub const SCALE_FACTOR_PARAM: &'static str = "scale_factor";
}

impl GameAction for CardBuffedDebuffedAnimationAction {
    fn name(&self) -> &'static str {
        CARD_BUFFED_DEBUFFED_ANIMATION
    }

    fn set_new_game_state(&mut self, _ctx: &mut ActionContext<'_>, params: &ActionParams) -> Result<(), ActionError> {
        let name = CARD_BUFFED_DEBUFFED_ANIMATION;
        let player = params.player(name, Self::PLAYER_INDEX_PARAM)?;
        let card_index = params.parse(name, Self::CARD_INDEX_PARAM)?;
        let is_board_card = params.parse(name, Self::IS_BOARD_CARD_PARAM)?;
        let factor = params.parse(name, Self::SCALE_FACTOR_PARAM)?;
        self.target = Some((player, card_index, is_board_card, factor));
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        let Some((player, card_index, is_board_card, factor)) = self.target else {
            return;
        };
        let zone = if is_board_card {
            &anim.board.player(player).board
        } else {
            &anim.board.player(player).hand
        };
        // The card may have left its zone before the pulse plays.
        if card_index >= zone.len() {
            return;
        }
        let duration_ms = anim.config.timings.card_scale_ms;
        let handle = anim.request(AnimationRequest::CardScale {
            player,
            card_index,
            is_board_card,
            factor,
            duration_ms,
        });
        self.tracker.track(handle);
    }

    fn update_animation(&mut self, _dt_ms: f32) -> AnimationStatus {
        self.tracker.status()
    }

    fn on_animation_completed(&mut self, handle: SceneHandle) {
        self.tracker.complete(handle);
    }

    fn should_be_serialized(&self) -> bool {
        false
    }

    fn required_extra_param_names(&self) -> &'static [&'static str] {
        &[
            Self::CARD_INDEX_PARAM,
            Self::PLAYER_INDEX_PARAM,
            Self::IS_BOARD_CARD_PARAM,
            Self::SCALE_FACTOR_PARAM,
        ]
    }
}

// =============================================================================
// CardHistoryEntryAddition
// =============================================================================

/// Adds an entry to the battle history strip.
#[derive(Debug, Default)]
pub struct CardHistoryEntryAdditionAction {
    entry: Option<(PlayerId, usize, HistoryEntryType, bool)>,
}

impl CardHistoryEntryAdditionAction {
    pub const PLAYER_INDEX_PARAM: &'static str = "player_index";
    pub const CARD_INDEX_PARAM: &'static str = "card_index";
    pub const ENTRY_TYPE_PARAM: &'static str = "entry_type";
    pub const IS_TURN_COUNTER_PARAM: &'static str = "is_turn_counter";
}

impl GameAction for CardHistoryEntryAdditionAction {
    fn name(&self) -> &'static str {
        CARD_HISTORY_ENTRY_ADDITION
    }

    fn set_new_game_state(&mut self, _ctx: &mut ActionContext<'_>, params: &ActionParams) -> Result<(), ActionError> {
        let name = CARD_HISTORY_ENTRY_ADDITION;
        let player = params.player(name, Self::PLAYER_INDEX_PARAM)?;
        let card_index = params.parse(name, Self::CARD_INDEX_PARAM)?;
        let entry = params.parse(name, Self::ENTRY_TYPE_PARAM)?;
        let is_turn_counter = params.parse(name, Self::IS_TURN_COUNTER_PARAM)?;
        self.entry = Some((player, card_index, entry, is_turn_counter));
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        if let Some((player, card_index, entry, is_turn_counter)) = self.entry {
            anim.request(AnimationRequest::HistoryEntry {
                player,
                card_index,
                entry,
                is_turn_counter,
            });
        }
    }

    fn should_be_serialized(&self) -> bool {
        false
    }

    fn required_extra_param_names(&self) -> &'static [&'static str] {
        &[
            Self::PLAYER_INDEX_PARAM,
            Self::CARD_INDEX_PARAM,
            Self::ENTRY_TYPE_PARAM,
            Self::IS_TURN_COUNTER_PARAM,
        ]
    }
}

// =============================================================================
// CardPlayedParticleEffect
// =============================================================================

/// Particle burst over the card just played.
#[derive(Debug, Default)]
pub struct CardPlayedParticleEffectAction {
    timer: AnimationTimer,
}

impl GameAction for CardPlayedParticleEffectAction {
    fn name(&self) -> &'static str {
        CARD_PLAYED_PARTICLE_EFFECT
    }

    fn set_new_game_state(&mut self, _ctx: &mut ActionContext<'_>, _params: &ActionParams) -> Result<(), ActionError> {
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        let player = anim.board.active_player_id();
        let effect = anim
            .board
            .player(player)
            .board
            .last()
            .and_then(|c| anim.catalog.get(c.card))
            .and_then(|data| data.particle_effect.clone());
        if let Some(name) = effect {
            anim.request(AnimationRequest::ParticleEffect { player, name });
            self.timer = AnimationTimer::new(anim.config.timings.card_play_ms);
        }
    }

    fn update_animation(&mut self, dt_ms: f32) -> AnimationStatus {
        self.timer.tick(dt_ms)
    }

    fn should_be_serialized(&self) -> bool {
        false
    }
}

// =============================================================================
// Idle
// =============================================================================

/// Placeholder a host can queue while it waits for input. Finishes at once.
#[derive(Debug, Default)]
pub struct IdleAction;

impl GameAction for IdleAction {
    fn name(&self) -> &'static str {
        IDLE
    }

    fn set_new_game_state(&mut self, _ctx: &mut ActionContext<'_>, _params: &ActionParams) -> Result<(), ActionError> {
        Ok(())
    }

    fn should_be_serialized(&self) -> bool {
        false
    }
}

// =============================================================================
// BattleInitialSetupAndAnimation
// =============================================================================

/// Opening presentation: the board slides in and the scene fades in.
#[derive(Debug, Default)]
pub struct BattleInitialSetupAndAnimationAction {
    subscene: Option<BattleSubscene>,
    tracker: AnimationTracker,
}

impl BattleInitialSetupAndAnimationAction {
    pub const CURRENT_BATTLE_SUBSCENE_PARAM: &'static str = "current_battle_subscene";

    #[must_use]
    pub fn params(subscene: BattleSubscene) -> ActionParams {
        ActionParams::new().with(Self::CURRENT_BATTLE_SUBSCENE_PARAM, subscene)
    }
}

impl GameAction for BattleInitialSetupAndAnimationAction {
    fn name(&self) -> &'static str {
        BATTLE_INITIAL_SETUP_AND_ANIMATION
    }

    fn set_new_game_state(&mut self, _ctx: &mut ActionContext<'_>, params: &ActionParams) -> Result<(), ActionError> {
        let subscene = params.parse(BATTLE_INITIAL_SETUP_AND_ANIMATION, Self::CURRENT_BATTLE_SUBSCENE_PARAM)?;
        self.subscene = Some(subscene);
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        let Some(subscene) = self.subscene else {
            return;
        };
        let handle = anim.request(AnimationRequest::BoardEntrance {
            subscene,
            duration_ms: anim.config.timings.board_entrance_ms,
            fade_in_ms: anim.config.timings.board_fade_in_ms,
        });
        self.tracker.track(handle);
    }

    fn update_animation(&mut self, _dt_ms: f32) -> AnimationStatus {
        self.tracker.status()
    }

    fn on_animation_completed(&mut self, handle: SceneHandle) {
        self.tracker.complete(handle);
    }

    fn should_be_serialized(&self) -> bool {
        false
    }

    fn required_extra_param_names(&self) -> &'static [&'static str] {
        &[Self::CURRENT_BATTLE_SUBSCENE_PARAM]
    }
}
