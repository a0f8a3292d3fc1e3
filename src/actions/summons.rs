//! Actions that put new cards straight onto the active board.
//!
//! Summoned cards are fresh instances: they never pass through the deck or
//! the hand, and they are not bounded by `max_board_cards`.

use smallvec::SmallVec;

use super::animation::{AnimationContext, AnimationRequest, AnimationStatus, AnimationTracker, SceneHandle};
use super::context::ActionContext;
use super::names::{HOUND_SUMMONING, INSECT_DUPLICATION, INSECT_MEGA_SWARM};
use super::params::ActionParams;
use super::GameAction;
use crate::board::CardInstance;
use crate::cards::CardId;
use crate::core::{ActionError, InstanceId, PlayerId};

type Summoned = SmallVec<[(InstanceId, CardId); 4]>;

/// Put `cards` on the active board as new instances.
fn summon(ctx: &mut ActionContext<'_>, cards: impl IntoIterator<Item = CardId>) -> (PlayerId, Summoned) {
    let player = ctx.board.active_player_id();
    let mut summoned = Summoned::new();
    for card in cards {
        let instance = ctx.board.spawn_instance(card);
        summoned.push((instance.id, instance.card));
        ctx.board.active_mut().board.push_back(instance);
    }
    (player, summoned)
}

fn request_summons(anim: &mut AnimationContext<'_>, tracker: &mut AnimationTracker, player: PlayerId, summoned: &Summoned) {
    let duration_ms = anim.config.timings.card_play_ms;
    for &(instance, card) in summoned {
        let handle = anim.request(AnimationRequest::CardSummon { player, instance, card, duration_ms });
        tracker.track(handle);
    }
}

// =============================================================================
// HoundSummoning
// =============================================================================

/// Summons random demon hounds from the catalog.
#[derive(Debug, Default)]
pub struct HoundSummoningAction {
    summoned: Option<(PlayerId, Summoned)>,
    tracker: AnimationTracker,
}

impl HoundSummoningAction {
    pub const NUMBER_OF_HOUNDS_PARAM: &'static str = "number_of_hounds";

    #[must_use]
    pub fn params(count: usize) -> ActionParams {
        ActionParams::new().with(Self::NUMBER_OF_HOUNDS_PARAM, count)
    }
}

impl GameAction for HoundSummoningAction {
    fn name(&self) -> &'static str {
        HOUND_SUMMONING
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, params: &ActionParams) -> Result<(), ActionError> {
        let count: usize = params.parse(HOUND_SUMMONING, Self::NUMBER_OF_HOUNDS_PARAM)?;
        let hounds = ctx.catalog.hound_ids();
        if hounds.is_empty() && count > 0 {
            return Err(ActionError::inconsistent(HOUND_SUMMONING, "the catalog has no hounds"));
        }

        let picks: Vec<CardId> = (0..count)
            .filter_map(|_| ctx.rng.choose(&hounds).copied())
            .collect();
        self.summoned = Some(summon(ctx, picks));
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        if let Some((player, summoned)) = &self.summoned {
            request_summons(anim, &mut self.tracker, *player, summoned);
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
        &[Self::NUMBER_OF_HOUNDS_PARAM]
    }
}

// =============================================================================
// InsectMegaSwarm
// =============================================================================

/// Summons `megaswarm_size` random creatures from the player's deck list.
#[derive(Debug, Default)]
pub struct InsectMegaSwarmAction {
    summoned: Option<(PlayerId, Summoned)>,
    tracker: AnimationTracker,
}

impl GameAction for InsectMegaSwarmAction {
    fn name(&self) -> &'static str {
        INSECT_MEGA_SWARM
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, _params: &ActionParams) -> Result<(), ActionError> {
        let catalog = ctx.catalog;
        let creatures: Vec<CardId> = ctx
            .board
            .active()
            .initial_deck
            .iter()
            .copied()
            .filter(|&id| catalog.get(id).is_some_and(|d| !d.is_spell()))
            .collect();

        let picks: Vec<CardId> = (0..ctx.config.megaswarm_size)
            .filter_map(|_| ctx.rng.choose(&creatures).copied())
            .collect();
        self.summoned = Some(summon(ctx, picks));
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        if let Some((player, summoned)) = &self.summoned {
            request_summons(anim, &mut self.tracker, *player, summoned);
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
// InsectDuplication
// =============================================================================

/// Copies the newest board card, overrides included, as a new instance.
#[derive(Debug, Default)]
pub struct InsectDuplicationAction {
    summoned: Option<(PlayerId, Summoned)>,
    tracker: AnimationTracker,
}

impl GameAction for InsectDuplicationAction {
    fn name(&self) -> &'static str {
        INSECT_DUPLICATION
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, _params: &ActionParams) -> Result<(), ActionError> {
        let player = ctx.board.active_player_id();
        let Some(original) = ctx.board.active().board.last().cloned() else {
            return Err(ActionError::inconsistent(INSECT_DUPLICATION, "nothing on the board to duplicate"));
        };

        let copy = CardInstance {
            overrides: original.overrides,
            ..ctx.board.spawn_instance(original.card)
        };
        let mut summoned = Summoned::new();
        summoned.push((copy.id, copy.card));
        ctx.board.active_mut().board.push_back(copy);
        self.summoned = Some((player, summoned));
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        if let Some((player, summoned)) = &self.summoned {
            request_summons(anim, &mut self.tracker, *player, summoned);
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
