use super::animation::{AnimationContext, AnimationRequest, AnimationStatus, AnimationTracker, SceneHandle};
use super::context::ActionContext;
use super::names::DRAW_CARD;
use super::params::ActionParams;
use super::GameAction;
use crate::cards::CardId;
use crate::core::{ActionError, InstanceId, PlayerId};

/// The active player draws a random card from their deck.
///
/// An empty deck is refilled from the graveyard first. With a full hand,
/// or nothing eligible to draw, the action does nothing.
#[derive(Debug, Default)]
pub struct DrawCardAction {
    drawn: Option<(PlayerId, InstanceId, CardId)>,
    tracker: AnimationTracker,
}

impl DrawCardAction {
    /// `"true"` restricts the draw to spells.
    pub const DRAW_SPELL_ONLY_PARAM: &'static str = "draw_spell_only";
}

impl GameAction for DrawCardAction {
    fn name(&self) -> &'static str {
        DRAW_CARD
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, params: &ActionParams) -> Result<(), ActionError> {
        let spell_only = params.parse_or(DRAW_CARD, Self::DRAW_SPELL_ONLY_PARAM, false)?;
        let player_id = ctx.board.active_player_id();
        let catalog = ctx.catalog;
        let max_held = ctx.config.max_held_cards;

        let player = ctx.board.active_mut();
        if player.hand.len() >= max_held {
            return Ok(());
        }
        player.recycle_graveyard();

        let candidates: Vec<usize> = player
            .deck
            .iter()
            .enumerate()
            .filter(|(_, c)| !spell_only || catalog.get(c.card).is_some_and(|d| d.is_spell()))
            .map(|(i, _)| i)
            .collect();
        let Some(&pick) = ctx.rng.choose(&candidates) else {
            return Ok(());
        };

        let card = player.deck.remove(pick);
        self.drawn = Some((player_id, card.id, card.card));
        player.hand.push_back(card);
        player.cards_drawn_this_turn += 1;
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        if let Some((player, instance, card)) = self.drawn {
            let duration_ms = anim.config.timings.card_draw_ms;
            let handle = anim.request(AnimationRequest::CardDraw { player, instance, card, duration_ms });
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
