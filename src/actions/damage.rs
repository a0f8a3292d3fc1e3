//! Direct damage to players: poison, meteors, demon punches and the insect
//! virus.
//!
//! All of it hits armor first, then health. A player left at zero health
//! chains a resurrection check naming the other side as the victor.

use smallvec::SmallVec;

use super::animation::{AnimationContext, AnimationRequest, AnimationStatus, AnimationTimer, AnimationTracker, SceneHandle, VitalStat};
use super::combat::CardDestructionAction;
use super::context::ActionContext;
use super::game_over::GameOverResurrectionCheckAction;
use super::names::{
    CARD_DESTRUCTION, DEMON_PUNCH, GAME_OVER_RESURRECTION_CHECK, INSECT_VIRUS, METEOR_CARD_SACRIFICE, METEOR_DAMAGE,
    POISON_STACK_APPLICATION,
};
use super::params::ActionParams;
use super::GameAction;
use crate::core::{ActionError, PlayerId};

/// Damage `target`, chaining the resurrection check if it drops to zero.
fn strike(ctx: &mut ActionContext<'_>, target: PlayerId, amount: i32) -> (i32, i32) {
    let player = ctx.board.player_mut(target);
    player.apply_damage(amount);
    let vitals = (player.armor, player.health);
    if player.health <= 0 {
        ctx.add_game_action(
            GAME_OVER_RESURRECTION_CHECK,
            GameOverResurrectionCheckAction::params(target.opponent()),
        );
    }
    vitals
}

/// Armor and health readouts after a hit.
fn request_vitals(
    anim: &mut AnimationContext<'_>,
    tracker: &mut AnimationTracker,
    player: PlayerId,
    (armor, health): (i32, i32),
) {
    let duration_ms = anim.config.timings.stat_change_ms;
    for (stat, value) in [(VitalStat::Armor, armor), (VitalStat::Health, health)] {
        let handle = anim.request(AnimationRequest::StatChange { player, stat, value, duration_ms });
        tracker.track(handle);
    }
}

// =============================================================================
// PoisonStackApplication
// =============================================================================

/// The active player takes their poison stack as damage, then the stack resets.
#[derive(Debug, Default)]
pub struct PoisonStackApplicationAction {
    hit: Option<(PlayerId, i32, (i32, i32))>,
    timer: AnimationTimer,
}

impl GameAction for PoisonStackApplicationAction {
    fn name(&self) -> &'static str {
        POISON_STACK_APPLICATION
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, _params: &ActionParams) -> Result<(), ActionError> {
        let target = ctx.board.active_player_id();
        let stack = ctx.board.active().poison_stack;
        if stack <= 0 {
            return Ok(());
        }
        let vitals = strike(ctx, target, stack);
        ctx.board.active_mut().poison_stack = 0;
        self.hit = Some((target, stack, vitals));
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        let Some((player, stack, (armor, health))) = self.hit else {
            return;
        };
        let config = anim.config;
        let timings = &config.timings;
        anim.request(AnimationRequest::StatChange {
            player,
            stat: VitalStat::Poison,
            value: 0,
            duration_ms: timings.stat_change_ms,
        });
        anim.request(AnimationRequest::StatChange {
            player,
            stat: VitalStat::Armor,
            value: armor,
            duration_ms: timings.stat_change_ms,
        });
        anim.request(AnimationRequest::StatChange {
            player,
            stat: VitalStat::Health,
            value: health,
            duration_ms: timings.stat_change_ms,
        });
        // Bigger stacks take longer to drain.
        self.timer = AnimationTimer::new(stack as f32 * timings.poison_ms_per_stack);
    }

    fn update_animation(&mut self, dt_ms: f32) -> AnimationStatus {
        self.timer.tick(dt_ms)
    }

    fn should_be_serialized(&self) -> bool {
        true
    }
}

// =============================================================================
// MeteorCardSacrifice
// =============================================================================

/// Sacrifices a random held dinosaur to power a meteor.
///
/// Every copy of the chosen card leaves the hand and the deck for exile, and
/// the meteor hits for twice the sacrificed card's damage.
#[derive(Debug, Default)]
pub struct MeteorCardSacrificeAction;

impl GameAction for MeteorCardSacrificeAction {
    fn name(&self) -> &'static str {
        METEOR_CARD_SACRIFICE
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, _params: &ActionParams) -> Result<(), ActionError> {
        let catalog = ctx.catalog;
        let player_id = ctx.board.active_player_id();
        let player = ctx.board.active_mut();

        let dinos: Vec<usize> = player
            .hand
            .iter()
            .enumerate()
            .filter(|(_, c)| catalog.get(c.card).is_some_and(|d| d.is_dino_creature()))
            .map(|(i, _)| i)
            .collect();
        // A meteor conjured from a token may find no dinosaur to burn.
        let Some(&pick) = ctx.rng.choose(&dinos) else {
            return Ok(());
        };

        let chosen = player.hand[pick].clone();
        let data = ctx.card(METEOR_CARD_SACRIFICE, chosen.card)?;
        let damage = chosen.overrides.damage.map_or(data.damage, |d| d.max(0)) * 2;

        let player = ctx.board.active_mut();
        let copies: SmallVec<[usize; 4]> = player
            .hand
            .iter()
            .enumerate()
            .filter(|(_, c)| c.card == chosen.card)
            .map(|(i, _)| i)
            .collect();
        for &idx in copies.iter().rev() {
            let card = player.hand.remove(idx);
            player.exile.push_back(card);
        }
        let (burned, kept) = std::mem::take(&mut player.deck)
            .into_iter()
            .partition::<im::Vector<_>, _>(|c| c.card == chosen.card);
        player.deck = kept;
        player.exile.extend(burned);

        let dissolve = CardDestructionAction::params(player_id, &copies, false, false)
            .with(CardDestructionAction::IS_SINGLE_USE_COPY_PARAM, true);
        ctx.add_game_action(CARD_DESTRUCTION, dissolve);
        ctx.add_game_action(METEOR_DAMAGE, MeteorDamageAction::params(damage));
        Ok(())
    }

    fn should_be_serialized(&self) -> bool {
        true
    }
}

// =============================================================================
// MeteorDamage / DemonPunch
// =============================================================================

/// Shared body of the two spell hits on the inactive player.
fn hit_inactive(ctx: &mut ActionContext<'_>, action: &str, params: &ActionParams, param: &str) -> Result<Option<(PlayerId, (i32, i32))>, ActionError> {
    let damage: i32 = params.parse(action, param)?;
    if damage <= 0 {
        return Ok(None);
    }
    let target = ctx.board.inactive_player_id();
    Ok(Some((target, strike(ctx, target, damage))))
}

/// A meteor hits the inactive player.
#[derive(Debug, Default)]
pub struct MeteorDamageAction {
    hit: Option<(PlayerId, (i32, i32))>,
    tracker: AnimationTracker,
}

impl MeteorDamageAction {
    pub const METEOR_DAMAGE_PARAM: &'static str = "meteor_damage";

    #[must_use]
    pub fn params(damage: i32) -> ActionParams {
        ActionParams::new().with(Self::METEOR_DAMAGE_PARAM, damage)
    }
}

impl GameAction for MeteorDamageAction {
    fn name(&self) -> &'static str {
        METEOR_DAMAGE
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, params: &ActionParams) -> Result<(), ActionError> {
        self.hit = hit_inactive(ctx, METEOR_DAMAGE, params, Self::METEOR_DAMAGE_PARAM)?;
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        if let Some((player, vitals)) = self.hit {
            request_vitals(anim, &mut self.tracker, player, vitals);
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
        &[Self::METEOR_DAMAGE_PARAM]
    }
}

/// A demon punch hits the inactive player.
#[derive(Debug, Default)]
pub struct DemonPunchAction {
    hit: Option<(PlayerId, (i32, i32))>,
    tracker: AnimationTracker,
}

impl DemonPunchAction {
    pub const DAMAGE_PARAM: &'static str = "damage";

    #[must_use]
    pub fn params(damage: i32) -> ActionParams {
        ActionParams::new().with(Self::DAMAGE_PARAM, damage)
    }
}

impl GameAction for DemonPunchAction {
    fn name(&self) -> &'static str {
        DEMON_PUNCH
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, params: &ActionParams) -> Result<(), ActionError> {
        self.hit = hit_inactive(ctx, DEMON_PUNCH, params, Self::DAMAGE_PARAM)?;
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        if let Some((player, vitals)) = self.hit {
            request_vitals(anim, &mut self.tracker, player, vitals);
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
        &[Self::DAMAGE_PARAM]
    }
}

// =============================================================================
// InsectVirus
// =============================================================================

/// Each play under the virus drains one point from the player to the opponent.
#[derive(Debug, Default)]
pub struct InsectVirusAction {
    drained: Option<(PlayerId, (i32, i32))>,
    tracker: AnimationTracker,
}

impl GameAction for InsectVirusAction {
    fn name(&self) -> &'static str {
        INSECT_VIRUS
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, _params: &ActionParams) -> Result<(), ActionError> {
        let target = ctx.board.active_player_id();
        let vitals = strike(ctx, target, 1);
        ctx.board.inactive_mut().heal(1);
        self.drained = Some((target, vitals));
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        if let Some((player, vitals)) = self.drained {
            request_vitals(anim, &mut self.tracker, player, vitals);
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
