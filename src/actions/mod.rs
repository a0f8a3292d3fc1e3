//! Actions: the units the engine queues, applies and animates.
//!
//! Every action runs in two phases:
//!
//! 1. **Logical**: `set_new_game_state` mutates the board exactly once and
//!    may request follow-up actions through the context.
//! 2. **Presentation**: `init_animation` asks the presenter for visuals,
//!    then `update_animation` is ticked until it reports `Finished`.
//!    Headless engines still call `init_animation` but drop its requests
//!    and never tick `update_animation`.
//!
//! The engine tracks where each action is in that lifecycle as an
//! [`ActionPhase`].
//!
//! ## Catalog
//!
//! Actions are registered by name in an [`ActionFactory`]. The names used
//! by the standard set live in [`names`].

pub mod animation;
pub mod context;
pub mod factory;
pub mod params;

mod buffs;
mod combat;
mod cosmetic;
mod damage;
mod draw;
mod effect;
mod game_over;
mod play;
mod summons;
mod traps;
mod turn;

pub use animation::{
    AnimationContext, AnimationRequest, AnimationStatus, AnimationTimer, AnimationTracker, BattleSubscene,
    HistoryEntryType, SceneHandle, VitalStat,
};
pub use context::{ActionContext, ActionDescriptor};
pub use factory::{ActionConstructor, ActionFactory};
pub use params::{format_indices, ActionParams};

pub use buffs::{DinoDamageReversalAction, HealNextDinoDamageAction, NextDinoDamageDoublingAction};
pub use combat::{CardAttackAction, CardDestructionAction, RodentsDigAction};
pub use cosmetic::{
    BattleInitialSetupAndAnimationAction, CardBuffedDebuffedAnimationAction, CardHistoryEntryAdditionAction,
    CardPlayedParticleEffectAction, IdleAction,
};
pub use damage::{DemonPunchAction, InsectVirusAction, MeteorCardSacrificeAction, MeteorDamageAction, PoisonStackApplicationAction};
pub use draw::DrawCardAction;
pub use effect::CardEffectAction;
pub use game_over::{GameOverAction, GameOverResurrectionCheckAction};
pub use play::PlayCardAction;
pub use summons::{HoundSummoningAction, InsectDuplicationAction, InsectMegaSwarmAction};
pub use traps::{SpellKillAction, TrapKind, TrapTriggeredAction};
pub use turn::{NextPlayerAction, PostNextPlayerAction, ZeroCostTimeAction};

use crate::core::ActionError;

/// Registry names of the standard actions.
pub mod names {
    pub const DRAW_CARD: &str = "DrawCard";
    pub const PLAY_CARD: &str = "PlayCard";
    pub const CARD_ATTACK: &str = "CardAttack";
    pub const CARD_DESTRUCTION: &str = "CardDestruction";
    pub const RODENTS_DIG: &str = "RodentsDig";
    pub const POISON_STACK_APPLICATION: &str = "PoisonStackApplication";
    pub const METEOR_CARD_SACRIFICE: &str = "MeteorCardSacrifice";
    pub const METEOR_DAMAGE: &str = "MeteorDamage";
    pub const DEMON_PUNCH: &str = "DemonPunch";
    pub const INSECT_VIRUS: &str = "InsectVirus";
    pub const HOUND_SUMMONING: &str = "HoundSummoning";
    pub const INSECT_MEGA_SWARM: &str = "InsectMegaSwarm";
    pub const INSECT_DUPLICATION: &str = "InsectDuplication";
    pub const NEXT_DINO_DAMAGE_DOUBLING: &str = "NextDinoDamageDoubling";
    pub const HEAL_NEXT_DINO_DAMAGE: &str = "HealNextDinoDamage";
    pub const DINO_DAMAGE_REVERSAL: &str = "DinoDamageReversal";
    pub const ZERO_COST_TIME: &str = "ZeroCostTime";
    pub const CARD_EFFECT: &str = "CardEffect";
    pub const SPELL_KILL: &str = "SpellKill";
    pub const TRAP_TRIGGERED: &str = "TrapTriggered";
    pub const NEXT_PLAYER: &str = "NextPlayer";
    pub const POST_NEXT_PLAYER: &str = "PostNextPlayer";
    pub const GAME_OVER_RESURRECTION_CHECK: &str = "GameOverResurrectionCheck";
    pub const GAME_OVER: &str = "GameOver";
    pub const CARD_BUFFED_DEBUFFED_ANIMATION: &str = "CardBuffedDebuffedAnimation";
    pub const CARD_HISTORY_ENTRY_ADDITION: &str = "CardHistoryEntryAddition";
    pub const CARD_PLAYED_PARTICLE_EFFECT: &str = "CardPlayedParticleEffect";
    pub const IDLE: &str = "Idle";
    pub const BATTLE_INITIAL_SETUP_AND_ANIMATION: &str = "BattleInitialSetupAndAnimation";
}

/// Where an action is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionPhase {
    /// Constructed and queued.
    Created,
    /// Logical phase done.
    StateApplied,
    /// Presentation phase running.
    Animating,
    /// Done; the engine discards it.
    Finished,
}

/// A battle action.
///
/// Implementations keep whatever they learn during the logical phase
/// (indices, damage dealt) in their own fields for the presentation phase.
pub trait GameAction {
    /// Registry name.
    fn name(&self) -> &'static str;

    /// Apply the logical mutation. Called exactly once, before any other hook.
    fn set_new_game_state(
        &mut self,
        ctx: &mut ActionContext<'_>,
        params: &ActionParams,
    ) -> Result<(), ActionError>;

    /// Request visuals. Called once, after the logical phase, in every
    /// engine mode; headless engines discard the requests.
    fn init_animation(&mut self, _anim: &mut AnimationContext<'_>) {}

    /// Advance the presentation by `dt_ms` milliseconds.
    fn update_animation(&mut self, _dt_ms: f32) -> AnimationStatus {
        AnimationStatus::Finished
    }

    /// A requested animation finished.
    fn on_animation_completed(&mut self, _handle: SceneHandle) {}

    /// Gameplay actions are written to the battle log; cosmetic ones are not.
    fn should_be_serialized(&self) -> bool;

    /// Parameters that must be present at enqueue time.
    fn required_extra_param_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// Activating this action flushes the battle log and records a checkpoint.
    fn is_checkpoint(&self) -> bool {
        false
    }
}

/// Check that every required parameter of `action` is present.
pub fn validate_params(action: &dyn GameAction, params: &ActionParams) -> Result<(), ActionError> {
    for &name in action.required_extra_param_names() {
        params.require(action.name(), name)?;
    }
    Ok(())
}
