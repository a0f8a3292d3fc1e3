//! Action registry.
//!
//! The engine never names concrete action types. It asks an [`ActionFactory`]
//! for a fresh instance by registry name, so battle logs, the action
//! generator and tests all speak in names and parameters only.

use rustc_hash::FxHashMap;

use super::names::*;
use super::{
    BattleInitialSetupAndAnimationAction, CardAttackAction, CardBuffedDebuffedAnimationAction, CardDestructionAction, CardEffectAction,
    CardHistoryEntryAdditionAction, CardPlayedParticleEffectAction, DemonPunchAction, DinoDamageReversalAction,
    DrawCardAction, GameAction, GameOverAction, GameOverResurrectionCheckAction, HealNextDinoDamageAction,
    HoundSummoningAction, IdleAction, InsectDuplicationAction, InsectMegaSwarmAction, InsectVirusAction, MeteorCardSacrificeAction,
    MeteorDamageAction, NextDinoDamageDoublingAction, NextPlayerAction, PlayCardAction, PoisonStackApplicationAction,
    PostNextPlayerAction, RodentsDigAction, SpellKillAction, TrapTriggeredAction, ZeroCostTimeAction,
};
use crate::core::ActionError;

/// Builds a fresh action instance.
pub type ActionConstructor = Box<dyn Fn() -> Box<dyn GameAction> + Send + Sync>;

/// Registry of action constructors by name.
#[derive(Default)]
pub struct ActionFactory {
    constructors: FxHashMap<&'static str, ActionConstructor>,
}

impl ActionFactory {
    /// Create an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under `name`.
    ///
    /// Panics if the name is already taken.
    pub fn register<F>(&mut self, name: &'static str, constructor: F)
    where
        F: Fn() -> Box<dyn GameAction> + Send + Sync + 'static,
    {
        if self.constructors.contains_key(name) {
            panic!("Action `{name}` already registered");
        }
        self.constructors.insert(name, Box::new(constructor));
    }

    /// Register an action type by its `Default` constructor.
    fn register_default<A>(&mut self, name: &'static str)
    where
        A: GameAction + Default + 'static,
    {
        self.register(name, || Box::new(A::default()));
    }

    /// Build a new instance of the action registered under `name`.
    pub fn create_game_action(&self, name: &str) -> Result<Box<dyn GameAction>, ActionError> {
        self.constructors
            .get(name)
            .map(|construct| construct())
            .ok_or_else(|| ActionError::UnknownAction(name.to_string()))
    }

    /// Check if a name is registered.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Every registered name, sorted.
    #[must_use]
    pub fn registered_actions(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.constructors.keys().copied().collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Factory with every built-in battle action registered.
    #[must_use]
    pub fn standard() -> Self {
        let mut factory = Self::new();

        factory.register_default::<DrawCardAction>(DRAW_CARD);
        factory.register_default::<PlayCardAction>(PLAY_CARD);
        factory.register_default::<CardAttackAction>(CARD_ATTACK);
        factory.register_default::<CardDestructionAction>(CARD_DESTRUCTION);
        factory.register_default::<RodentsDigAction>(RODENTS_DIG);
        factory.register_default::<PoisonStackApplicationAction>(POISON_STACK_APPLICATION);
        factory.register_default::<MeteorCardSacrificeAction>(METEOR_CARD_SACRIFICE);
        factory.register_default::<MeteorDamageAction>(METEOR_DAMAGE);
        factory.register_default::<DemonPunchAction>(DEMON_PUNCH);
        factory.register_default::<InsectVirusAction>(INSECT_VIRUS);
        factory.register_default::<HoundSummoningAction>(HOUND_SUMMONING);
        factory.register_default::<InsectMegaSwarmAction>(INSECT_MEGA_SWARM);
        factory.register_default::<InsectDuplicationAction>(INSECT_DUPLICATION);
        factory.register_default::<NextDinoDamageDoublingAction>(NEXT_DINO_DAMAGE_DOUBLING);
        factory.register_default::<HealNextDinoDamageAction>(HEAL_NEXT_DINO_DAMAGE);
        factory.register_default::<DinoDamageReversalAction>(DINO_DAMAGE_REVERSAL);
        factory.register_default::<ZeroCostTimeAction>(ZERO_COST_TIME);
        factory.register_default::<CardEffectAction>(CARD_EFFECT);
        factory.register_default::<SpellKillAction>(SPELL_KILL);
        factory.register_default::<TrapTriggeredAction>(TRAP_TRIGGERED);
        factory.register_default::<NextPlayerAction>(NEXT_PLAYER);
        factory.register_default::<PostNextPlayerAction>(POST_NEXT_PLAYER);
        factory.register_default::<GameOverResurrectionCheckAction>(GAME_OVER_RESURRECTION_CHECK);
        factory.register_default::<GameOverAction>(GAME_OVER);

        // Cosmetic
        factory.register_default::<CardBuffedDebuffedAnimationAction>(CARD_BUFFED_DEBUFFED_ANIMATION);
        factory.register_default::<CardHistoryEntryAdditionAction>(CARD_HISTORY_ENTRY_ADDITION);
        factory.register_default::<CardPlayedParticleEffectAction>(CARD_PLAYED_PARTICLE_EFFECT);
        factory.register_default::<IdleAction>(IDLE);
        factory.register_default::<BattleInitialSetupAndAnimationAction>(BATTLE_INITIAL_SETUP_AND_ANIMATION);

        factory
    }
}

impl std::fmt::Debug for ActionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionFactory")
            .field("actions", &self.registered_actions())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_names_round_trip() {
        let factory = ActionFactory::standard();
        for name in factory.registered_actions() {
            let action = factory.create_game_action(name).unwrap();
            assert_eq!(action.name(), name);
        }
        assert_eq!(factory.len(), 29);
    }

    #[test]
    fn test_registered_actions_sorted() {
        let names = ActionFactory::standard().registered_actions();
        assert!(names.windows(2).all(|w| w[0] < w[1]));
        assert!(names.contains(&"PlayCard"));
    }

    #[test]
    fn test_unknown_action() {
        let factory = ActionFactory::standard();
        let err = factory.create_game_action("Fireball").err().unwrap();
        assert_eq!(err, ActionError::UnknownAction("Fireball".into()));
        assert!(!factory.is_registered("Fireball"));
    }

    #[test]
    fn test_only_cosmetic_actions_skip_the_log() {
        let factory = ActionFactory::standard();
        let cosmetic: Vec<_> = factory
            .registered_actions()
            .into_iter()
            .filter(|name| !factory.create_game_action(name).unwrap().should_be_serialized())
            .collect();
        assert_eq!(
            cosmetic,
            vec![
                BATTLE_INITIAL_SETUP_AND_ANIMATION,
                CARD_BUFFED_DEBUFFED_ANIMATION,
                CARD_HISTORY_ENTRY_ADDITION,
                CARD_PLAYED_PARTICLE_EFFECT,
                IDLE,
            ]
        );
    }

    #[test]
    fn test_checkpoints() {
        let factory = ActionFactory::standard();
        let checkpoints: Vec<_> = factory
            .registered_actions()
            .into_iter()
            .filter(|name| factory.create_game_action(name).unwrap().is_checkpoint())
            .collect();
        assert_eq!(checkpoints, vec![GAME_OVER, NEXT_PLAYER]);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_duplicate_registration_panics() {
        let mut factory = ActionFactory::standard();
        factory.register(DRAW_CARD, || Box::new(DrawCardAction::default()));
    }

    #[test]
    fn test_custom_registration() {
        let mut factory = ActionFactory::new();
        assert!(factory.is_empty());
        factory.register("Draw", || Box::new(DrawCardAction::default()));
        assert!(factory.is_registered("Draw"));
        assert!(factory.create_game_action("Draw").is_ok());
    }
}
