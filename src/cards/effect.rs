//! Spell effect grammar.
//!
//! A spell's effect string is a space-separated list of component tokens
//! plus at most one integer value, e.g. `"DAMAGE FAMILY BOARD HELD 1"` or
//! `"HOUND_SUMMON 2"`. [`CardEffect::parse`] turns it into typed components
//! so the effect action never works with raw strings.
//!
//! ```
//! use battle_engine::cards::{CardEffect, EffectComponent};
//!
//! let effect = CardEffect::parse("ENEMY_BOARD_DEBUFF DAMAGE -1").unwrap();
//! assert!(effect.has(EffectComponent::EnemyBoardDebuff));
//! assert_eq!(effect.value, -1);
//! ```

use smallvec::SmallVec;
use thiserror::Error;

/// A recognized effect component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectComponent {
    Damage,
    Weight,
    Family,
    Board,
    Held,
    EnemyBoardDebuff,
    Draw,
    Gain1Weight,
    Gain2Weight,
    CardToken,
    Kill,
    DemonKill,
    SpellKill,
    ClearEffects,
    DuplicateNextInsect,
    DoubleNextDinoDamage,
    DoublePoisonAttacks,
    PermanentContinualWeightReduction,
    DigNoFail,
    RodentLifesteal,
    HealNextDinoDamage,
    InsectVirus,
    EveryThirdCardPlayedHasZeroCost,
    DrawRandomSpell,
    InsectMegaswarm,
    HoundSummon,
    Meteor,
    Armor,
    ToxicBomb,
    DemonPunch,
    AddPoisonStacks,
    RandomHandBuffAttack,
    TripplesLowestAttackOnHand,
    SwapMinMaxDamage,
}

impl EffectComponent {
    /// Look up a component by its token.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        use EffectComponent::*;
        let component = match token {
            "DAMAGE" => Damage,
            "WEIGHT" => Weight,
            "FAMILY" => Family,
            "BOARD" => Board,
            "HELD" => Held,
            "ENEMY_BOARD_DEBUFF" => EnemyBoardDebuff,
            "DRAW" => Draw,
            "GAIN_1_WEIGHT" => Gain1Weight,
            "GAIN_2_WEIGHT" => Gain2Weight,
            "CARD_TOKEN" => CardToken,
            "KILL" => Kill,
            "DEMON_KILL" => DemonKill,
            "SPELL_KILL" => SpellKill,
            "CLEAR_EFFECTS" => ClearEffects,
            "DUPLICATE_NEXT_INSECT" => DuplicateNextInsect,
            "DOUBLE_NEXT_DINO_DAMAGE" => DoubleNextDinoDamage,
            "DOUBLE_POISON_ATTACKS" => DoublePoisonAttacks,
            "PERMANENT_CONTINUAL_WEIGHT_REDUCTION" => PermanentContinualWeightReduction,
            "DIG_NO_FAIL" => DigNoFail,
            "RODENT_LIFESTEAL_ON_ATTACKS" => RodentLifesteal,
            "HEAL_NEXT_DINO_DAMAGE" => HealNextDinoDamage,
            "INSECT_VIRUS" => InsectVirus,
            "EVERY_THIRD_CARD_PLAYED_HAS_ZERO_COST" => EveryThirdCardPlayedHasZeroCost,
            "DRAW_RANDOM_SPELL" => DrawRandomSpell,
            "INSECT_MEGASWARM" => InsectMegaswarm,
            "HOUND_SUMMON" => HoundSummon,
            "METEOR" => Meteor,
            "ARMOR" => Armor,
            "TOXIC_BOMB" => ToxicBomb,
            "DEMON_PUNCH" => DemonPunch,
            "ADD_POISON_STACKS" => AddPoisonStacks,
            "RANDOM_HAND_BUFF_ATTACK" => RandomHandBuffAttack,
            "TRIPPLES_LOWEST_ATTACK_ON_HAND" => TripplesLowestAttackOnHand,
            "SWAP_MIN_MAX_DAMAGE" => SwapMinMaxDamage,
            _ => return None,
        };
        Some(component)
    }
}

/// Effect string could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown effect component `{0}`")]
pub struct UnknownComponent(pub String);

/// A parsed spell effect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CardEffect {
    /// Components in the order they appear in the effect string.
    pub components: SmallVec<[EffectComponent; 4]>,
    /// The integer modifier, 0 if absent. The last number wins.
    pub value: i32,
}

impl CardEffect {
    /// Parse an effect string.
    pub fn parse(effect: &str) -> Result<Self, UnknownComponent> {
        let mut parsed = CardEffect::default();
        for token in effect.split_whitespace() {
            if let Some(component) = EffectComponent::from_token(token) {
                parsed.components.push(component);
            } else if let Ok(value) = token.parse::<i32>() {
                parsed.value = value;
            } else {
                return Err(UnknownComponent(token.to_string()));
            }
        }
        Ok(parsed)
    }

    /// Check whether a component is present.
    #[must_use]
    pub fn has(&self, component: EffectComponent) -> bool {
        self.components.contains(&component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_components_and_value() {
        let effect = CardEffect::parse("DAMAGE FAMILY BOARD HELD 1").unwrap();
        assert_eq!(
            effect.components.as_slice(),
            &[
                EffectComponent::Damage,
                EffectComponent::Family,
                EffectComponent::Board,
                EffectComponent::Held
            ]
        );
        assert_eq!(effect.value, 1);
    }

    #[test]
    fn test_parse_negative_value() {
        let effect = CardEffect::parse("WEIGHT HELD -2").unwrap();
        assert_eq!(effect.value, -2);
        assert!(effect.has(EffectComponent::Weight));
    }

    #[test]
    fn test_parse_without_value() {
        let effect = CardEffect::parse("METEOR").unwrap();
        assert_eq!(effect.value, 0);
        assert!(effect.has(EffectComponent::Meteor));
        assert!(!effect.has(EffectComponent::Draw));
    }

    #[test]
    fn test_parse_empty() {
        let effect = CardEffect::parse("").unwrap();
        assert!(effect.components.is_empty());
    }

    #[test]
    fn test_unknown_component() {
        let err = CardEffect::parse("DAMAGE FIREBALL 3").unwrap_err();
        assert_eq!(err, UnknownComponent("FIREBALL".into()));
    }

    #[test]
    fn test_lookalike_tokens_are_distinct() {
        assert_eq!(EffectComponent::from_token("KILL"), Some(EffectComponent::Kill));
        assert_eq!(EffectComponent::from_token("SPELL_KILL"), Some(EffectComponent::SpellKill));
        assert_eq!(EffectComponent::from_token("kill"), None);
    }
}
