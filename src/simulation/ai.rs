//! Automated move selection.
//!
//! The generator looks at the engine's board while it is idle, decides which
//! held cards to play and pushes the plays (and usually `NextPlayer`) onto
//! the engine. Plays are simulated on a clone of the board so a run of cards
//! stays affordable; the clone is cheap because zones are `im` vectors.

use serde::{Deserialize, Serialize};

use crate::actions::names::{NEXT_PLAYER, PLAY_CARD};
use crate::actions::{ActionParams, PlayCardAction};
use crate::board::{BoardModifierMask, BoardState, CardInstance};
use crate::cards::{CardCatalog, CardData, CardEffect, CardId, EffectComponent};
use crate::core::{EngineError, GameRng, PlayerId};
use crate::engine::ActionEngine;

/// How the generator ranks spells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    /// Every priority spell is played first.
    #[default]
    Naive,
    /// Some priority spells are held back at random, and the card played
    /// last is not rushed again.
    Optimised,
}

/// Spells worth resolving before anything else is decided.
const HIGH_PRIORITY: &[EffectComponent] = &[
    EffectComponent::RandomHandBuffAttack,
    EffectComponent::TripplesLowestAttackOnHand,
    EffectComponent::SwapMinMaxDamage,
    EffectComponent::DuplicateNextInsect,
    EffectComponent::SpellKill,
    EffectComponent::AddPoisonStacks,
    EffectComponent::DoubleNextDinoDamage,
    EffectComponent::HealNextDinoDamage,
    EffectComponent::EveryThirdCardPlayedHasZeroCost,
    EffectComponent::CardToken,
    EffectComponent::DoublePoisonAttacks,
    EffectComponent::DigNoFail,
    EffectComponent::DrawRandomSpell,
    EffectComponent::Armor,
    EffectComponent::ToxicBomb,
    EffectComponent::InsectMegaswarm,
    EffectComponent::Meteor,
    EffectComponent::InsectVirus,
    EffectComponent::RodentLifesteal,
];

/// Priority spells the optimised generator only rushes half the time.
const COIN_FLIP_PRIORITY: &[EffectComponent] = &[
    EffectComponent::Draw,
    EffectComponent::Family,
    EffectComponent::ClearEffects,
    EffectComponent::EnemyBoardDebuff,
    EffectComponent::DemonKill,
    EffectComponent::HoundSummon,
    EffectComponent::DemonPunch,
];

struct Candidate {
    instance: CardInstance,
    high_priority: bool,
    damage: i32,
}

/// Decides one player's moves.
#[derive(Clone, Debug)]
pub struct ActionGenerator {
    kind: GeneratorKind,
    rng: GameRng,
    last_played: Option<(PlayerId, CardId)>,
}

impl ActionGenerator {
    /// Generator whose coin flips derive from the battle seed.
    #[must_use]
    pub fn new(kind: GeneratorKind, battle_seed: u64) -> Self {
        Self {
            kind,
            rng: GameRng::new(battle_seed).for_context("ai"),
            last_played: None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> GeneratorKind {
        self.kind
    }

    /// Push the next batch of moves for the active player.
    ///
    /// Cards are played highest priority first, then by descending damage.
    /// The batch stops right after a priority or single-use card so its
    /// effects resolve before the next decision; otherwise it ends with
    /// `NextPlayer`. Returns the number of actions pushed.
    pub fn decide_and_push_next_actions(&mut self, engine: &mut ActionEngine) -> Result<usize, EngineError> {
        let mut board = engine.board().clone();
        if board.active_player().is_none() {
            engine.add_game_action(NEXT_PLAYER, ActionParams::new())?;
            return Ok(1);
        }

        let catalog = engine.catalog().clone();
        let player = board.active_player_id();
        let mut candidates = self.rank_hand(&catalog, &board, player);

        let mut pushed = 0;
        let mut wait_for_effects = false;
        let mut i = 0;
        while i < candidates.len() {
            let candidate = &candidates[i];
            let Some(data) = catalog.get(candidate.instance.card) else {
                i += 1;
                continue;
            };
            let Some(index) = board
                .player(player)
                .hand
                .iter()
                .position(|held| held.id == candidate.instance.id)
            else {
                i += 1;
                continue;
            };

            if !engine.rules().can_card_be_played(Some(data), index, player, &board) {
                i += 1;
                continue;
            }

            engine.add_game_action(PLAY_CARD, PlayCardAction::params(index))?;
            pushed += 1;
            self.last_played = Some((player, data.id));

            let state = board.player_mut(player);
            let held = state.hand.remove(index);
            let weight = engine.rules().effective_weight(data, &held, state);
            state.current_weight -= weight;
            state.board.push_back(held);

            wait_for_effects = candidate.high_priority || data.is_single_use;
            candidates.remove(i);
            if wait_for_effects {
                break;
            }
        }

        if !wait_for_effects {
            engine.add_game_action(NEXT_PLAYER, ActionParams::new())?;
            pushed += 1;
        }
        Ok(pushed)
    }

    fn rank_hand(
        &mut self,
        catalog: &CardCatalog,
        board: &BoardState,
        player: PlayerId,
    ) -> Vec<Candidate> {
        let state = board.player(player);
        let weight_reduction_armed = state.has_modifier(BoardModifierMask::PERMANENT_CONTINUAL_WEIGHT_REDUCTION);

        let mut candidates: Vec<Candidate> = state
            .hand
            .iter()
            .filter_map(|held| {
                let data = catalog.get(held.card)?;
                let mut high_priority = self.is_high_priority(data, weight_reduction_armed);
                if self.kind == GeneratorKind::Optimised {
                    high_priority &= self.last_played != Some((player, data.id));
                }
                Some(Candidate {
                    instance: held.clone(),
                    high_priority,
                    damage: data.damage,
                })
            })
            .collect();

        candidates.sort_by(|a, b| match (a.high_priority, b.high_priority) {
            (true, true) => a.instance.card.cmp(&b.instance.card),
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            (false, false) => b.damage.cmp(&a.damage),
        });
        candidates
    }

    fn is_high_priority(&mut self, data: &CardData, weight_reduction_armed: bool) -> bool {
        if !data.is_spell() {
            return false;
        }
        let Ok(effect) = CardEffect::parse(&data.effect) else {
            return false;
        };
        let optimised = self.kind == GeneratorKind::Optimised;

        if COIN_FLIP_PRIORITY.iter().any(|&c| effect.has(c)) {
            return !optimised || self.rng.gen_bool(0.5);
        }
        if effect.has(EffectComponent::PermanentContinualWeightReduction) {
            return !optimised || !weight_reduction_armed;
        }
        HIGH_PRIORITY.iter().any(|&c| effect.has(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::board::BattleSetup;
    use crate::core::BattleConfig;

    const BEE: CardId = CardId(1);
    const SCORPION: CardId = CardId(5);
    const SCAVENGE: CardId = CardId(53);
    const FOSSIL_ARMOR: CardId = CardId(64);
    const RAT_TRAP: CardId = CardId(52);

    fn engine_with_hand(hand: Vec<CardId>) -> ActionEngine {
        let setup = BattleSetup::new(3, hand, vec![BEE; 10]);
        let config = BattleConfig::headless()
            .with_cards_drawn_per_turn(10)
            .with_starting_weights(9, 9);
        let mut engine = ActionEngine::new(&setup, Arc::new(CardCatalog::standard()), config);
        engine.add_game_action(NEXT_PLAYER, ActionParams::new()).unwrap();
        engine.run_until_idle().unwrap();
        engine
    }

    fn held_cards(engine: &ActionEngine) -> Vec<CardId> {
        engine.board().active().hand.iter().map(|c| c.card).collect()
    }

    #[test]
    fn test_first_decision_starts_the_battle() {
        let setup = BattleSetup::new(3, vec![BEE; 5], vec![BEE; 5]);
        let mut engine = ActionEngine::new(&setup, Arc::new(CardCatalog::standard()), BattleConfig::headless());
        let mut generator = ActionGenerator::new(GeneratorKind::Naive, 3);

        assert_eq!(generator.decide_and_push_next_actions(&mut engine).unwrap(), 1);
        assert_eq!(engine.queued_action_names().collect::<Vec<_>>(), vec![NEXT_PLAYER]);
    }

    #[test]
    fn test_creatures_by_descending_damage_then_end_turn() {
        let mut engine = engine_with_hand(vec![BEE, SCORPION]);
        let mut generator = ActionGenerator::new(GeneratorKind::Naive, 3);

        let pushed = generator.decide_and_push_next_actions(&mut engine).unwrap();

        assert_eq!(pushed, 3);
        let names: Vec<_> = engine.queued_action_names().collect();
        assert_eq!(names, vec![PLAY_CARD, PLAY_CARD, NEXT_PLAYER]);

        engine.update(0.0).unwrap();
        let top = engine.board().player(PlayerId::TOP);
        assert_eq!(top.board[0].card, SCORPION);
        assert_eq!(top.hand.iter().map(|c| c.card).collect::<Vec<_>>(), vec![BEE]);
    }

    #[test]
    fn test_priority_spell_played_alone() {
        let mut engine = engine_with_hand(vec![SCORPION, SCAVENGE]);
        let mut generator = ActionGenerator::new(GeneratorKind::Naive, 3);

        assert_eq!(held_cards(&engine).len(), 2);
        assert_eq!(generator.decide_and_push_next_actions(&mut engine).unwrap(), 1);
        assert_eq!(engine.queued_action_names().collect::<Vec<_>>(), vec![PLAY_CARD]);

        engine.update(0.0).unwrap();
        assert_eq!(held_cards(&engine), vec![SCORPION]);
    }

    #[test]
    fn test_plain_spells_are_not_priority() {
        let mut generator = ActionGenerator::new(GeneratorKind::Naive, 1);
        let catalog = CardCatalog::standard();

        assert!(!generator.is_high_priority(catalog.get(RAT_TRAP).unwrap(), false));
        assert!(!generator.is_high_priority(catalog.get(BEE).unwrap(), false));
        assert!(generator.is_high_priority(catalog.get(FOSSIL_ARMOR).unwrap(), false));
        assert!(generator.is_high_priority(catalog.get(SCAVENGE).unwrap(), false));
    }

    #[test]
    fn test_nothing_playable_ends_turn() {
        let config = BattleConfig::headless().with_starting_weights(0, 0).with_weight_limit(0);
        let setup = BattleSetup::new(3, vec![SCORPION; 6], vec![BEE; 6]);
        let mut engine = ActionEngine::new(&setup, Arc::new(CardCatalog::standard()), config);
        engine.add_game_action(NEXT_PLAYER, ActionParams::new()).unwrap();
        engine.run_until_idle().unwrap();

        let mut generator = ActionGenerator::new(GeneratorKind::Optimised, 3);
        assert_eq!(generator.decide_and_push_next_actions(&mut engine).unwrap(), 1);
        assert_eq!(engine.queued_action_names().collect::<Vec<_>>(), vec![NEXT_PLAYER]);
    }
}
