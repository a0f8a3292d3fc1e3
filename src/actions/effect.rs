//! Spell resolution.
//!
//! [`CardEffectAction`] resolves the spell on top of the active board. Its
//! effect string is parsed into components (see [`crate::cards::CardEffect`])
//! and each component either changes the board directly or chains the action
//! that does the work.
//!
//! ## Order
//!
//! 1. Single-use spells exile every other copy the caster owns.
//! 2. Components resolve in effect-string order (flags, weight, chains).
//! 3. Targets are collected (`BOARD`/`HELD`, optionally `FAMILY`-only).
//! 4. Side-wide effects: draws, hounds, armor, poison, the debuff/reduction.
//! 5. Targets get `value` added to the chosen stat.
//! 6. The spell leaves the board; a `CARD_TOKEN` spell is replaced by a
//!    random card from the caster's deck list.

use smallvec::SmallVec;

use super::animation::{
    AnimationContext, AnimationRequest, AnimationStatus, AnimationTracker, HistoryEntryType, SceneHandle, VitalStat,
};
use super::combat::CardDestructionAction;
use super::context::ActionContext;
use super::cosmetic::{buffed_debuffed, history_entry, BUFF_SCALE_FACTOR, DEBUFF_SCALE_FACTOR};
use super::damage::DemonPunchAction;
use super::draw::DrawCardAction;
use super::names::{
    CARD_BUFFED_DEBUFFED_ANIMATION, CARD_DESTRUCTION, CARD_EFFECT, CARD_HISTORY_ENTRY_ADDITION,
    CARD_PLAYED_PARTICLE_EFFECT, DEMON_PUNCH, DINO_DAMAGE_REVERSAL, DRAW_CARD, HOUND_SUMMONING, INSECT_MEGA_SWARM,
    METEOR_CARD_SACRIFICE,
};
use super::params::ActionParams;
use super::summons::HoundSummoningAction;
use super::GameAction;
use crate::board::{BoardModifierMask, BoardModifiers, CardStatType};
use crate::cards::{CardData, CardEffect, CardId, EffectComponent};
use crate::core::{ActionError, PlayerId};

type Indices = SmallVec<[usize; 8]>;

/// What the presentation phase shows once the spell resolved.
#[derive(Debug)]
struct Resolved {
    player: PlayerId,
    spell_index: usize,
    vitals: SmallVec<[(PlayerId, VitalStat, i32); 4]>,
}

/// Resolves the spell on top of the active board.
#[derive(Debug, Default)]
pub struct CardEffectAction {
    resolved: Option<Resolved>,
    tracker: AnimationTracker,
}

/// Exile the caster's other copies of a single-use spell.
///
/// Hand copies get a cosmetic dissolve; deck copies vanish silently.
fn exile_copies(ctx: &mut ActionContext<'_>, player_id: PlayerId, card: CardId) {
    let player = ctx.board.active_mut();
    let held: Indices = player
        .hand
        .iter()
        .enumerate()
        .filter(|(_, c)| c.card == card)
        .map(|(i, _)| i)
        .collect();
    for &idx in held.iter().rev() {
        let copy = player.hand.remove(idx);
        player.exile.push_back(copy);
    }
    let (copies, kept) = std::mem::take(&mut player.deck)
        .into_iter()
        .partition::<im::Vector<_>, _>(|c| c.card == card);
    player.deck = kept;
    player.exile.extend(copies);

    if !held.is_empty() {
        let dissolve = CardDestructionAction::params(player_id, &held, false, false)
            .with(CardDestructionAction::IS_SINGLE_USE_COPY_PARAM, true);
        ctx.add_game_action(CARD_DESTRUCTION, dissolve);
    }
}

impl CardEffectAction {
    /// Resolve the components that act immediately, in effect-string order.
    ///
    /// Returns the stat targets are buffed in and whether the spell is a
    /// card token.
    fn resolve_components(
        ctx: &mut ActionContext<'_>,
        effect: &CardEffect,
        spell_index: usize,
        held_targets: &mut Indices,
    ) -> (CardStatType, bool) {
        let catalog = ctx.catalog;
        let player_id = ctx.board.active_player_id();
        let is_creature = |id: CardId| catalog.get(id).is_some_and(|d| !d.is_spell());
        let mut stat = CardStatType::Damage;
        let mut token = false;

        for &component in &effect.components {
            use EffectComponent::*;
            match component {
                Damage => stat = CardStatType::Damage,
                Weight => stat = CardStatType::Weight,
                RandomHandBuffAttack => {
                    stat = CardStatType::Damage;
                    let creatures: Indices = ctx
                        .board
                        .active()
                        .hand
                        .iter()
                        .enumerate()
                        .filter(|(_, c)| is_creature(c.card))
                        .map(|(i, _)| i)
                        .collect();
                    if let Some(&pick) = ctx.rng.choose(&creatures) {
                        held_targets.push(pick);
                    }
                }
                TripplesLowestAttackOnHand => {
                    stat = CardStatType::Damage;
                    let hand = &mut ctx.board.active_mut().hand;
                    let lowest = hand
                        .iter()
                        .enumerate()
                        .filter_map(|(i, c)| catalog.get(c.card).filter(|d| !d.is_spell()).map(|d| (i, d)))
                        .min_by_key(|(_, d)| d.damage);
                    if let Some((idx, data)) = lowest {
                        let tripled = hand[idx].damage(data) * 3;
                        hand[idx].overrides.set(CardStatType::Damage, tripled);
                        held_targets.push(idx);
                    }
                }
                ClearEffects => {
                    let me = ctx.board.active();
                    let (indices, is_board_card, factor): (Indices, bool, f32) =
                        if me.has_modifier(BoardModifierMask::BOARD_SIDE_DEBUFF) {
                            ((0..spell_index).collect(), true, BUFF_SCALE_FACTOR)
                        } else if me.has_modifier(BoardModifierMask::PERMANENT_CONTINUAL_WEIGHT_REDUCTION) {
                            let held: Indices = me
                                .hand
                                .iter()
                                .enumerate()
                                .filter(|(_, c)| is_creature(c.card))
                                .map(|(i, _)| i)
                                .collect();
                            (held, false, DEBUFF_SCALE_FACTOR)
                        } else {
                            (Indices::new(), false, 0.0)
                        };
                    for idx in indices {
                        ctx.add_game_action(
                            CARD_BUFFED_DEBUFFED_ANIMATION,
                            buffed_debuffed(player_id, idx, is_board_card, factor),
                        );
                    }
                    ctx.board.active_mut().modifiers = BoardModifiers::default();
                }
                Kill => ctx.board.inactive_mut().modifiers.mask.insert(BoardModifierMask::KILL_NEXT),
                SpellKill => ctx.board.inactive_mut().modifiers.mask.insert(BoardModifierMask::SPELL_KILL_NEXT),
                DemonKill => ctx.board.inactive_mut().modifiers.mask.insert(BoardModifierMask::DEMON_KILL_NEXT),
                DoublePoisonAttacks => ctx
                    .board
                    .inactive_mut()
                    .modifiers
                    .mask
                    .insert(BoardModifierMask::DOUBLE_POISON_ATTACKS),
                InsectVirus => ctx.board.inactive_mut().modifiers.mask.insert(BoardModifierMask::INSECT_VIRUS),
                DuplicateNextInsect => ctx
                    .board
                    .active_mut()
                    .modifiers
                    .mask
                    .insert(BoardModifierMask::DUPLICATE_NEXT_INSECT),
                DigNoFail => ctx.board.active_mut().modifiers.mask.insert(BoardModifierMask::DIG_NO_FAIL),
                DoubleNextDinoDamage => ctx
                    .board
                    .active_mut()
                    .modifiers
                    .mask
                    .insert(BoardModifierMask::DOUBLE_NEXT_DINO_DAMAGE),
                HealNextDinoDamage => ctx
                    .board
                    .active_mut()
                    .modifiers
                    .mask
                    .insert(BoardModifierMask::HEAL_NEXT_DINO_DAMAGE),
                RodentLifesteal => ctx.board.active_mut().modifiers.mask.insert(BoardModifierMask::RODENT_LIFESTEAL),
                Meteor => ctx.chain(METEOR_CARD_SACRIFICE),
                SwapMinMaxDamage => ctx.chain(DINO_DAMAGE_REVERSAL),
                InsectMegaswarm => ctx.chain(INSECT_MEGA_SWARM),
                Gain1Weight => ctx.board.active_mut().current_weight += 1,
                Gain2Weight => ctx.board.active_mut().current_weight += 2,
                CardToken => token = true,
                ToxicBomb => {
                    let weight = ctx.board.active().current_weight;
                    if weight > 0 {
                        let enemy = ctx.board.inactive_mut();
                        let doubled = enemy.has_modifier(BoardModifierMask::DOUBLE_POISON_ATTACKS);
                        enemy.poison_stack += if doubled { weight * 2 } else { weight };
                        ctx.board.active_mut().current_weight = 0;
                    }
                }
                DemonPunch => {
                    let weight = ctx.board.active().current_weight;
                    if weight > 0 {
                        ctx.board.active_mut().current_weight = 0;
                        ctx.add_game_action(DEMON_PUNCH, DemonPunchAction::params(weight));
                    }
                }
                // Resolved after targeting.
                Family | Board | Held | EnemyBoardDebuff | Draw | PermanentContinualWeightReduction
                | EveryThirdCardPlayedHasZeroCost | DrawRandomSpell | HoundSummon | Armor | AddPoisonStacks => {}
            }
        }
        (stat, token)
    }

    /// Creatures the spell's `BOARD`/`HELD` components target.
    fn collect_targets(
        ctx: &ActionContext<'_>,
        effect: &CardEffect,
        spell: &CardData,
        spell_index: usize,
        board_targets: &mut Indices,
        held_targets: &mut Indices,
    ) {
        let catalog = ctx.catalog;
        let family_only = effect.has(EffectComponent::Family);
        let targeted = |id: CardId| {
            catalog
                .get(id)
                .is_some_and(|d| !d.is_spell() && (!family_only || d.family == spell.family))
        };
        let me = ctx.board.active();

        if effect.has(EffectComponent::Board) {
            board_targets.extend(
                me.board
                    .iter()
                    .take(spell_index)
                    .enumerate()
                    .filter(|(_, c)| targeted(c.card))
                    .map(|(i, _)| i),
            );
        }
        if effect.has(EffectComponent::Held) {
            held_targets.extend(
                me.hand
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| targeted(c.card))
                    .map(|(i, _)| i),
            );
        }
    }

    /// Side-wide effects driven by the effect value. Returns whether the
    /// continual weight reduction was applied.
    fn apply_side_effects(ctx: &mut ActionContext<'_>, effect: &CardEffect, stat: CardStatType) -> bool {
        let value = effect.value;

        if effect.has(EffectComponent::DrawRandomSpell) {
            ctx.add_game_action(
                DRAW_CARD,
                ActionParams::new().with(DrawCardAction::DRAW_SPELL_ONLY_PARAM, true),
            );
        }
        if effect.has(EffectComponent::HoundSummon) {
            ctx.add_game_action(HOUND_SUMMONING, HoundSummoningAction::params(value.max(0) as usize));
        }
        if effect.has(EffectComponent::Armor) {
            let me = ctx.board.active_mut();
            me.armor_recharge += value;
            me.armor += value;
        }
        if effect.has(EffectComponent::AddPoisonStacks) {
            let enemy = ctx.board.inactive_mut();
            let doubled = enemy.has_modifier(BoardModifierMask::DOUBLE_POISON_ATTACKS);
            enemy.poison_stack += if doubled { value * 2 } else { value };
        }

        if effect.has(EffectComponent::EnemyBoardDebuff) {
            let enemy = &mut ctx.board.inactive_mut().modifiers;
            enemy.global_stats.add(stat, value);
            enemy.mask.insert(BoardModifierMask::BOARD_SIDE_DEBUFF);
        } else if effect.has(EffectComponent::PermanentContinualWeightReduction) {
            let me = &mut ctx.board.active_mut().modifiers;
            me.global_stats.add(stat, -1);
            me.mask.insert(BoardModifierMask::PERMANENT_CONTINUAL_WEIGHT_REDUCTION);
            return true;
        } else if effect.has(EffectComponent::EveryThirdCardPlayedHasZeroCost) {
            let me = ctx.board.active_mut();
            me.modifiers.mask.insert(BoardModifierMask::EVERY_THIRD_CARD_PLAYED_HAS_ZERO_COST);
            me.played_card_combo_this_turn = 0;
        }
        false
    }

    /// Add the effect value to every target and chain their buff pulses.
    fn buff_targets(
        ctx: &mut ActionContext<'_>,
        stat: CardStatType,
        value: i32,
        board_targets: &Indices,
        held_targets: &Indices,
        skip_held: bool,
    ) -> Result<(), ActionError> {
        let catalog = ctx.catalog;
        let player_id = ctx.board.active_player_id();

        for &idx in board_targets {
            let card = &mut ctx.board.active_mut().board[idx];
            let data = catalog
                .get(card.card)
                .ok_or_else(|| ActionError::inconsistent(CARD_EFFECT, format!("{} is not in the catalog", card.card)))?;
            card.adjust(data, stat, value);
            ctx.add_game_action(
                CARD_BUFFED_DEBUFFED_ANIMATION,
                buffed_debuffed(player_id, idx, true, BUFF_SCALE_FACTOR),
            );
        }
        for &idx in held_targets {
            if !skip_held {
                let card = &mut ctx.board.active_mut().hand[idx];
                let data = catalog.get(card.card).ok_or_else(|| {
                    ActionError::inconsistent(CARD_EFFECT, format!("{} is not in the catalog", card.card))
                })?;
                card.adjust(data, stat, value);
            }
            ctx.add_game_action(
                CARD_BUFFED_DEBUFFED_ANIMATION,
                buffed_debuffed(player_id, idx, false, BUFF_SCALE_FACTOR),
            );
        }
        Ok(())
    }

    /// Put a random card from the caster's deck list where the token was.
    fn replace_token(ctx: &mut ActionContext<'_>, player_id: PlayerId) -> Result<(), ActionError> {
        let deck_list: Vec<CardId> = ctx.board.active().initial_deck.iter().copied().collect();
        let Some(&card) = ctx.rng.choose(&deck_list) else {
            return Ok(());
        };
        let data = ctx.card(CARD_EFFECT, card)?;

        let instance = ctx.board.spawn_instance(card);
        let board = &mut ctx.board.active_mut().board;
        board.push_back(instance);
        let board_index = board.len() - 1;

        if data.particle_effect.is_some() {
            ctx.chain(CARD_PLAYED_PARTICLE_EFFECT);
        }
        if data.is_spell() {
            ctx.add_game_action(
                CARD_HISTORY_ENTRY_ADDITION,
                history_entry(player_id, board_index, HistoryEntryType::Effect),
            );
            ctx.chain(CARD_EFFECT);
        }
        Ok(())
    }
}

impl GameAction for CardEffectAction {
    fn name(&self) -> &'static str {
        CARD_EFFECT
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, _params: &ActionParams) -> Result<(), ActionError> {
        let player_id = ctx.board.active_player_id();
        let Some(spell) = ctx.board.active().board.last().cloned() else {
            return Err(ActionError::inconsistent(CARD_EFFECT, "no spell on the board"));
        };
        let spell_index = ctx.board.active().board.len() - 1;
        let data = ctx.card(CARD_EFFECT, spell.card)?;
        let effect = CardEffect::parse(&data.effect)
            .map_err(|err| ActionError::inconsistent(CARD_EFFECT, format!("{}: {err}", data.name)))?;

        let vitals_before = (
            ctx.board.active().current_weight,
            ctx.board.active().armor,
            ctx.board.inactive().poison_stack,
        );

        if data.is_single_use {
            exile_copies(ctx, player_id, spell.card);
        }

        let mut board_targets = Indices::new();
        let mut held_targets = Indices::new();
        let (stat, token) = Self::resolve_components(ctx, &effect, spell_index, &mut held_targets);
        Self::collect_targets(ctx, &effect, data, spell_index, &mut board_targets, &mut held_targets);
        let reduced = Self::apply_side_effects(ctx, &effect, stat);
        Self::buff_targets(ctx, stat, effect.value, &board_targets, &held_targets, reduced)?;

        if effect.has(EffectComponent::Draw) {
            for _ in 0..effect.value.max(0) {
                ctx.chain(DRAW_CARD);
            }
        }

        let me = ctx.board.active_mut();
        if let Some(resolved) = me.board.pop_back() {
            if data.is_single_use {
                me.exile.push_back(resolved);
            } else {
                me.graveyard.push_back(resolved);
            }
        }

        if token {
            Self::replace_token(ctx, player_id)?;
        }

        let mut vitals = SmallVec::new();
        let enemy_id = player_id.opponent();
        let (weight, armor, poison) = vitals_before;
        let me = ctx.board.active();
        if me.current_weight != weight {
            vitals.push((player_id, VitalStat::Weight, me.current_weight));
        }
        if me.armor != armor {
            vitals.push((player_id, VitalStat::Armor, me.armor));
        }
        let enemy_poison = ctx.board.inactive().poison_stack;
        if enemy_poison != poison {
            vitals.push((enemy_id, VitalStat::Poison, enemy_poison));
        }
        self.resolved = Some(Resolved {
            player: player_id,
            spell_index,
            vitals,
        });
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        let Some(resolved) = &self.resolved else {
            return;
        };
        let timings = &anim.config.timings;
        let (dissolve_ms, stat_ms) = (timings.card_dissolve_ms, timings.stat_change_ms);

        let handle = anim.request(AnimationRequest::CardDissolve {
            player: resolved.player,
            card_indices: SmallVec::from_slice(&[resolved.spell_index]),
            is_board_card: true,
            duration_ms: dissolve_ms,
        });
        self.tracker.track(handle);
        for &(player, stat, value) in &resolved.vitals {
            let handle = anim.request(AnimationRequest::StatChange { player, stat, value, duration_ms: stat_ms });
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
