//! End-of-turn combat: attacks, card removal and rodent digs.

use smallvec::SmallVec;

use super::animation::{
    AnimationContext, AnimationRequest, AnimationStatus, AnimationTracker, HistoryEntryType, SceneHandle,
    VitalStat,
};
use super::context::ActionContext;
use super::cosmetic::history_entry;
use super::names::{
    CARD_ATTACK, CARD_DESTRUCTION, CARD_HISTORY_ENTRY_ADDITION, GAME_OVER_RESURRECTION_CHECK, RODENTS_DIG,
};
use super::params::{format_indices, ActionParams};
use super::game_over::GameOverResurrectionCheckAction;
use super::GameAction;
use crate::board::BoardModifierMask;
use crate::cards::CardFamily;
use crate::core::{ActionError, PlayerId};

// =============================================================================
// CardAttack
// =============================================================================

/// A board card of the player whose turn just ended hits the opponent.
#[derive(Debug, Default)]
pub struct CardAttackAction {
    attack: Option<Attack>,
    tracker: AnimationTracker,
}

#[derive(Clone, Copy, Debug)]
struct Attack {
    attacker: PlayerId,
    board_index: usize,
    damage: i32,
    healed: i32,
}

impl CardAttackAction {
    pub const CARD_INDEX_PARAM: &'static str = "card_index";
    pub const PLAYER_INDEX_PARAM: &'static str = "player_index";

    /// Parameters for an attack by `player`'s board card at `card_index`.
    #[must_use]
    pub fn params(player: PlayerId, card_index: usize) -> ActionParams {
        ActionParams::new()
            .with(Self::PLAYER_INDEX_PARAM, player.index())
            .with(Self::CARD_INDEX_PARAM, card_index)
    }
}

impl GameAction for CardAttackAction {
    fn name(&self) -> &'static str {
        CARD_ATTACK
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, params: &ActionParams) -> Result<(), ActionError> {
        let board_index: usize = params.parse(CARD_ATTACK, Self::CARD_INDEX_PARAM)?;
        let attacker_id = params.player(CARD_ATTACK, Self::PLAYER_INDEX_PARAM)?;
        let defender_id = attacker_id.opponent();

        let attacker = ctx.board.player(attacker_id);
        let card = attacker.board.get(board_index).cloned().ok_or_else(|| {
            ActionError::inconsistent(CARD_ATTACK, format!("{attacker_id} has no board card {board_index}"))
        })?;
        // Already attacked or removed by a trap in the meantime.
        if attacker.is_pending_destruction(card.id) {
            return Ok(());
        }
        let data = ctx.card(CARD_ATTACK, card.card)?;

        let damage = ctx.rules.effective_damage(data, &card, attacker);
        let lifesteal = attacker.has_modifier(BoardModifierMask::RODENT_LIFESTEAL);
        let dig_no_fail = attacker.has_modifier(BoardModifierMask::DIG_NO_FAIL);

        let defender = ctx.board.player_mut(defender_id);
        if data.family == CardFamily::Insects {
            defender.poison_stack += 1;
            if defender.has_modifier(BoardModifierMask::DOUBLE_POISON_ATTACKS) {
                defender.poison_stack += 1;
            }
        }
        defender.apply_damage(damage);
        let defender_dead = defender.health <= 0;

        let mut healed = 0;
        if damage > 0 && lifesteal {
            let attacker = ctx.board.player_mut(attacker_id);
            let before = attacker.health;
            attacker.heal(damage);
            healed = attacker.health - before;
        }
        self.attack = Some(Attack {
            attacker: attacker_id,
            board_index,
            damage,
            healed,
        });

        ctx.add_game_action(
            CARD_HISTORY_ENTRY_ADDITION,
            history_entry(attacker_id, board_index, HistoryEntryType::Battle),
        );
        if defender_dead {
            ctx.add_game_action(
                GAME_OVER_RESURRECTION_CHECK,
                GameOverResurrectionCheckAction::params(attacker_id),
            );
        }

        if data.family == CardFamily::Rodents {
            let dug = ctx.rng.gen_bool(ctx.config.rodents_respawn_chance);
            if dug || dig_no_fail {
                ctx.add_game_action(RODENTS_DIG, RodentsDigAction::params(attacker_id, board_index));
                return Ok(());
            }
        }

        ctx.add_game_action(
            CARD_DESTRUCTION,
            CardDestructionAction::params(attacker_id, &[board_index], true, false),
        );
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        let Some(attack) = self.attack else {
            return;
        };
        let duration_ms = anim.config.timings.card_attack_ms;
        let handle = anim.request(AnimationRequest::CardAttack {
            player: attack.attacker,
            board_index: attack.board_index,
            damage: attack.damage,
            duration_ms,
        });
        self.tracker.track(handle);

        if attack.healed > 0 {
            let duration_ms = anim.config.timings.stat_change_ms;
            let handle = anim.request(AnimationRequest::StatChange {
                player: attack.attacker,
                stat: VitalStat::Health,
                value: anim.board.player(attack.attacker).health,
                duration_ms,
            });
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
        &[Self::CARD_INDEX_PARAM, Self::PLAYER_INDEX_PARAM]
    }
}

// =============================================================================
// CardDestruction
// =============================================================================

/// Removes cards from a board or hand.
///
/// - board cards after an attack are only marked, and leave at end of turn
/// - a trap kill sends the newest board card to the graveyard at once
/// - hand cards go to the graveyard at once, unless they are copies of a
///   single-use spell that were already exiled
#[derive(Debug, Default)]
pub struct CardDestructionAction {
    dissolve: Option<(PlayerId, SmallVec<[usize; 4]>, bool)>,
    tracker: AnimationTracker,
}

impl CardDestructionAction {
    pub const CARD_INDICES_PARAM: &'static str = "card_indices";
    pub const PLAYER_INDEX_PARAM: &'static str = "player_index";
    pub const IS_BOARD_CARD_PARAM: &'static str = "is_board_card";
    pub const IS_TRAP_TRIGGER_PARAM: &'static str = "is_trap_trigger";
    /// Optional. Marks a dissolve of already exiled single-use copies.
    pub const IS_SINGLE_USE_COPY_PARAM: &'static str = "is_single_use_copy";

    /// Parameters for a destruction of `indices` in one of `player`'s zones.
    #[must_use]
    pub fn params(player: PlayerId, indices: &[usize], is_board_card: bool, is_trap_trigger: bool) -> ActionParams {
        ActionParams::new()
            .with(Self::CARD_INDICES_PARAM, format_indices(indices))
            .with(Self::PLAYER_INDEX_PARAM, player.index())
            .with(Self::IS_BOARD_CARD_PARAM, is_board_card)
            .with(Self::IS_TRAP_TRIGGER_PARAM, is_trap_trigger)
    }
}

impl GameAction for CardDestructionAction {
    fn name(&self) -> &'static str {
        CARD_DESTRUCTION
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, params: &ActionParams) -> Result<(), ActionError> {
        let mut indices = params.indices(CARD_DESTRUCTION, Self::CARD_INDICES_PARAM)?;
        let player_id = params.player(CARD_DESTRUCTION, Self::PLAYER_INDEX_PARAM)?;
        let is_board_card: bool = params.parse(CARD_DESTRUCTION, Self::IS_BOARD_CARD_PARAM)?;
        let is_trap_trigger: bool = params.parse(CARD_DESTRUCTION, Self::IS_TRAP_TRIGGER_PARAM)?;
        let single_use_copy = params.parse_or(CARD_DESTRUCTION, Self::IS_SINGLE_USE_COPY_PARAM, false)?;
        self.dissolve = Some((player_id, indices.clone(), is_board_card));

        let player = ctx.board.player_mut(player_id);
        let out_of_range = |len: usize, idx: usize| {
            ActionError::inconsistent(CARD_DESTRUCTION, format!("card index {idx} out of range for {len} cards"))
        };

        match (is_board_card, is_trap_trigger) {
            (true, false) => {
                for &idx in &indices {
                    let id = player
                        .board
                        .get(idx)
                        .map(|c| c.id)
                        .ok_or_else(|| out_of_range(player.board.len(), idx))?;
                    player.pending_destruction.insert(id);
                }
            }
            (true, true) => {
                let card = player
                    .board
                    .pop_back()
                    .ok_or_else(|| ActionError::inconsistent(CARD_DESTRUCTION, "trap fired on an empty board"))?;
                player.pending_destruction.remove(&card.id);
                player.graveyard.push_back(card);
            }
            (false, _) if single_use_copy => {}
            (false, _) => {
                indices.sort_unstable();
                indices.dedup();
                if let Some(&idx) = indices.iter().find(|&&idx| idx >= player.hand.len()) {
                    return Err(out_of_range(player.hand.len(), idx));
                }
                for &idx in indices.iter().rev() {
                    let card = player.hand.remove(idx);
                    player.graveyard.push_back(card);
                }
            }
        }
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        let Some((player, card_indices, is_board_card)) = self.dissolve.clone() else {
            return;
        };
        if card_indices.is_empty() {
            return;
        }
        let duration_ms = anim.config.timings.card_dissolve_ms;
        let handle = anim.request(AnimationRequest::CardDissolve {
            player,
            card_indices,
            is_board_card,
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
        true
    }

    fn required_extra_param_names(&self) -> &'static [&'static str] {
        &[
            Self::CARD_INDICES_PARAM,
            Self::PLAYER_INDEX_PARAM,
            Self::IS_BOARD_CARD_PARAM,
            Self::IS_TRAP_TRIGGER_PARAM,
        ]
    }
}

// =============================================================================
// RodentsDig
// =============================================================================

/// A rodent burrows back instead of being destroyed. Presentation only.
#[derive(Debug, Default)]
pub struct RodentsDigAction {
    burrow: Option<(PlayerId, usize)>,
    tracker: AnimationTracker,
}

impl RodentsDigAction {
    pub const CARD_INDEX_PARAM: &'static str = "card_index";
    pub const PLAYER_INDEX_PARAM: &'static str = "player_index";

    #[must_use]
    pub fn params(player: PlayerId, card_index: usize) -> ActionParams {
        ActionParams::new()
            .with(Self::CARD_INDEX_PARAM, card_index)
            .with(Self::PLAYER_INDEX_PARAM, player.index())
    }
}

impl GameAction for RodentsDigAction {
    fn name(&self) -> &'static str {
        RODENTS_DIG
    }

    fn set_new_game_state(&mut self, _ctx: &mut ActionContext<'_>, params: &ActionParams) -> Result<(), ActionError> {
        let card_index = params.parse(RODENTS_DIG, Self::CARD_INDEX_PARAM)?;
        let player = params.player(RODENTS_DIG, Self::PLAYER_INDEX_PARAM)?;
        self.burrow = Some((player, card_index));
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        if let Some((player, board_index)) = self.burrow {
            let duration_ms = anim.config.timings.card_play_ms;
            let handle = anim.request(AnimationRequest::CardBurrow { player, board_index, duration_ms });
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
        &[Self::CARD_INDEX_PARAM, Self::PLAYER_INDEX_PARAM]
    }
}
