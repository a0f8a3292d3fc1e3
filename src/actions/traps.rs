//! Armed traps firing on the card just played.

use super::animation::{AnimationContext, AnimationRequest, AnimationStatus, AnimationTracker, SceneHandle};
use super::combat::CardDestructionAction;
use super::context::ActionContext;
use super::cosmetic::{buffed_debuffed, DEBUFF_SCALE_FACTOR};
use super::names::{CARD_BUFFED_DEBUFFED_ANIMATION, CARD_DESTRUCTION, SPELL_KILL, TRAP_TRIGGERED};
use super::params::ActionParams;
use super::GameAction;
use crate::core::{ActionError, PlayerId};

/// Index of the newest card on the active board.
fn last_board_index(ctx: &ActionContext<'_>, action: &str) -> Result<(PlayerId, usize), ActionError> {
    let player = ctx.board.active_player_id();
    let len = ctx.board.player(player).board.len();
    if len == 0 {
        return Err(ActionError::inconsistent(action, "trap fired on an empty board"));
    }
    Ok((player, len - 1))
}

fn trap_banner(anim: &mut AnimationContext<'_>, tracker: &mut AnimationTracker, text: &str) {
    let duration_ms = anim.config.timings.banner_ms;
    let handle = anim.request(AnimationRequest::Banner {
        text: text.to_string(),
        duration_ms,
    });
    tracker.track(handle);
}

// =============================================================================
// TrapTriggered
// =============================================================================

/// What an armed trap does to the card that sprang it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrapKind {
    /// Destroy the card.
    Kill,
    /// The card is weakened by a board-side debuff.
    Debuff,
}

impl std::str::FromStr for TrapKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kill" => Ok(Self::Kill),
            "debuff" => Ok(Self::Debuff),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for TrapKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Kill => "kill",
            Self::Debuff => "debuff",
        })
    }
}

/// A trap on the active side fires at the newest board card.
#[derive(Debug, Default)]
pub struct TrapTriggeredAction {
    kind: Option<TrapKind>,
    tracker: AnimationTracker,
}

impl TrapTriggeredAction {
    pub const TRAP_TYPE_PARAM: &'static str = "trap_type";

    #[must_use]
    pub fn params(kind: TrapKind) -> ActionParams {
        ActionParams::new().with(Self::TRAP_TYPE_PARAM, kind)
    }

    #[must_use]
    pub fn kill() -> ActionParams {
        Self::params(TrapKind::Kill)
    }

    #[must_use]
    pub fn debuff() -> ActionParams {
        Self::params(TrapKind::Debuff)
    }
}

impl GameAction for TrapTriggeredAction {
    fn name(&self) -> &'static str {
        TRAP_TRIGGERED
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, params: &ActionParams) -> Result<(), ActionError> {
        let kind: TrapKind = params.parse(TRAP_TRIGGERED, Self::TRAP_TYPE_PARAM)?;
        let (player, index) = last_board_index(ctx, TRAP_TRIGGERED)?;
        self.kind = Some(kind);

        match kind {
            TrapKind::Kill => ctx.add_game_action(
                CARD_DESTRUCTION,
                CardDestructionAction::params(player, &[index], true, true),
            ),
            TrapKind::Debuff => ctx.add_game_action(
                CARD_BUFFED_DEBUFFED_ANIMATION,
                buffed_debuffed(player, index, true, DEBUFF_SCALE_FACTOR),
            ),
        }
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        if self.kind == Some(TrapKind::Kill) {
            trap_banner(anim, &mut self.tracker, "Trap!");
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
        &[Self::TRAP_TYPE_PARAM]
    }
}

// =============================================================================
// SpellKill
// =============================================================================

/// The spell-kill trap destroys the spell just played before it resolves.
#[derive(Debug, Default)]
pub struct SpellKillAction {
    fired: bool,
    tracker: AnimationTracker,
}

impl GameAction for SpellKillAction {
    fn name(&self) -> &'static str {
        SPELL_KILL
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, _params: &ActionParams) -> Result<(), ActionError> {
        let (player, index) = last_board_index(ctx, SPELL_KILL)?;
        ctx.add_game_action(
            CARD_DESTRUCTION,
            CardDestructionAction::params(player, &[index], true, true),
        );
        self.fired = true;
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        if self.fired {
            trap_banner(anim, &mut self.tracker, "Spell Ward!");
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{chained_names, Fixture};
    use crate::cards::CardId;

    #[test]
    fn test_kill_trap_chains_trap_destruction() {
        let mut fx = Fixture::new();
        fx.put_on_board(PlayerId::TOP, CardId::new(1));
        fx.put_on_board(PlayerId::TOP, CardId::new(20));

        let chained = fx.apply(&mut TrapTriggeredAction::default(), TrapTriggeredAction::kill()).unwrap();

        assert_eq!(chained_names(&chained), vec![CARD_DESTRUCTION]);
        let params = &chained[0].params;
        assert_eq!(params.get("card_indices"), Some("[1]"));
        assert_eq!(params.get("player_index"), Some("0"));
        assert_eq!(params.get("is_trap_trigger"), Some("true"));
    }

    #[test]
    fn test_debuff_trap_is_cosmetic() {
        let mut fx = Fixture::new();
        fx.put_on_board(PlayerId::TOP, CardId::new(1));
        let before = fx.board.clone();

        let chained = fx.apply(&mut TrapTriggeredAction::default(), TrapTriggeredAction::debuff()).unwrap();

        assert_eq!(chained_names(&chained), vec![CARD_BUFFED_DEBUFFED_ANIMATION]);
        assert_eq!(fx.board, before);
    }

    #[test]
    fn test_unknown_trap_type() {
        let mut fx = Fixture::new();
        fx.put_on_board(PlayerId::TOP, CardId::new(1));
        let params = ActionParams::new().with(TrapTriggeredAction::TRAP_TYPE_PARAM, "bear");

        let err = fx.apply(&mut TrapTriggeredAction::default(), params).unwrap_err();
        assert!(matches!(err, ActionError::InvalidParam { .. }));
    }

    #[test]
    fn test_trap_on_empty_board_is_inconsistent() {
        let mut fx = Fixture::new();
        let err = fx.apply(&mut SpellKillAction::default(), ActionParams::new()).unwrap_err();
        assert!(matches!(err, ActionError::InconsistentBoard { .. }));
    }

    #[test]
    fn test_spell_kill() {
        let mut fx = Fixture::new();
        fx.put_on_board(PlayerId::TOP, CardId::new(40));

        let chained = fx.apply(&mut SpellKillAction::default(), ActionParams::new()).unwrap();

        assert_eq!(chained_names(&chained), vec![CARD_DESTRUCTION]);
        assert_eq!(chained[0].params.get("card_indices"), Some("[0]"));
    }
}
