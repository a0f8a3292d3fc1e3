use log::info;

use super::animation::{AnimationContext, AnimationRequest, AnimationStatus, AnimationTracker, SceneHandle, VitalStat};
use super::context::ActionContext;
use super::names::{GAME_OVER, GAME_OVER_RESURRECTION_CHECK};
use super::params::ActionParams;
use super::GameAction;
use crate::core::{ActionError, PlayerId};

/// Parameter naming the winning player.
const VICTORIOUS_PLAYER_INDEX_PARAM: &str = "victorious_player_index";

/// A player hit zero health. The loser may still cheat death.
///
/// If the loser holds an active resurrection it is consumed and they come
/// back at half their maximum health. Otherwise the battle ends.
#[derive(Debug, Default)]
pub struct GameOverResurrectionCheckAction {
    resurrected: Option<PlayerId>,
    tracker: AnimationTracker,
}

impl GameOverResurrectionCheckAction {
    pub const VICTORIOUS_PLAYER_INDEX_PARAM: &'static str = VICTORIOUS_PLAYER_INDEX_PARAM;

    #[must_use]
    pub fn params(victor: PlayerId) -> ActionParams {
        ActionParams::new().with(VICTORIOUS_PLAYER_INDEX_PARAM, victor.index())
    }
}

impl GameAction for GameOverResurrectionCheckAction {
    fn name(&self) -> &'static str {
        GAME_OVER_RESURRECTION_CHECK
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, params: &ActionParams) -> Result<(), ActionError> {
        let victor = params.player(GAME_OVER_RESURRECTION_CHECK, VICTORIOUS_PLAYER_INDEX_PARAM)?;
        let loser_id = victor.opponent();
        let loser = ctx.board.player_mut(loser_id);

        if loser.has_resurrection_active {
            loser.has_resurrection_active = false;
            loser.health = loser.max_health / 2;
            self.resurrected = Some(loser_id);
            return Ok(());
        }

        ctx.add_game_action(GAME_OVER, GameOverAction::params(victor));
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        if let Some(player) = self.resurrected {
            let duration_ms = anim.config.timings.stat_change_ms;
            let handle = anim.request(AnimationRequest::StatChange {
                player,
                stat: VitalStat::Health,
                value: anim.board.player(player).health,
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
        &[VICTORIOUS_PLAYER_INDEX_PARAM]
    }
}

/// Declares the winner. The first declaration of a battle sticks.
#[derive(Debug, Default)]
pub struct GameOverAction {
    victor: Option<PlayerId>,
    tracker: AnimationTracker,
}

impl GameOverAction {
    pub const VICTORIOUS_PLAYER_INDEX_PARAM: &'static str = VICTORIOUS_PLAYER_INDEX_PARAM;

    #[must_use]
    pub fn params(victor: PlayerId) -> ActionParams {
        ActionParams::new().with(VICTORIOUS_PLAYER_INDEX_PARAM, victor.index())
    }
}

impl GameAction for GameOverAction {
    fn name(&self) -> &'static str {
        GAME_OVER
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, params: &ActionParams) -> Result<(), ActionError> {
        let victor = params.player(GAME_OVER, VICTORIOUS_PLAYER_INDEX_PARAM)?;
        if ctx.board.declare_winner(victor) {
            info!("{victor} won after {} turns", ctx.board.turn_counter());
        }
        self.victor = ctx.board.winner();
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        if let Some(victor) = self.victor {
            let duration_ms = anim.config.timings.banner_ms;
            let handle = anim.request(AnimationRequest::Banner {
                text: format!("{victor} wins"),
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
        &[VICTORIOUS_PLAYER_INDEX_PARAM]
    }

    fn is_checkpoint(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{chained_names, Fixture};

    #[test]
    fn test_no_resurrection_ends_battle() {
        let mut fx = Fixture::new();
        fx.board.player_mut(PlayerId::TOP).health = 0;

        let chained = fx
            .apply(
                &mut GameOverResurrectionCheckAction::default(),
                GameOverResurrectionCheckAction::params(PlayerId::BOT),
            )
            .unwrap();

        assert_eq!(chained_names(&chained), vec![GAME_OVER]);
        assert_eq!(chained[0].params.get("victorious_player_index"), Some("1"));
    }

    /// Test that an active resurrection restores half health and is consumed.
    #[test]
    fn test_resurrection() {
        let mut fx = Fixture::new();
        let top = fx.board.player_mut(PlayerId::TOP);
        top.health = 0;
        top.has_resurrection_active = true;
        let max = top.max_health;

        let chained = fx
            .apply(
                &mut GameOverResurrectionCheckAction::default(),
                GameOverResurrectionCheckAction::params(PlayerId::BOT),
            )
            .unwrap();

        assert!(chained.is_empty());
        let top = fx.board.player(PlayerId::TOP);
        assert_eq!(top.health, max / 2);
        assert!(!top.has_resurrection_active);
        assert!(!fx.board.is_over());
    }

    #[test]
    fn test_first_winner_sticks() {
        let mut fx = Fixture::new();

        fx.apply(&mut GameOverAction::default(), GameOverAction::params(PlayerId::BOT))
            .unwrap();
        fx.apply(&mut GameOverAction::default(), GameOverAction::params(PlayerId::TOP))
            .unwrap();

        assert_eq!(fx.board.winner(), Some(PlayerId::BOT));
    }

    #[test]
    fn test_game_over_is_checkpoint() {
        assert!(GameOverAction::default().is_checkpoint());
        assert!(!GameOverResurrectionCheckAction::default().is_checkpoint());
    }
}
