//! Action engine integration tests.
//!
//! These tests drive the engine through its public API only: queueing,
//! interjection, the two action phases and content-error handling.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use battle_engine::actions::names::{
    BATTLE_INITIAL_SETUP_AND_ANIMATION, CARD_ATTACK, CARD_BUFFED_DEBUFFED_ANIMATION, CARD_HISTORY_ENTRY_ADDITION,
    CARD_PLAYED_PARTICLE_EFFECT, DRAW_CARD, IDLE, NEXT_PLAYER,
};
use battle_engine::actions::{
    ActionContext, ActionFactory, ActionParams, ActionPhase, AnimationContext, AnimationRequest, AnimationStatus,
    AnimationTracker, BattleInitialSetupAndAnimationAction, BattleSubscene, CardAttackAction, GameAction, SceneHandle,
};
use battle_engine::battle_log::LogTarget;
use battle_engine::board::{BattleSetup, BoardState};
use battle_engine::cards::{CardCatalog, CardId};
use battle_engine::core::{ActionError, BattleConfig, EngineError, PlayerId};
use battle_engine::engine::{ActionEngine, ExternalPresenter};

// =============================================================================
// Helpers
// =============================================================================

const FORTIFY: &str = "Fortify";
const PARENT: &str = "Parent";
const CHILD_A: &str = "ChildA";
const CHILD_B: &str = "ChildB";
const COUNTED: &str = "Counted";

/// Adds armor to the active player and waits on one banner.
#[derive(Default)]
struct FortifyAction {
    tracker: AnimationTracker,
}

impl GameAction for FortifyAction {
    fn name(&self) -> &'static str {
        FORTIFY
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, _params: &ActionParams) -> Result<(), ActionError> {
        ctx.board.active_mut().armor += 4;
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        let handle = anim.request(AnimationRequest::Banner {
            text: "Fortified".to_string(),
            duration_ms: 100.0,
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
}

/// Does nothing but chain two children.
struct ParentAction;

impl GameAction for ParentAction {
    fn name(&self) -> &'static str {
        PARENT
    }

    fn set_new_game_state(&mut self, ctx: &mut ActionContext<'_>, _params: &ActionParams) -> Result<(), ActionError> {
        ctx.chain(CHILD_A);
        ctx.chain(CHILD_B);
        Ok(())
    }

    fn should_be_serialized(&self) -> bool {
        true
    }
}

struct ChildAction(&'static str);

impl GameAction for ChildAction {
    fn name(&self) -> &'static str {
        self.0
    }

    fn set_new_game_state(&mut self, _ctx: &mut ActionContext<'_>, _params: &ActionParams) -> Result<(), ActionError> {
        Ok(())
    }

    fn should_be_serialized(&self) -> bool {
        false
    }
}

/// Counts how often its presentation is started.
struct CountedAction(Arc<AtomicUsize>);

impl GameAction for CountedAction {
    fn name(&self) -> &'static str {
        COUNTED
    }

    fn set_new_game_state(&mut self, _ctx: &mut ActionContext<'_>, _params: &ActionParams) -> Result<(), ActionError> {
        Ok(())
    }

    fn init_animation(&mut self, anim: &mut AnimationContext<'_>) {
        self.0.fetch_add(1, Ordering::SeqCst);
        anim.request(AnimationRequest::Banner {
            text: "Counted".to_string(),
            duration_ms: 100.0,
        });
    }

    fn should_be_serialized(&self) -> bool {
        false
    }
}

fn custom_factory() -> Arc<ActionFactory> {
    let mut factory = ActionFactory::standard();
    factory.register(FORTIFY, || Box::new(FortifyAction::default()));
    factory.register(PARENT, || Box::new(ParentAction));
    factory.register(CHILD_A, || Box::new(ChildAction(CHILD_A)));
    factory.register(CHILD_B, || Box::new(ChildAction(CHILD_B)));
    Arc::new(factory)
}

fn setup() -> BattleSetup {
    BattleSetup::new(21, vec![CardId::new(20); 6], vec![CardId::new(30); 6])
}

/// Board with the first turn started and a Raptor on the top board.
fn started_board(config: &BattleConfig) -> BoardState {
    let mut board = BoardState::from_setup(&setup(), config);
    board.advance_turn();
    let raptor = board.spawn_instance(CardId::new(20));
    board.player_mut(PlayerId::TOP).board.push_back(raptor);
    board
}

/// Engine with the custom actions, starting from [`started_board`].
fn prepared(config: BattleConfig) -> ActionEngine {
    let setup = setup().with_start_board(started_board(&config));
    ActionEngine::new(&setup, Arc::new(CardCatalog::standard()), config).with_factory(custom_factory())
}

fn headless() -> ActionEngine {
    prepared(BattleConfig::headless())
}

// =============================================================================
// Queueing
// =============================================================================

/// Test that a missing required parameter is refused at enqueue time.
#[test]
fn test_missing_param_leaves_queue_unchanged() {
    let mut engine = headless();
    engine.add_game_action(DRAW_CARD, ActionParams::new()).unwrap();
    let digest = engine.board().digest().unwrap();

    let params = ActionParams::new().with(CardAttackAction::CARD_INDEX_PARAM, 0);
    let err = engine.add_game_action(CARD_ATTACK, params).unwrap_err();

    assert!(matches!(
        err,
        EngineError::Content(ActionError::MissingParam { ref param, .. }) if param == "player_index"
    ));
    assert_eq!(engine.queued_len(), 1);
    assert_eq!(engine.queued_action_names().collect::<Vec<_>>(), vec![DRAW_CARD]);
    assert_eq!(engine.board().digest().unwrap(), digest);
    assert!(!engine.is_aborted());
}

/// Test that an unregistered name is refused at enqueue time.
#[test]
fn test_unknown_action_rejected() {
    let mut engine = headless();

    let err = engine.add_game_action("Fireball", ActionParams::new()).unwrap_err();

    assert!(matches!(err, EngineError::Content(ActionError::UnknownAction(ref name)) if name == "Fireball"));
    assert!(engine.is_idle());
}

/// Test that chained actions run before anything queued after their parent.
#[test]
fn test_chained_actions_interject_in_order() {
    let mut engine = headless();
    engine.add_game_action(PARENT, ActionParams::new()).unwrap();
    engine.add_game_action(DRAW_CARD, ActionParams::new()).unwrap();

    engine.update(0.0).unwrap();

    let names: Vec<_> = engine.queued_action_names().collect();
    assert_eq!(names, vec![CHILD_A, CHILD_B, DRAW_CARD]);
}

/// Test that a chain requested at turn start lands ahead of external actions.
#[test]
fn test_next_player_chain_precedes_external_actions() {
    let config = BattleConfig::headless();
    let mut engine = ActionEngine::new(&setup(), Arc::new(CardCatalog::standard()), config);
    engine.add_game_action(NEXT_PLAYER, ActionParams::new()).unwrap();
    engine.add_game_action(DRAW_CARD, ActionParams::new()).unwrap();

    engine.update(0.0).unwrap();

    let names: Vec<_> = engine.queued_action_names().collect();
    assert_eq!(names.first(), Some(&CARD_HISTORY_ENTRY_ADDITION));
    assert_eq!(names.last(), Some(&DRAW_CARD));
    assert!(names.len() > 2);
}

// =============================================================================
// Phases
// =============================================================================

/// Test that queued actions stay `Created` until they activate.
#[test]
fn test_queued_actions_are_created() {
    let mut engine = headless();
    engine.add_game_action(PARENT, ActionParams::new()).unwrap();
    engine.add_game_action(DRAW_CARD, ActionParams::new()).unwrap();
    assert!(engine.queued_phases().all(|phase| phase == ActionPhase::Created));

    engine.update(0.0).unwrap();

    assert_eq!(engine.queued_len(), 3);
    assert!(engine.queued_phases().all(|phase| phase == ActionPhase::Created));
}

/// Test that the board is mutated while the action is `StateApplied`,
/// before its presentation starts or completes.
#[test]
fn test_state_applied_before_animation_completes() {
    let (presenter, requests) = ExternalPresenter::channel();
    let mut engine = prepared(BattleConfig::default()).with_presenter(presenter);
    let armor = engine.board().active().armor;

    engine.add_game_action(FORTIFY, ActionParams::new()).unwrap();
    engine.update(16.0).unwrap();

    assert_eq!(engine.active_action_name(), Some(FORTIFY));
    assert_eq!(engine.active_phase(), Some(ActionPhase::StateApplied));
    assert_eq!(engine.board().active().armor, armor + 4);
    assert_eq!(engine.outstanding_animations(), 0);
    assert!(requests.try_recv().is_err());

    engine.update(16.0).unwrap();
    assert_eq!(engine.active_phase(), Some(ActionPhase::Animating));
    assert_eq!(engine.board().active().armor, armor + 4);
    let (handle, request) = requests.try_recv().unwrap();
    assert!(matches!(request, AnimationRequest::Banner { .. }));

    engine.post_animation_completed(handle);
    engine.update(16.0).unwrap();
    assert!(engine.is_idle());
    assert_eq!(engine.stats().actions_finished, 1);
    assert_eq!(engine.board().active().armor, armor + 4);
}

/// Test that queued actions wait while the active one is animating.
#[test]
fn test_single_active_action() {
    let (presenter, requests) = ExternalPresenter::channel();
    let mut engine = prepared(BattleConfig::default()).with_presenter(presenter);

    for _ in 0..3 {
        engine.add_game_action(FORTIFY, ActionParams::new()).unwrap();
    }

    engine.update(16.0).unwrap();
    engine.update(16.0).unwrap();
    let (first, _) = requests.try_recv().unwrap();
    for _ in 0..10 {
        engine.update(16.0).unwrap();
        assert_eq!(engine.queued_len(), 2);
        assert_eq!(engine.outstanding_animations(), 1);
    }
    assert!(requests.try_recv().is_err());

    engine.post_animation_completed(first);
    engine.update(16.0).unwrap();
    assert!(engine.active_action_name().is_none());
    assert_eq!(engine.queued_len(), 2);

    engine.update(16.0).unwrap();
    assert_eq!(engine.active_action_name(), Some(FORTIFY));
    assert_eq!(engine.active_phase(), Some(ActionPhase::StateApplied));
    assert_eq!(engine.queued_len(), 1);

    engine.update(16.0).unwrap();
    assert!(requests.try_recv().is_ok());
}

/// Test that headless ticks start each presentation once and drop its requests.
#[test]
fn test_headless_runs_init_animation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let mut factory = ActionFactory::standard();
    factory.register(COUNTED, move || Box::new(CountedAction(counter.clone())));
    let setup = setup().with_start_board(started_board(&BattleConfig::headless()));
    let mut engine = ActionEngine::new(&setup, Arc::new(CardCatalog::standard()), BattleConfig::headless())
        .with_factory(Arc::new(factory));

    engine.add_game_action(COUNTED, ActionParams::new()).unwrap();
    engine.add_game_action(COUNTED, ActionParams::new()).unwrap();

    engine.update(0.0).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(engine.active_action_name().is_none());

    engine.update(0.0).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(engine.is_idle());
    assert_eq!(engine.outstanding_animations(), 0);
    assert_eq!(engine.stats().animation_updates, 0);
}

/// Test that cosmetic actions never touch the board.
#[test]
fn test_cosmetic_actions_leave_board_unchanged() {
    let mut engine = headless();
    let digest = engine.board().digest().unwrap();

    engine
        .add_game_action(
            CARD_BUFFED_DEBUFFED_ANIMATION,
            ActionParams::new()
                .with("card_index", 0)
                .with("player_index", 0)
                .with("is_board_card", true)
                .with("scale_factor", 1.5),
        )
        .unwrap();
    engine
        .add_game_action(
            CARD_HISTORY_ENTRY_ADDITION,
            ActionParams::new()
                .with("player_index", 0)
                .with("card_index", 0)
                .with("entry_type", "battle")
                .with("is_turn_counter", false),
        )
        .unwrap();
    engine.add_game_action(CARD_PLAYED_PARTICLE_EFFECT, ActionParams::new()).unwrap();
    engine.add_game_action(IDLE, ActionParams::new()).unwrap();
    engine
        .add_game_action(
            BATTLE_INITIAL_SETUP_AND_ANIMATION,
            BattleInitialSetupAndAnimationAction::params(BattleSubscene::Battle),
        )
        .unwrap();
    engine.run_until_idle().unwrap();

    assert_eq!(engine.stats().actions_activated, 5);
    assert_eq!(engine.board().digest().unwrap(), digest);
}

/// Test that the battle-start presentation waits on the board entrance and
/// stays out of the log.
#[test]
fn test_battle_start_presentation() {
    let (presenter, requests) = ExternalPresenter::channel();
    let mut engine = prepared(BattleConfig::default())
        .with_presenter(presenter)
        .with_log("opening", LogTarget::Memory);
    let digest = engine.board().digest().unwrap();

    engine
        .add_game_action(
            BATTLE_INITIAL_SETUP_AND_ANIMATION,
            BattleInitialSetupAndAnimationAction::params(BattleSubscene::Battle),
        )
        .unwrap();
    engine.add_game_action(IDLE, ActionParams::new()).unwrap();
    engine.update(16.0).unwrap();
    engine.update(16.0).unwrap();

    let (handle, request) = requests.try_recv().unwrap();
    assert!(matches!(
        request,
        AnimationRequest::BoardEntrance { subscene: BattleSubscene::Battle, .. }
    ));
    for _ in 0..3 {
        engine.update(16.0).unwrap();
        assert_eq!(engine.active_action_name(), Some(BATTLE_INITIAL_SETUP_AND_ANIMATION));
    }

    engine.post_animation_completed(handle);
    engine.update(16.0).unwrap();
    engine.update(16.0).unwrap();
    assert_eq!(engine.active_action_name(), Some(IDLE));
    engine.update(16.0).unwrap();
    assert!(engine.is_idle());

    assert_eq!(engine.board().digest().unwrap(), digest);
    assert_eq!(engine.take_serializer().unwrap().actions_recorded(), 0);
}

// =============================================================================
// Errors
// =============================================================================

/// Test that an inconsistent board aborts the battle for good.
#[test]
fn test_content_error_aborts_battle() {
    let mut engine = headless();
    engine
        .add_game_action(CARD_ATTACK, CardAttackAction::params(PlayerId::BOT, 4))
        .unwrap();
    engine.add_game_action(DRAW_CARD, ActionParams::new()).unwrap();

    let err = engine.update(0.0).unwrap_err();
    assert!(matches!(err, EngineError::Content(ActionError::InconsistentBoard { .. })));
    assert!(engine.is_aborted());
    assert!(engine.is_idle());

    assert!(matches!(engine.update(0.0), Err(EngineError::Aborted(_))));
    assert!(matches!(
        engine.add_game_action(DRAW_CARD, ActionParams::new()),
        Err(EngineError::Aborted(_))
    ));
}

/// Test that an illegal play never reaches the queue.
#[test]
fn test_illegal_play_refused() {
    let mut engine = headless();

    let err = engine.try_play_card(3).unwrap_err();

    assert!(matches!(err, EngineError::IllegalMove(_)));
    assert!(engine.is_idle());
}
