//! The action queue driver.

use std::collections::VecDeque;
use std::sync::Arc;

use log::{debug, error, warn};
use rustc_hash::FxHashSet;

use super::presenter::{InstantPresenter, Presenter};
use crate::actions::names::PLAY_CARD;
use crate::actions::{
    validate_params, ActionContext, ActionDescriptor, ActionFactory, ActionParams, ActionPhase, AnimationContext,
    AnimationRequest, AnimationStatus, GameAction, PlayCardAction, SceneHandle,
};
use crate::battle_log::{BattleSerializer, LogTarget};
use crate::board::{BattleSetup, BoardState};
use crate::cards::CardCatalog;
use crate::core::{ActionError, BattleConfig, EngineError, EngineMode, GameRng, LogError, PlayerId};
use crate::rules::RuleEngine;

/// Who put an action on the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionOrigin {
    /// A player, the action generator or a replay. Logged.
    External,
    /// Requested by another action's logical phase. Re-derived on replay.
    Chained,
}

/// Counters for one engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub ticks: u64,
    pub actions_activated: u64,
    pub animation_updates: u64,
    /// Actions that reached `Finished`.
    pub actions_finished: u64,
    /// Queued actions dropped because the battle ended.
    pub actions_discarded: u64,
}

struct QueuedAction {
    action: Box<dyn GameAction>,
    descriptor: ActionDescriptor,
    origin: ActionOrigin,
    phase: ActionPhase,
}

struct ActiveAction {
    action: Box<dyn GameAction>,
    phase: ActionPhase,
}

/// Owns a battle and drives its actions one at a time.
///
/// Each [`update`](Self::update) is one cooperative tick. At most one action
/// is active; its logical phase runs when it activates and, in animated
/// mode, its presentation phase runs over the following ticks.
pub struct ActionEngine {
    setup: BattleSetup,
    board: BoardState,
    rng: GameRng,
    catalog: Arc<CardCatalog>,
    rules: RuleEngine,
    config: BattleConfig,
    factory: Arc<ActionFactory>,
    presenter: Box<dyn Presenter>,
    serializer: Option<BattleSerializer>,

    queue: VecDeque<QueuedAction>,
    active: Option<ActiveAction>,

    completed: Vec<SceneHandle>,
    requests: Vec<(SceneHandle, AnimationRequest)>,
    outstanding: FxHashSet<SceneHandle>,
    next_handle: u32,

    aborted: Option<String>,
    stats: EngineStats,
}

impl ActionEngine {
    /// Engine for a fresh battle with the standard actions and an
    /// [`InstantPresenter`].
    pub fn new(setup: &BattleSetup, catalog: Arc<CardCatalog>, config: BattleConfig) -> Self {
        Self {
            setup: setup.clone(),
            board: BoardState::from_setup(setup, &config),
            rng: GameRng::new(setup.seed),
            rules: RuleEngine::new(catalog.clone(), &config),
            catalog,
            config,
            factory: Arc::new(ActionFactory::standard()),
            presenter: Box::new(InstantPresenter::new()),
            serializer: None,
            queue: VecDeque::new(),
            active: None,
            completed: Vec::new(),
            requests: Vec::new(),
            outstanding: FxHashSet::default(),
            next_handle: 1,
            aborted: None,
            stats: EngineStats::default(),
        }
    }

    /// Use a different action registry.
    #[must_use]
    pub fn with_factory(mut self, factory: Arc<ActionFactory>) -> Self {
        self.factory = factory;
        self
    }

    #[must_use]
    pub fn with_presenter(mut self, presenter: impl Presenter + 'static) -> Self {
        self.presenter = Box::new(presenter);
        self
    }

    /// Record externally enqueued actions to a battle log.
    ///
    /// The log header is this engine's own setup, so a replay always starts
    /// from the battle that was played.
    #[must_use]
    pub fn with_log(mut self, battle_id: impl Into<String>, target: LogTarget) -> Self {
        self.serializer = Some(BattleSerializer::new(battle_id, &self.setup, target));
        self
    }

    // === Control ===

    /// Queue an action by name.
    ///
    /// The type and its required parameters are checked here; on error the
    /// queue is left untouched.
    pub fn add_game_action(&mut self, name: &str, params: ActionParams) -> Result<(), EngineError> {
        self.ensure_running()?;
        let action = self.build(name, &params)?;
        self.queue.push_back(QueuedAction {
            action,
            descriptor: ActionDescriptor::new(name, params),
            origin: ActionOrigin::External,
            phase: ActionPhase::Created,
        });
        Ok(())
    }

    /// Queue a play of the active player's held card at `card_index`.
    ///
    /// An illegal play is refused without touching the queue or the log.
    pub fn try_play_card(&mut self, card_index: usize) -> Result<(), EngineError> {
        self.ensure_running()?;
        let player = self.board.active_player_id();
        if !self.rules.can_play_held(card_index, player, &self.board) {
            return Err(EngineError::IllegalMove(format!(
                "{player} cannot play held card {card_index}"
            )));
        }
        self.add_game_action(PLAY_CARD, PlayCardAction::params(card_index))
    }

    /// Run one tick.
    ///
    /// A content error aborts the battle: it is returned from this call and
    /// every later one reports [`EngineError::Aborted`].
    pub fn update(&mut self, dt_ms: f32) -> Result<(), EngineError> {
        if let Some(reason) = &self.aborted {
            return Err(EngineError::Aborted(reason.clone()));
        }
        self.stats.ticks += 1;
        match self.config.mode {
            EngineMode::Headless => self.tick_headless(),
            EngineMode::Animated => self.tick_animated(dt_ms),
        }
    }

    /// Tick until nothing is queued or active.
    ///
    /// Only terminates if animations complete on their own: in headless
    /// mode, or with a presenter that reports completions by itself.
    pub fn run_until_idle(&mut self) -> Result<(), EngineError> {
        while !self.is_idle() {
            self.update(0.0)?;
        }
        Ok(())
    }

    /// Report a finished animation. Delivered on the next tick.
    pub fn post_animation_completed(&mut self, handle: SceneHandle) {
        self.completed.push(handle);
    }

    /// Checkpoint the current board into the battle log and flush it.
    pub fn finish_log(&mut self) -> Result<(), LogError> {
        match self.serializer.as_mut() {
            Some(serializer) => serializer.finish(&self.board),
            None => Ok(()),
        }
    }

    // === Introspection ===

    /// Nothing queued and nothing active.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.queue.is_empty()
    }

    #[must_use]
    pub fn active_action_name(&self) -> Option<&'static str> {
        self.active.as_ref().map(|active| active.action.name())
    }

    /// Phase of the active action.
    ///
    /// In animated mode an action is `StateApplied` for the tick it
    /// activates on, then `Animating` until its presentation finishes.
    /// Headless engines never hold an active action.
    #[must_use]
    pub fn active_phase(&self) -> Option<ActionPhase> {
        self.active.as_ref().map(|active| active.phase)
    }

    /// Phases of the queued actions, front first.
    pub fn queued_phases(&self) -> impl Iterator<Item = ActionPhase> + '_ {
        self.queue.iter().map(|queued| queued.phase)
    }

    #[must_use]
    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    /// Names of the queued actions, front first.
    pub fn queued_action_names(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(|queued| queued.descriptor.name.as_str())
    }

    #[must_use]
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Presented animations that have not reported completion.
    #[must_use]
    pub fn outstanding_animations(&self) -> usize {
        self.outstanding.len()
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    /// The setup this battle started from.
    #[must_use]
    pub fn setup(&self) -> &BattleSetup {
        &self.setup
    }

    #[must_use]
    pub fn board(&self) -> &BoardState {
        &self.board
    }

    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.board.winner()
    }

    #[must_use]
    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<CardCatalog> {
        &self.catalog
    }

    #[must_use]
    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    #[must_use]
    pub fn serializer(&self) -> Option<&BattleSerializer> {
        self.serializer.as_ref()
    }

    /// Detach the battle log, e.g. to read an in-memory log back.
    pub fn take_serializer(&mut self) -> Option<BattleSerializer> {
        self.serializer.take()
    }

    // === Ticks ===

    /// One headless tick: activate, run `init_animation` against a context
    /// whose requests are dropped, finish.
    fn tick_headless(&mut self) -> Result<(), EngineError> {
        if let Some(mut active) = self.activate()? {
            let mut anim = AnimationContext::new(
                &self.board,
                &self.catalog,
                &self.config,
                &mut self.next_handle,
                &mut self.requests,
            );
            active.action.init_animation(&mut anim);
            self.requests.clear();
            active.phase = ActionPhase::Finished;
            self.stats.actions_finished += 1;
            self.trace(active.action.name(), "finished without presentation");
        }
        Ok(())
    }

    /// One animated tick.
    ///
    /// An idle slot activates the next action and stops there, leaving it
    /// `StateApplied`. The following tick starts its presentation, and every
    /// tick after that polls it until it reports `Finished`.
    fn tick_animated(&mut self, dt_ms: f32) -> Result<(), EngineError> {
        self.presenter.drain_completed(&mut self.completed);
        for handle in self.completed.drain(..) {
            self.outstanding.remove(&handle);
            match self.active.as_mut() {
                Some(active) => active.action.on_animation_completed(handle),
                None => debug!("Completion for {handle} arrived with no active action"),
            }
        }

        let Some(active) = self.active.as_mut() else {
            self.active = self.activate()?;
            return Ok(());
        };

        if active.phase == ActionPhase::StateApplied {
            let mut anim = AnimationContext::new(
                &self.board,
                &self.catalog,
                &self.config,
                &mut self.next_handle,
                &mut self.requests,
            );
            active.action.init_animation(&mut anim);
            for (handle, request) in self.requests.drain(..) {
                self.outstanding.insert(handle);
                self.presenter.present(handle, &request);
            }
            active.phase = ActionPhase::Animating;
        }

        self.stats.animation_updates += 1;
        if active.action.update_animation(dt_ms) == AnimationStatus::Finished {
            active.phase = ActionPhase::Finished;
            let name = active.action.name();
            self.active = None;
            self.stats.actions_finished += 1;
            self.trace(name, "finished");
        }
        Ok(())
    }

    /// Pop the next action and run its logical phase.
    fn activate(&mut self) -> Result<Option<ActiveAction>, EngineError> {
        let Some(QueuedAction {
            mut action,
            descriptor,
            origin,
            phase,
        }) = self.queue.pop_front()
        else {
            return Ok(None);
        };
        debug_assert_eq!(phase, ActionPhase::Created);

        let mut ctx = ActionContext::new(
            &mut self.board,
            &mut self.rng,
            &self.catalog,
            &self.rules,
            &self.config,
        );
        let applied = action.set_new_game_state(&mut ctx, &descriptor.params);
        let chained = ctx.into_chained();
        if let Err(e) = applied {
            return Err(self.abort(e));
        }
        self.stats.actions_activated += 1;
        if self.config.log_transitions {
            debug!(
                "{} applied ({origin:?}, {} chained, {} queued)",
                descriptor.name,
                chained.len(),
                self.queue.len()
            );
        }

        self.interject(chained)?;

        if origin == ActionOrigin::External && action.should_be_serialized() {
            if let Some(serializer) = self.serializer.as_mut() {
                serializer.record(&descriptor);
            }
        }
        if action.is_checkpoint() {
            self.checkpoint();
        }

        if self.board.is_over() && !self.queue.is_empty() {
            debug!("Battle over, discarding {} queued actions", self.queue.len());
            self.stats.actions_discarded += self.queue.len() as u64;
            self.queue.clear();
        }
        Ok(Some(ActiveAction {
            action,
            phase: ActionPhase::StateApplied,
        }))
    }

    /// Put chained actions at the front of the queue, keeping their order.
    fn interject(&mut self, chained: Vec<ActionDescriptor>) -> Result<(), EngineError> {
        let mut built = Vec::with_capacity(chained.len());
        for descriptor in chained {
            match self.build(&descriptor.name, &descriptor.params) {
                Ok(action) => built.push(QueuedAction {
                    action,
                    descriptor,
                    origin: ActionOrigin::Chained,
                    phase: ActionPhase::Created,
                }),
                Err(e) => return Err(self.abort(e)),
            }
        }
        for queued in built.into_iter().rev() {
            self.queue.push_front(queued);
        }
        Ok(())
    }

    fn build(&self, name: &str, params: &ActionParams) -> Result<Box<dyn GameAction>, ActionError> {
        let action = self.factory.create_game_action(name)?;
        validate_params(action.as_ref(), params)?;
        Ok(action)
    }

    fn checkpoint(&mut self) {
        let Some(serializer) = self.serializer.as_mut() else {
            return;
        };
        if let Err(e) = serializer.checkpoint(&self.board) {
            warn!("Could not checkpoint battle {}: {e}", serializer.battle_id());
        }
        if let Err(e) = serializer.flush() {
            warn!(
                "Battle log flush failed, {} lines kept for the next checkpoint: {e}",
                serializer.pending_len()
            );
        }
    }

    fn abort(&mut self, e: ActionError) -> EngineError {
        error!("Aborting battle: {e}");
        self.queue.clear();
        self.active = None;
        self.aborted = Some(e.to_string());
        EngineError::Content(e)
    }

    fn ensure_running(&self) -> Result<(), EngineError> {
        if let Some(reason) = &self.aborted {
            return Err(EngineError::Aborted(reason.clone()));
        }
        if self.board.is_over() {
            return Err(EngineError::BattleOver);
        }
        Ok(())
    }

    fn trace(&self, name: &str, what: &str) {
        if self.config.log_transitions {
            debug!("{name} {what}");
        }
    }
}

impl std::fmt::Debug for ActionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionEngine")
            .field("mode", &self.config.mode)
            .field("turn", &self.board.turn_counter())
            .field("active", &self.active_action_name())
            .field("queued", &self.queue.len())
            .field("aborted", &self.aborted)
            .finish()
    }
}
