//! Animation contract between actions and the presenter.
//!
//! Actions never touch scene objects. During `init_animation` they describe
//! what should be shown as [`AnimationRequest`]s and get an opaque
//! [`SceneHandle`] back for each. The presenter reports finished animations
//! by handle; the engine drains those reports once per tick and forwards
//! them to the active action's `on_animation_completed`.
//!
//! Most actions wait for a set of handles ([`AnimationTracker`]); a few run
//! for a fixed time instead ([`AnimationTimer`]).

use smallvec::SmallVec;

use crate::board::{BoardState, CardStatType};
use crate::cards::{CardCatalog, CardId};
use crate::core::{BattleConfig, InstanceId, PlayerId};

/// Opaque reference to a presenter-side scene object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SceneHandle(pub u32);

impl std::fmt::Display for SceneHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Scene({})", self.0)
    }
}

/// Result of one animation update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationStatus {
    Running,
    Finished,
}

/// A player vital shown in the HUD.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VitalStat {
    Health,
    Armor,
    Poison,
    Weight,
}

/// Kind of card history entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryEntryType {
    Battle,
    Effect,
    Death,
    Poison,
    TurnCounter,
}

impl std::str::FromStr for HistoryEntryType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "battle" => Ok(Self::Battle),
            "effect" => Ok(Self::Effect),
            "death" => Ok(Self::Death),
            "poison" => Ok(Self::Poison),
            "turn_counter" => Ok(Self::TurnCounter),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for HistoryEntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Battle => "battle",
            Self::Effect => "effect",
            Self::Death => "death",
            Self::Poison => "poison",
            Self::TurnCounter => "turn_counter",
        };
        f.write_str(name)
    }
}

/// Which part of the battle scene is opening.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattleSubscene {
    Battle,
    Wheel,
    CardSelection,
    StoryVictory,
}

impl std::str::FromStr for BattleSubscene {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "battle" => Ok(Self::Battle),
            "wheel" => Ok(Self::Wheel),
            "card_selection" => Ok(Self::CardSelection),
            "story_victory" => Ok(Self::StoryVictory),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for BattleSubscene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Battle => "battle",
            Self::Wheel => "wheel",
            Self::CardSelection => "card_selection",
            Self::StoryVictory => "story_victory",
        };
        f.write_str(name)
    }
}

/// Something an action wants shown.
#[derive(Clone, Debug, PartialEq)]
pub enum AnimationRequest {
    CardDraw { player: PlayerId, instance: InstanceId, card: CardId, duration_ms: f32 },
    CardPlay { player: PlayerId, instance: InstanceId, card: CardId, duration_ms: f32 },
    CardAttack { player: PlayerId, board_index: usize, damage: i32, duration_ms: f32 },
    CardDissolve { player: PlayerId, card_indices: SmallVec<[usize; 4]>, is_board_card: bool, duration_ms: f32 },
    CardBurrow { player: PlayerId, board_index: usize, duration_ms: f32 },
    CardSummon { player: PlayerId, instance: InstanceId, card: CardId, duration_ms: f32 },
    CardScale { player: PlayerId, card_index: usize, is_board_card: bool, factor: f32, duration_ms: f32 },
    CardStatChange { player: PlayerId, board_index: usize, stat: CardStatType, value: i32, duration_ms: f32 },
    ParticleEffect { player: PlayerId, name: String },
    StatChange { player: PlayerId, stat: VitalStat, value: i32, duration_ms: f32 },
    HistoryEntry { player: PlayerId, card_index: usize, entry: HistoryEntryType, is_turn_counter: bool },
    Banner { text: String, duration_ms: f32 },
    /// Board slides into place, then the rest of the scene fades in.
    BoardEntrance { subscene: BattleSubscene, duration_ms: f32, fade_in_ms: f32 },
}

/// Read-only view plus request sink handed to `init_animation`.
pub struct AnimationContext<'a> {
    pub board: &'a BoardState,
    pub catalog: &'a CardCatalog,
    pub config: &'a BattleConfig,
    next_handle: &'a mut u32,
    requests: &'a mut Vec<(SceneHandle, AnimationRequest)>,
}

impl<'a> AnimationContext<'a> {
    pub fn new(
        board: &'a BoardState,
        catalog: &'a CardCatalog,
        config: &'a BattleConfig,
        next_handle: &'a mut u32,
        requests: &'a mut Vec<(SceneHandle, AnimationRequest)>,
    ) -> Self {
        Self {
            board,
            catalog,
            config,
            next_handle,
            requests,
        }
    }

    /// Queue a request for the presenter and get its handle.
    pub fn request(&mut self, request: AnimationRequest) -> SceneHandle {
        let handle = SceneHandle(*self.next_handle);
        *self.next_handle = self.next_handle.wrapping_add(1);
        self.requests.push((handle, request));
        handle
    }
}

/// Outstanding scene handles an action is waiting on.
#[derive(Clone, Debug, Default)]
pub struct AnimationTracker {
    pending: SmallVec<[SceneHandle; 4]>,
}

impl AnimationTracker {
    /// Start waiting on a handle.
    pub fn track(&mut self, handle: SceneHandle) {
        self.pending.push(handle);
    }

    /// Stop waiting on a handle. Returns `false` for handles never tracked.
    pub fn complete(&mut self, handle: SceneHandle) -> bool {
        match self.pending.iter().position(|&h| h == handle) {
            Some(pos) => {
                self.pending.swap_remove(pos);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.pending.is_empty()
    }

    /// `Finished` once every tracked handle completed.
    #[must_use]
    pub fn status(&self) -> AnimationStatus {
        if self.is_done() {
            AnimationStatus::Finished
        } else {
            AnimationStatus::Running
        }
    }
}

/// Countdown for time-driven animations.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnimationTimer {
    remaining_ms: f32,
}

impl AnimationTimer {
    #[must_use]
    pub fn new(duration_ms: f32) -> Self {
        Self {
            remaining_ms: duration_ms.max(0.0),
        }
    }

    /// Advance by `dt_ms` and report whether time is up.
    pub fn tick(&mut self, dt_ms: f32) -> AnimationStatus {
        self.remaining_ms -= dt_ms.max(0.0);
        if self.remaining_ms <= 0.0 {
            AnimationStatus::Finished
        } else {
            AnimationStatus::Running
        }
    }
}
