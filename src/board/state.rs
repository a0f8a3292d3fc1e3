//! Canonical battle state.
//!
//! `BoardState` is the single source of truth for a battle. Only actions'
//! logical phase mutates it, and it does not check legality itself: that is
//! the rule engine's job.
//!
//! ## Active player
//!
//! Before the first turn advance there is no active player. While unset,
//! "active" resolves to the bottom player and "inactive" to the top player,
//! so the first `NextPlayer` hands the turn to the top player.
//!
//! ```
//! use battle_engine::board::{BattleSetup, BoardState};
//! use battle_engine::cards::CardId;
//! use battle_engine::core::{BattleConfig, PlayerId};
//!
//! let setup = BattleSetup::new(42, vec![CardId::new(1); 5], vec![CardId::new(2); 5]);
//! let mut board = BoardState::from_setup(&setup, &BattleConfig::default());
//!
//! assert_eq!(board.active_player(), None);
//! board.advance_turn();
//! assert_eq!(board.active_player_id(), PlayerId::TOP);
//! assert_eq!(board.turn_counter(), 1);
//! ```

use im::Vector;
use serde::{Deserialize, Serialize};

use super::instance::CardInstance;
use super::player::PlayerState;
use crate::cards::CardId;
use crate::core::{stable_hash64, BattleConfig, InstanceAllocator, PlayerId, PlayerMap};

/// Default starting health of the top player.
pub const DEFAULT_TOP_HEALTH: i32 = 33;

/// Default starting health of the bottom player.
pub const DEFAULT_BOT_HEALTH: i32 = 35;

/// Everything needed to reproduce a battle's starting state.
///
/// Doubles as the battle log header. Fields added after the first log
/// format default when absent, so older headers still load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSetup {
    pub seed: u64,
    pub top_deck: Vec<CardId>,
    pub bot_deck: Vec<CardId>,
    pub top_health: i32,
    pub bot_health: i32,
    #[serde(default)]
    pub top_resurrection: bool,
    #[serde(default)]
    pub bot_resurrection: bool,
    #[serde(default)]
    pub top_armor_recharge: i32,
    #[serde(default)]
    pub bot_armor_recharge: i32,
    /// Prepared position that replaces the dealt opening. Decks, healths and
    /// the per-player flags above are ignored when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_board: Option<BoardState>,
}

impl BattleSetup {
    /// Setup with default healths.
    pub fn new(seed: u64, top_deck: Vec<CardId>, bot_deck: Vec<CardId>) -> Self {
        Self {
            seed,
            top_deck,
            bot_deck,
            top_health: DEFAULT_TOP_HEALTH,
            bot_health: DEFAULT_BOT_HEALTH,
            top_resurrection: false,
            bot_resurrection: false,
            top_armor_recharge: 0,
            bot_armor_recharge: 0,
            start_board: None,
        }
    }

    /// Override both starting healths.
    #[must_use]
    pub fn with_health(mut self, top: i32, bot: i32) -> Self {
        self.top_health = top;
        self.bot_health = bot;
        self
    }

    /// Start either player with a resurrection ready.
    #[must_use]
    pub fn with_resurrection(mut self, top: bool, bot: bool) -> Self {
        self.top_resurrection = top;
        self.bot_resurrection = bot;
        self
    }

    /// Armor each player regains at the start of their turns.
    #[must_use]
    pub fn with_armor_recharge(mut self, top: i32, bot: i32) -> Self {
        self.top_armor_recharge = top;
        self.bot_armor_recharge = bot;
        self
    }

    /// Start from `board` instead of dealing the decks.
    ///
    /// The board travels in the log header, so a replay starts from the
    /// same position.
    #[must_use]
    pub fn with_start_board(mut self, board: BoardState) -> Self {
        self.start_board = Some(board);
        self
    }
}

/// Two-player battle state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardState {
    players: PlayerMap<PlayerState>,
    active_player: Option<PlayerId>,
    turn_counter: u32,
    instances: InstanceAllocator,
    winner: Option<PlayerId>,
}

impl BoardState {
    /// Deal both decks and set starting vitals.
    #[must_use]
    pub fn from_setup(setup: &BattleSetup, config: &BattleConfig) -> Self {
        if let Some(board) = &setup.start_board {
            return board.clone();
        }

        let mut instances = InstanceAllocator::default();
        let mut deal = |cards: &[CardId]| -> Vector<CardInstance> {
            cards
                .iter()
                .map(|&card| CardInstance::new(instances.allocate(), card))
                .collect()
        };
        let top_deck = deal(&setup.top_deck);
        let bot_deck = deal(&setup.bot_deck);

        let players = PlayerMap::new(|player| {
            let mut state = if player == PlayerId::TOP {
                PlayerState::new(
                    top_deck.clone(),
                    setup.top_health,
                    config.top_starting_weight,
                    config.weight_limit,
                )
            } else {
                PlayerState::new(
                    bot_deck.clone(),
                    setup.bot_health,
                    config.bot_starting_weight,
                    config.weight_limit,
                )
            };
            let (resurrection, armor_recharge) = if player == PlayerId::TOP {
                (setup.top_resurrection, setup.top_armor_recharge)
            } else {
                (setup.bot_resurrection, setup.bot_armor_recharge)
            };
            state.has_resurrection_active = resurrection;
            state.armor_recharge = armor_recharge;
            state
        });

        Self {
            players,
            active_player: None,
            turn_counter: 0,
            instances,
            winner: None,
        }
    }

    // === Players ===

    /// The player whose turn it is, if a turn has started.
    #[must_use]
    pub fn active_player(&self) -> Option<PlayerId> {
        self.active_player
    }

    /// Active player, resolving to the bottom player before the first turn.
    #[must_use]
    pub fn active_player_id(&self) -> PlayerId {
        self.active_player.unwrap_or(PlayerId::BOT)
    }

    /// The other player.
    #[must_use]
    pub fn inactive_player_id(&self) -> PlayerId {
        self.active_player_id().opponent()
    }

    #[must_use]
    pub fn player(&self, player: PlayerId) -> &PlayerState {
        &self.players[player]
    }

    pub fn player_mut(&mut self, player: PlayerId) -> &mut PlayerState {
        &mut self.players[player]
    }

    #[must_use]
    pub fn active(&self) -> &PlayerState {
        self.player(self.active_player_id())
    }

    pub fn active_mut(&mut self) -> &mut PlayerState {
        let id = self.active_player_id();
        self.player_mut(id)
    }

    #[must_use]
    pub fn inactive(&self) -> &PlayerState {
        self.player(self.inactive_player_id())
    }

    pub fn inactive_mut(&mut self) -> &mut PlayerState {
        let id = self.inactive_player_id();
        self.player_mut(id)
    }

    /// Iterate over both players.
    pub fn players(&self) -> impl Iterator<Item = (PlayerId, &PlayerState)> {
        self.players.iter()
    }

    // === Turn flow ===

    /// Hand the turn to the next player and bump the turn counter.
    ///
    /// Returns the previous active player (`None` on the first turn).
    pub fn advance_turn(&mut self) -> Option<PlayerId> {
        let previous = self.active_player;
        self.active_player = Some(previous.map_or(PlayerId::TOP, PlayerId::opponent));
        self.turn_counter += 1;
        previous
    }

    /// Number of turn advances so far.
    #[must_use]
    pub fn turn_counter(&self) -> u32 {
        self.turn_counter
    }

    // === Outcome ===

    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Record the winner. The first declaration sticks.
    ///
    /// Returns `true` if this call decided the battle.
    pub fn declare_winner(&mut self, player: PlayerId) -> bool {
        if self.winner.is_some() {
            return false;
        }
        self.winner = Some(player);
        true
    }

    // === Instances ===

    /// Create a fresh instance of a card. Ids are never reused.
    pub fn spawn_instance(&mut self, card: CardId) -> CardInstance {
        CardInstance::new(self.instances.allocate(), card)
    }

    /// Number of card instances ever created in this battle.
    #[must_use]
    pub fn instances_created(&self) -> u32 {
        self.instances.allocated()
    }

    // === Snapshots ===

    /// Compact binary snapshot.
    pub fn snapshot(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Restore from a snapshot.
    pub fn from_snapshot(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }

    /// Stable digest of the full state, used by replay verification.
    pub fn digest(&self) -> Result<u64, bincode::Error> {
        let bytes = self.snapshot()?;
        Ok(stable_hash64(&[bytes.as_slice()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    fn setup() -> BattleSetup {
        BattleSetup::new(7, vec![CardId::new(1); 4], vec![CardId::new(2); 6])
    }

    #[test]
    fn test_from_setup() {
        let board = BoardState::from_setup(&setup(), &BattleConfig::default());

        assert_eq!(board.player(PlayerId::TOP).deck.len(), 4);
        assert_eq!(board.player(PlayerId::BOT).deck.len(), 6);
        assert_eq!(board.player(PlayerId::TOP).health, DEFAULT_TOP_HEALTH);
        assert_eq!(board.player(PlayerId::BOT).health, DEFAULT_BOT_HEALTH);
        assert_eq!(board.player(PlayerId::TOP).total_weight, 3);
        assert_eq!(board.player(PlayerId::BOT).total_weight, 6);
        assert_eq!(board.instances_created(), 10);
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_instance_ids_unique() {
        let mut board = BoardState::from_setup(&setup(), &BattleConfig::default());
        let extra = board.spawn_instance(CardId::new(3));

        let mut seen = FxHashSet::default();
        for (_, player) in board.players() {
            for card in player.deck.iter() {
                assert!(seen.insert(card.id));
            }
        }
        assert!(seen.insert(extra.id));
    }

    #[test]
    fn test_active_player_before_first_turn() {
        let board = BoardState::from_setup(&setup(), &BattleConfig::default());
        assert_eq!(board.active_player(), None);
        assert_eq!(board.active_player_id(), PlayerId::BOT);
        assert_eq!(board.inactive_player_id(), PlayerId::TOP);
    }

    #[test]
    fn test_advance_turn_alternates() {
        let mut board = BoardState::from_setup(&setup(), &BattleConfig::default());

        assert_eq!(board.advance_turn(), None);
        assert_eq!(board.active_player_id(), PlayerId::TOP);
        assert_eq!(board.advance_turn(), Some(PlayerId::TOP));
        assert_eq!(board.active_player_id(), PlayerId::BOT);
        assert_eq!(board.turn_counter(), 2);
    }

    #[test]
    fn test_declare_winner_first_sticks() {
        let mut board = BoardState::from_setup(&setup(), &BattleConfig::default());
        assert!(board.declare_winner(PlayerId::BOT));
        assert!(!board.declare_winner(PlayerId::TOP));
        assert_eq!(board.winner(), Some(PlayerId::BOT));
    }

    #[test]
    fn test_setup_flags_applied() {
        let setup = setup().with_resurrection(false, true).with_armor_recharge(2, 0);
        let board = BoardState::from_setup(&setup, &BattleConfig::default());

        assert!(!board.player(PlayerId::TOP).has_resurrection_active);
        assert!(board.player(PlayerId::BOT).has_resurrection_active);
        assert_eq!(board.player(PlayerId::TOP).armor_recharge, 2);
        assert_eq!(board.player(PlayerId::BOT).armor_recharge, 0);
    }

    #[test]
    fn test_start_board_replaces_deal() {
        let mut prepared = BoardState::from_setup(&setup(), &BattleConfig::default());
        prepared.advance_turn();
        prepared.player_mut(PlayerId::TOP).health = 1;

        let setup = BattleSetup::new(7, Vec::new(), Vec::new()).with_start_board(prepared.clone());
        assert_eq!(BoardState::from_setup(&setup, &BattleConfig::default()), prepared);
    }

    #[test]
    fn test_header_without_new_fields_loads() {
        let json = r#"{"seed":3,"top_deck":[1],"bot_deck":[2],"top_health":10,"bot_health":12}"#;
        let setup: BattleSetup = serde_json::from_str(json).unwrap();

        assert!(!setup.top_resurrection && !setup.bot_resurrection);
        assert_eq!((setup.top_armor_recharge, setup.bot_armor_recharge), (0, 0));
        assert!(setup.start_board.is_none());
    }

    #[test]
    fn test_snapshot_roundtrip_and_digest() {
        let mut board = BoardState::from_setup(&setup(), &BattleConfig::default());
        board.advance_turn();

        let bytes = board.snapshot().unwrap();
        let restored = BoardState::from_snapshot(&bytes).unwrap();
        assert_eq!(board, restored);
        assert_eq!(board.digest().unwrap(), restored.digest().unwrap());

        let mut changed = restored;
        changed.active_mut().health -= 1;
        assert_ne!(board.digest().unwrap(), changed.digest().unwrap());
    }
}
