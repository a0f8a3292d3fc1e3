//! The two sides of a battle.
//!
//! The top player is `PlayerId(0)` and moves first; the bottom player is
//! `PlayerId(1)`. Logs and action parameters address players by this raw
//! index, so it must stay stable.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Number of sides in a battle.
pub const PLAYER_COUNT: usize = 2;

/// A side of the battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Moves first.
    pub const TOP: PlayerId = PlayerId(0);

    pub const BOT: PlayerId = PlayerId(1);

    /// Seat index, as written in action parameters.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The other side of the battle.
    ///
    /// ```
    /// use battle_engine::core::PlayerId;
    ///
    /// assert_eq!(PlayerId::TOP.opponent(), PlayerId::BOT);
    /// assert_eq!(PlayerId::BOT.opponent(), PlayerId::TOP);
    /// ```
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self.0 {
            0 => Self::BOT,
            _ => Self::TOP,
        }
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::TOP => f.write_str("top player"),
            Self::BOT => f.write_str("bottom player"),
            Self(seat) => write!(f, "seat {seat}"),
        }
    }
}

impl std::str::FromStr for PlayerId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u8>().map(PlayerId)
    }
}

/// One value per side, indexed by [`PlayerId`].
///
/// ```
/// use battle_engine::core::{PlayerId, PlayerMap};
///
/// let mut health = PlayerMap::new(|p| if p == PlayerId::TOP { 33 } else { 35 });
/// health[PlayerId::BOT] -= 5;
///
/// assert_eq!(health[PlayerId::TOP], 33);
/// assert_eq!(health[PlayerId::BOT], 30);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    sides: [T; PLAYER_COUNT],
}

impl<T> PlayerMap<T> {
    /// Build both entries, top first.
    pub fn new(mut build: impl FnMut(PlayerId) -> T) -> Self {
        Self {
            sides: [build(PlayerId::TOP), build(PlayerId::BOT)],
        }
    }

    /// Both entries, top first.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        [PlayerId::TOP, PlayerId::BOT].into_iter().zip(self.sides.iter())
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &T {
        &self.sides[player.index()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.sides[player.index()]
    }
}
