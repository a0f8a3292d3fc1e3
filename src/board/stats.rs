//! Card stat overrides and board modifiers.
//!
//! ## StatMap
//!
//! Two optional integers (damage and weight). Used both for per-instance
//! overrides (a held card buffed to 6 damage) and for a side's global
//! modifiers (every card on this side deals -1 damage).
//!
//! ## BoardModifierMask
//!
//! Bit flags for persistent board effects: armed traps, next-card buffs,
//! poison doubling and so on. Some flags sit on the side that cast them,
//! traps sit on the side they will fire against.

use serde::{Deserialize, Serialize};

/// Which stat an override or modifier changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardStatType {
    Damage,
    Weight,
}

/// Optional damage and weight values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatMap {
    pub damage: Option<i32>,
    pub weight: Option<i32>,
}

impl StatMap {
    /// Get a stat, if set.
    #[must_use]
    pub fn get(&self, stat: CardStatType) -> Option<i32> {
        match stat {
            CardStatType::Damage => self.damage,
            CardStatType::Weight => self.weight,
        }
    }

    /// Set a stat.
    pub fn set(&mut self, stat: CardStatType, value: i32) {
        match stat {
            CardStatType::Damage => self.damage = Some(value),
            CardStatType::Weight => self.weight = Some(value),
        }
    }

    /// Add to a stat, treating an unset stat as zero.
    pub fn add(&mut self, stat: CardStatType, delta: i32) {
        let current = self.get(stat).unwrap_or(0);
        self.set(stat, current + delta);
    }

    /// Check whether no stat is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.damage.is_none() && self.weight.is_none()
    }

    /// Unset every stat.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Persistent board effect flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardModifierMask(pub u32);

impl BoardModifierMask {
    pub const NONE: Self = Self(0x0);
    pub const KILL_NEXT: Self = Self(0x1);
    pub const BOARD_SIDE_DEBUFF: Self = Self(0x2);
    pub const DUPLICATE_NEXT_INSECT: Self = Self(0x4);
    pub const DOUBLE_NEXT_DINO_DAMAGE: Self = Self(0x8);
    pub const DOUBLE_POISON_ATTACKS: Self = Self(0x10);
    pub const PERMANENT_CONTINUAL_WEIGHT_REDUCTION: Self = Self(0x20);
    pub const DIG_NO_FAIL: Self = Self(0x40);
    pub const RODENT_LIFESTEAL: Self = Self(0x80);
    pub const HEAL_NEXT_DINO_DAMAGE: Self = Self(0x100);
    pub const INSECT_VIRUS: Self = Self(0x200);
    pub const DEMON_KILL_NEXT: Self = Self(0x400);
    pub const EVERY_THIRD_CARD_PLAYED_HAS_ZERO_COST: Self = Self(0x800);
    pub const SPELL_KILL_NEXT: Self = Self(0x1000);

    /// Flags that survive the end-of-turn cleanup.
    pub const PERMANENT: Self = Self(
        Self::PERMANENT_CONTINUAL_WEIGHT_REDUCTION.0
            | Self::EVERY_THIRD_CARD_PLAYED_HAS_ZERO_COST.0
            | Self::INSECT_VIRUS.0,
    );

    /// Check whether every flag in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    /// Set the flags in `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clear the flags in `other`.
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Keep only the flags in `other`.
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// A side's persistent board effects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardModifiers {
    pub mask: BoardModifierMask,
    pub global_stats: StatMap,
}

impl BoardModifiers {
    /// Check a flag.
    #[must_use]
    pub fn has(&self, flag: BoardModifierMask) -> bool {
        self.mask.contains(flag)
    }

    /// End-of-turn cleanup: keep permanent flags, and keep the global weight
    /// modifier only while continual weight reduction is active.
    pub fn retain_permanent(&mut self) {
        let weight = self.global_stats.weight;
        self.mask = self.mask.intersection(BoardModifierMask::PERMANENT);
        self.global_stats.clear();
        if self.has(BoardModifierMask::PERMANENT_CONTINUAL_WEIGHT_REDUCTION) {
            self.global_stats.weight = weight;
        }
    }
}
