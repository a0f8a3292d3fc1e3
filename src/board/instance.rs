//! Card instances - runtime card state.
//!
//! `CardInstance` is one physical card in a battle. It references its
//! definition by `CardId` and carries stat overrides that travel with it
//! from zone to zone (a card buffed in hand keeps the buff on the board).

use serde::{Deserialize, Serialize};

use super::stats::{CardStatType, StatMap};
use crate::cards::{CardData, CardId};
use crate::core::InstanceId;

/// A card instance in a battle.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardInstance {
    /// Unique, never reused instance id.
    pub id: InstanceId,

    /// Reference to the card definition.
    pub card: CardId,

    /// Per-instance stat overrides.
    #[serde(default)]
    pub overrides: StatMap,
}

impl CardInstance {
    /// Create an instance with no overrides.
    #[must_use]
    pub fn new(id: InstanceId, card: CardId) -> Self {
        Self {
            id,
            card,
            overrides: StatMap::default(),
        }
    }

    /// Damage before global modifiers: the override if set, else the base.
    #[must_use]
    pub fn damage(&self, data: &CardData) -> i32 {
        self.overrides.damage.unwrap_or(data.damage)
    }

    /// Weight before global modifiers: the override if set, else the base.
    #[must_use]
    pub fn weight(&self, data: &CardData) -> i32 {
        self.overrides.weight.unwrap_or(data.weight)
    }

    /// Stat by type.
    #[must_use]
    pub fn stat(&self, data: &CardData, stat: CardStatType) -> i32 {
        match stat {
            CardStatType::Damage => self.damage(data),
            CardStatType::Weight => self.weight(data),
        }
    }

    /// Add `delta` to a stat, creating the override from the current value.
    pub fn adjust(&mut self, data: &CardData, stat: CardStatType, delta: i32) {
        let current = self.stat(data, stat);
        self.overrides.set(stat, current + delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardFamily;

    fn raptor() -> CardData {
        CardData::creature(CardId::new(20), "Raptor", CardFamily::Dinosaurs, 3, 3)
    }

    #[test]
    fn test_base_stats() {
        let card = CardInstance::new(InstanceId::new(0), CardId::new(20));
        assert_eq!(card.damage(&raptor()), 3);
        assert_eq!(card.weight(&raptor()), 3);
    }

    #[test]
    fn test_adjust_creates_override() {
        let data = raptor();
        let mut card = CardInstance::new(InstanceId::new(0), CardId::new(20));

        card.adjust(&data, CardStatType::Damage, 2);
        card.adjust(&data, CardStatType::Damage, 1);

        assert_eq!(card.overrides.damage, Some(6));
        assert_eq!(card.damage(&data), 6);
        assert_eq!(card.overrides.weight, None);
    }

    #[test]
    fn test_instance_serde() {
        let mut card = CardInstance::new(InstanceId::new(3), CardId::new(20));
        card.overrides.set(CardStatType::Weight, 0);

        let json = serde_json::to_string(&card).unwrap();
        let restored: CardInstance = serde_json::from_str(&json).unwrap();
        assert_eq!(card, restored);
    }
}
