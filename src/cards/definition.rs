//! Card definitions: static card data.
//!
//! `CardData` holds the immutable properties of a card: family, base damage,
//! base weight (cost) and, for spells, the effect string. Anything that can
//! change during a battle (buffed damage, discounted weight) lives on the
//! card instance as a stat override instead.

use serde::{Deserialize, Serialize};

/// Identifier of a card definition.
///
/// This identifies the "type" of card (e.g., "Raptor"),
/// not a specific instance in a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Card family. Several rules and effects key off it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CardFamily {
    /// Attacks add poison stacks to the defender.
    Insects,
    /// May dig back instead of being destroyed after attacking.
    Rodents,
    Dinosaurs,
    Demons,
}

impl CardFamily {
    /// All families in catalog order.
    pub const ALL: [CardFamily; 4] = [
        CardFamily::Insects,
        CardFamily::Rodents,
        CardFamily::Dinosaurs,
        CardFamily::Demons,
    ];
}

impl std::fmt::Display for CardFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CardFamily::Insects => "insects",
            CardFamily::Rodents => "rodents",
            CardFamily::Dinosaurs => "dinosaurs",
            CardFamily::Demons => "demons",
        };
        f.write_str(name)
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use battle_engine::cards::{CardData, CardFamily, CardId};
///
/// let raptor = CardData::creature(CardId::new(1), "Raptor", CardFamily::Dinosaurs, 3, 3);
/// assert!(!raptor.is_spell());
///
/// let roar = CardData::spell(CardId::new(2), "Roar", CardFamily::Dinosaurs, 2, "DOUBLE_NEXT_DINO_DAMAGE")
///     .single_use();
/// assert!(roar.is_spell());
/// assert!(roar.is_single_use);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardData {
    /// Unique identifier for this card definition.
    pub id: CardId,

    /// Display name.
    pub name: String,

    /// Card family.
    pub family: CardFamily,

    /// Base damage dealt when attacking.
    pub damage: i32,

    /// Base weight (cost) to play.
    pub weight: i32,

    /// Space-separated effect components. Non-empty for spells.
    pub effect: String,

    /// Particle effect shown when the card is played.
    pub particle_effect: Option<String>,

    /// Single-use spells leave the deck for good once played.
    pub is_single_use: bool,
}

impl CardData {
    /// A non-spell card.
    pub fn creature(id: CardId, name: impl Into<String>, family: CardFamily, damage: i32, weight: i32) -> Self {
        Self {
            id,
            name: name.into(),
            family,
            damage,
            weight,
            effect: String::new(),
            particle_effect: None,
            is_single_use: false,
        }
    }

    /// A spell card with the given effect string.
    pub fn spell(
        id: CardId,
        name: impl Into<String>,
        family: CardFamily,
        weight: i32,
        effect: impl Into<String>,
    ) -> Self {
        Self {
            effect: effect.into(),
            ..Self::creature(id, name, family, 0, weight)
        }
    }

    /// Attach a particle effect.
    #[must_use]
    pub fn with_particle_effect(mut self, name: impl Into<String>) -> Self {
        self.particle_effect = Some(name.into());
        self
    }

    /// Mark as single use.
    #[must_use]
    pub fn single_use(mut self) -> Self {
        self.is_single_use = true;
        self
    }

    /// Spells carry an effect; everything else fights.
    #[must_use]
    pub fn is_spell(&self) -> bool {
        !self.effect.is_empty()
    }

    /// Demons whose name ends in "Hound" answer hound summons.
    #[must_use]
    pub fn is_hound(&self) -> bool {
        self.family == CardFamily::Demons && !self.is_spell() && self.name.ends_with("Hound")
    }

    /// Non-spell dinosaurs are the targets of meteor and damage-swap effects.
    #[must_use]
    pub fn is_dino_creature(&self) -> bool {
        self.family == CardFamily::Dinosaurs && !self.is_spell()
    }

    /// Check whether the effect string mentions a component token.
    #[must_use]
    pub fn has_effect_token(&self, token: &str) -> bool {
        self.effect.split_whitespace().any(|t| t == token)
    }
}
