//! Card catalog for definition lookup.
//!
//! The `CardCatalog` stores every card definition a battle can reference.
//! It is built once, then shared immutably (`Arc<CardCatalog>`) by the
//! action engine, the rule engine and the action generator.

use rustc_hash::FxHashMap;

use super::definition::{CardData, CardFamily, CardId};

/// Catalog of card definitions.
///
/// ## Example
///
/// ```
/// use battle_engine::cards::{CardCatalog, CardData, CardFamily, CardId};
///
/// let mut catalog = CardCatalog::new();
/// catalog.register(CardData::creature(CardId::new(1), "Raptor", CardFamily::Dinosaurs, 3, 3));
///
/// let found = catalog.get(CardId::new(1)).unwrap();
/// assert_eq!(found.name, "Raptor");
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardCatalog {
    cards: FxHashMap<CardId, CardData>,
}

impl CardCatalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card definition.
    ///
    /// Panics if a card with the same ID already exists.
    pub fn register(&mut self, card: CardData) {
        if self.cards.contains_key(&card.id) {
            panic!("Card with ID {:?} already registered", card.id);
        }
        self.cards.insert(card.id, card);
    }

    /// Get a card definition by ID.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&CardData> {
        self.cards.get(&id)
    }

    /// Check if a card ID is registered.
    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    /// Get the number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all card definitions (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &CardData> {
        self.cards.values()
    }

    /// Ids of every card matching a predicate, sorted.
    ///
    /// Sorting keeps random picks over the result reproducible.
    pub fn ids_where<F>(&self, predicate: F) -> Vec<CardId>
    where
        F: Fn(&CardData) -> bool,
    {
        let mut ids: Vec<_> = self
            .cards
            .values()
            .filter(|c| predicate(c))
            .map(|c| c.id)
            .collect();
        ids.sort();
        ids
    }

    /// Ids of a family's cards, sorted.
    pub fn ids_by_family(&self, family: CardFamily) -> Vec<CardId> {
        self.ids_where(|c| c.family == family)
    }

    /// Ids of the cards a hound summon can produce, sorted.
    pub fn hound_ids(&self) -> Vec<CardId> {
        self.ids_where(CardData::is_hound)
    }

    /// The built-in card set: one creature line and a spell suite per family.
    #[must_use]
    pub fn standard() -> Self {
        use CardFamily::*;

        let creatures: &[(u32, &str, CardFamily, i32, i32)] = &[
            (1, "Bee", Insects, 1, 1),
            (2, "Ant", Insects, 2, 2),
            (3, "Mantis", Insects, 3, 3),
            (4, "Beetle", Insects, 4, 4),
            (5, "Scorpion", Insects, 5, 5),
            (10, "Mouse", Rodents, 1, 1),
            (11, "Rat", Rodents, 2, 2),
            (12, "Mole", Rodents, 3, 3),
            (13, "Beaver", Rodents, 4, 4),
            (14, "Porcupine", Rodents, 5, 5),
            (20, "Raptor", Dinosaurs, 3, 3),
            (21, "Stegosaurus", Dinosaurs, 5, 5),
            (22, "Triceratops", Dinosaurs, 6, 6),
            (23, "Tyrannosaurus", Dinosaurs, 8, 8),
            (30, "Imp", Demons, 2, 2),
            (31, "Fire Hound", Demons, 3, 3),
            (32, "Shadow Hound", Demons, 4, 3),
            (33, "Brute", Demons, 6, 5),
        ];

        let spells: &[(u32, &str, CardFamily, i32, &str)] = &[
            (40, "Hive Mind", Insects, 2, "DAMAGE FAMILY BOARD HELD 1"),
            (41, "Poison Cloud", Insects, 2, "ADD_POISON_STACKS 3"),
            (42, "Toxic Bomb", Insects, 1, "TOXIC_BOMB"),
            (43, "Megaswarm", Insects, 4, "INSECT_MEGASWARM"),
            (44, "Plague", Insects, 3, "INSECT_VIRUS"),
            (45, "Venom Glands", Insects, 2, "DOUBLE_POISON_ATTACKS"),
            (46, "Brood", Insects, 3, "DUPLICATE_NEXT_INSECT"),
            (50, "Deep Burrow", Rodents, 2, "DIG_NO_FAIL"),
            (51, "Blood Teeth", Rodents, 3, "RODENT_LIFESTEAL_ON_ATTACKS"),
            (52, "Rat Trap", Rodents, 3, "KILL"),
            (53, "Scavenge", Rodents, 2, "DRAW 2"),
            (54, "Cheese Hoard", Rodents, 1, "GAIN_2_WEIGHT"),
            (60, "Meteor", Dinosaurs, 4, "METEOR"),
            (61, "Primal Roar", Dinosaurs, 2, "DOUBLE_NEXT_DINO_DAMAGE"),
            (62, "Feast", Dinosaurs, 2, "HEAL_NEXT_DINO_DAMAGE"),
            (63, "Reversal", Dinosaurs, 1, "SWAP_MIN_MAX_DAMAGE"),
            (64, "Fossil Armor", Dinosaurs, 3, "ARMOR 3"),
            (65, "Frenzy", Dinosaurs, 1, "RANDOM_HAND_BUFF_ATTACK 2"),
            (66, "Apex", Dinosaurs, 2, "TRIPPLES_LOWEST_ATTACK_ON_HAND"),
            (70, "Call the Pack", Demons, 4, "HOUND_SUMMON 2"),
            (71, "Demon Punch", Demons, 1, "DEMON_PUNCH"),
            (72, "Hex", Demons, 3, "ENEMY_BOARD_DEBUFF DAMAGE -1"),
            (73, "Soul Snare", Demons, 3, "DEMON_KILL"),
            (74, "Spell Ward", Demons, 2, "SPELL_KILL"),
            (75, "Withering", Demons, 3, "WEIGHT PERMANENT_CONTINUAL_WEIGHT_REDUCTION"),
            (76, "Rhythm", Demons, 2, "EVERY_THIRD_CARD_PLAYED_HAS_ZERO_COST"),
            (77, "Purify", Demons, 1, "CLEAR_EFFECTS"),
            (78, "Grimoire", Demons, 1, "DRAW_RANDOM_SPELL"),
            (79, "Ember Gift", Demons, 0, "GAIN_1_WEIGHT"),
        ];

        let mut catalog = Self::new();
        for &(id, name, family, damage, weight) in creatures {
            catalog.register(CardData::creature(CardId::new(id), name, family, damage, weight));
        }
        for &(id, name, family, weight, effect) in spells {
            let mut card = CardData::spell(CardId::new(id), name, family, weight, effect);
            if matches!(id, 42 | 60) {
                card = card.single_use();
            }
            if matches!(id, 43 | 60 | 70) {
                card = card.with_particle_effect(format!("{}_burst", family));
            }
            catalog.register(card);
        }
        catalog
    }

    /// A family's standard deck: every card of that family, sorted by id.
    #[must_use]
    pub fn family_deck(&self, family: CardFamily) -> Vec<CardId> {
        self.ids_by_family(family)
    }
}
