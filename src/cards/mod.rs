//! Card system: definitions, effect grammar and the catalog.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier for card definitions
//! - `CardFamily`: Insects, rodents, dinosaurs, demons
//! - `CardData`: Static card data (damage, weight, effect string)
//! - `CardEffect`: Parsed spell effect
//! - `CardCatalog`: Card definition lookup

pub mod definition;
pub mod effect;
pub mod catalog;

pub use definition::{CardData, CardFamily, CardId};
pub use effect::{CardEffect, EffectComponent, UnknownComponent};
pub use catalog::CardCatalog;
