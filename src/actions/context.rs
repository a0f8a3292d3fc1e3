//! What an action sees while it mutates the board.

use serde::{Deserialize, Serialize};

use super::params::ActionParams;
use crate::board::BoardState;
use crate::cards::{CardCatalog, CardData, CardId};
use crate::core::{ActionError, BattleConfig, GameRng};
use crate::rules::RuleEngine;

/// An action type name plus its parameters.
///
/// This is the unit that gets chained, queued and written to the battle log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub name: String,
    pub params: ActionParams,
}

impl ActionDescriptor {
    pub fn new(name: impl Into<String>, params: ActionParams) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

/// Mutable battle access for `set_new_game_state`.
///
/// Follow-up actions requested through [`add_game_action`](Self::add_game_action)
/// are collected here and spliced into the queue by the engine right after
/// the current action, in request order.
pub struct ActionContext<'a> {
    pub board: &'a mut BoardState,
    pub rng: &'a mut GameRng,
    pub catalog: &'a CardCatalog,
    pub rules: &'a RuleEngine,
    pub config: &'a BattleConfig,
    chained: Vec<ActionDescriptor>,
}

impl<'a> ActionContext<'a> {
    pub fn new(
        board: &'a mut BoardState,
        rng: &'a mut GameRng,
        catalog: &'a CardCatalog,
        rules: &'a RuleEngine,
        config: &'a BattleConfig,
    ) -> Self {
        Self {
            board,
            rng,
            catalog,
            rules,
            config,
            chained: Vec::new(),
        }
    }

    /// Request a follow-up action.
    pub fn add_game_action(&mut self, name: &str, params: ActionParams) {
        self.chained.push(ActionDescriptor::new(name, params));
    }

    /// Request a follow-up action without parameters.
    pub fn chain(&mut self, name: &str) {
        self.add_game_action(name, ActionParams::new());
    }

    /// Follow-ups requested so far.
    #[must_use]
    pub fn chained(&self) -> &[ActionDescriptor] {
        &self.chained
    }

    /// Hand the follow-ups to the engine.
    pub fn into_chained(self) -> Vec<ActionDescriptor> {
        self.chained
    }

    /// Look up card data, treating an unknown id as a board inconsistency.
    pub fn card(&self, action: &str, id: CardId) -> Result<&'a CardData, ActionError> {
        let catalog: &'a CardCatalog = self.catalog;
        catalog
            .get(id)
            .ok_or_else(|| ActionError::inconsistent(action, format!("{id} is not in the catalog")))
    }
}
