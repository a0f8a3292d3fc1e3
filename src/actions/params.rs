//! Action parameters.
//!
//! Parameters are an ordered list of `(name, value)` string pairs. They are
//! stored and logged exactly as given, so a replayed log hands every action
//! the same parameters in the same order. Typed access goes through
//! [`ActionParams::parse`] and friends, which turn a missing or malformed
//! value into an [`ActionError`] naming the action and parameter.
//!
//! ```
//! use battle_engine::actions::ActionParams;
//!
//! let params = ActionParams::new()
//!     .with("card_index", 2)
//!     .with("player_index", 1);
//!
//! assert_eq!(params.parse::<usize>("CardAttack", "card_index").unwrap(), 2);
//! assert!(params.parse::<usize>("CardAttack", "damage").is_err());
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{ActionError, PlayerId, PLAYER_COUNT};

/// Ordered named string parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionParams(SmallVec<[(String, String); 4]>);

impl ActionParams {
    /// Empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a parameter, replacing an existing value in place.
    pub fn insert(&mut self, name: &str, value: impl ToString) {
        let value = value.to_string();
        if let Some(slot) = self.0.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value;
        } else {
            self.0.push((name.to_string(), value));
        }
    }

    /// Raw value of a parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Raw value of a required parameter.
    pub fn require(&self, action: &str, name: &str) -> Result<&str, ActionError> {
        self.get(name).ok_or_else(|| ActionError::MissingParam {
            action: action.to_string(),
            param: name.to_string(),
        })
    }

    /// Parse a required parameter.
    pub fn parse<T: FromStr>(&self, action: &str, name: &str) -> Result<T, ActionError> {
        let raw = self.require(action, name)?;
        parse_value(action, name, raw)
    }

    /// Parse an optional parameter, falling back to `default` when absent.
    pub fn parse_or<T: FromStr>(&self, action: &str, name: &str, default: T) -> Result<T, ActionError> {
        match self.get(name) {
            Some(raw) => parse_value(action, name, raw),
            None => Ok(default),
        }
    }

    /// Parse a required player index, rejecting seats that do not exist.
    pub fn player(&self, action: &str, name: &str) -> Result<PlayerId, ActionError> {
        let raw = self.require(action, name)?;
        let player: PlayerId = parse_value(action, name, raw)?;
        if player.index() >= PLAYER_COUNT {
            return Err(invalid(action, name, raw));
        }
        Ok(player)
    }

    /// Parse an index list written as `[1, 2, 3]`.
    pub fn indices(&self, action: &str, name: &str) -> Result<SmallVec<[usize; 4]>, ActionError> {
        let raw = self.require(action, name)?;
        let trimmed = raw.trim();
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(|| invalid(action, name, raw))?;
        inner
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| parse_value(action, name, s))
            .collect()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for ActionParams {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// Format an index list the way [`ActionParams::indices`] reads it.
#[must_use]
pub fn format_indices(indices: &[usize]) -> String {
    let joined: Vec<String> = indices.iter().map(ToString::to_string).collect();
    format!("[{}]", joined.join(", "))
}

fn parse_value<T: FromStr>(action: &str, name: &str, raw: &str) -> Result<T, ActionError> {
    raw.trim().parse::<T>().map_err(|_| invalid(action, name, raw))
}

fn invalid(action: &str, name: &str, raw: &str) -> ActionError {
    ActionError::InvalidParam {
        action: action.to_string(),
        param: name.to_string(),
        value: raw.to_string(),
    }
}
