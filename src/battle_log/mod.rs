//! Battle log: an append-only record of a battle that replays it exactly.
//!
//! ## Format
//!
//! JSON lines. The first line is the header, a [`BattleSetup`]. Every line
//! after it is either an action record (type name plus its ordered
//! parameters) or a checkpoint carrying the board digest at that point:
//!
//! ```text
//! {"kind":"header","seed":42,"top_deck":[1,2],"bot_deck":[3],"top_health":33,"bot_health":35,"top_resurrection":false,"bot_resurrection":false,"top_armor_recharge":0,"bot_armor_recharge":0}
//! {"kind":"action","action_type":"NextPlayer","params":[]}
//! {"kind":"checkpoint","turn":1,"digest":1234567}
//! {"kind":"action","action_type":"PlayCard","params":[["card_index","0"]]}
//! ```
//!
//! Only actions enqueued from outside the engine are recorded; whatever
//! they chain is re-derived on replay.
//!
//! A battle that starts from a prepared position carries the whole starting
//! board in the header's `start_board` field.

mod reader;
mod writer;

pub use reader::BattleDeserializer;
pub use writer::{BattleSerializer, LogTarget, BATTLE_LOG_EXTENSION};

use serde::{Deserialize, Serialize};

use crate::actions::{ActionDescriptor, ActionParams};
use crate::board::BattleSetup;

/// One line of a battle log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogLine {
    /// Starting state. Always the first line.
    Header(BattleSetup),

    /// An externally enqueued action.
    Action {
        action_type: String,
        params: ActionParams,
    },

    /// Board digest after a checkpoint action's logical phase.
    Checkpoint { turn: u32, digest: u64 },
}

impl LogLine {
    /// Record for an action.
    pub fn action(descriptor: &ActionDescriptor) -> Self {
        Self::Action {
            action_type: descriptor.name.clone(),
            params: descriptor.params.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardId;

    #[test]
    fn test_header_line_is_flat() {
        let setup = BattleSetup::new(42, vec![CardId::new(1)], vec![CardId::new(2)]);
        let json = serde_json::to_string(&LogLine::Header(setup.clone())).unwrap();

        assert!(json.starts_with(r#"{"kind":"header","seed":42"#));
        assert_eq!(serde_json::from_str::<LogLine>(&json).unwrap(), LogLine::Header(setup));
    }

    #[test]
    fn test_action_line_keeps_param_order() {
        let params = ActionParams::new().with("player_index", 1).with("card_index", 0);
        let line = LogLine::action(&ActionDescriptor::new("CardAttack", params));
        let json = serde_json::to_string(&line).unwrap();

        assert_eq!(
            json,
            r#"{"kind":"action","action_type":"CardAttack","params":[["player_index","1"],["card_index","0"]]}"#
        );
    }

    #[test]
    fn test_checkpoint_line() {
        let line: LogLine = serde_json::from_str(r#"{"kind":"checkpoint","turn":3,"digest":99}"#).unwrap();
        assert_eq!(line, LogLine::Checkpoint { turn: 3, digest: 99 });
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!(serde_json::from_str::<LogLine>(r#"{"kind":"comment"}"#).is_err());
    }
}
