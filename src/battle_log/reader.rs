//! Battle log reader and replay driver.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use log::debug;

use super::LogLine;
use crate::actions::ActionDescriptor;
use crate::board::{BattleSetup, BoardState};
use crate::cards::CardId;
use crate::core::LogError;
use crate::engine::ActionEngine;

/// A parsed battle log.
///
/// The whole log is read up front: the header is needed to build the engine
/// before any record can be replayed.
#[derive(Clone, Debug)]
pub struct BattleDeserializer {
    setup: BattleSetup,
    actions: Vec<ActionDescriptor>,
    checkpoints: Vec<(u32, u64)>,
}

impl BattleDeserializer {
    /// Read a log file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read a log from any line source. Blank lines are ignored.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, LogError> {
        let mut setup = None;
        let mut actions = Vec::new();
        let mut checkpoints = Vec::new();

        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match (serde_json::from_str::<LogLine>(&line)?, setup.is_some()) {
                (LogLine::Header(header), false) => setup = Some(header),
                (LogLine::Header(_), true) => {
                    return Err(LogError::Format(format!("second header on line {}", number + 1)));
                }
                (_, false) => {
                    return Err(LogError::Format(format!("line {} precedes the header", number + 1)));
                }
                (LogLine::Action { action_type, params }, true) => {
                    actions.push(ActionDescriptor::new(action_type, params));
                }
                (LogLine::Checkpoint { turn, digest }, true) => checkpoints.push((turn, digest)),
            }
        }

        let setup = setup.ok_or_else(|| LogError::Format("log has no header".into()))?;
        Ok(Self {
            setup,
            actions,
            checkpoints,
        })
    }

    #[must_use]
    pub fn setup(&self) -> &BattleSetup {
        &self.setup
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.setup.seed
    }

    #[must_use]
    pub fn top_deck(&self) -> &[CardId] {
        &self.setup.top_deck
    }

    #[must_use]
    pub fn bot_deck(&self) -> &[CardId] {
        &self.setup.bot_deck
    }

    #[must_use]
    pub fn top_health(&self) -> i32 {
        self.setup.top_health
    }

    #[must_use]
    pub fn bot_health(&self) -> i32 {
        self.setup.bot_health
    }

    /// Recorded actions, in log order.
    #[must_use]
    pub fn actions(&self) -> &[ActionDescriptor] {
        &self.actions
    }

    /// Recorded `(turn, digest)` checkpoints, in log order.
    #[must_use]
    pub fn checkpoints(&self) -> &[(u32, u64)] {
        &self.checkpoints
    }

    /// Enqueue every recorded action on `engine`, in order.
    ///
    /// The engine should be fresh and built from [`setup`](Self::setup).
    /// Drive it until idle to reproduce the battle.
    pub fn replay_actions(&self, engine: &mut ActionEngine) -> Result<(), LogError> {
        for action in &self.actions {
            engine.add_game_action(&action.name, action.params.clone())?;
        }
        debug!("Replaying {} recorded actions (seed {})", self.actions.len(), self.seed());
        Ok(())
    }

    /// Compare `board` against the last recorded checkpoint.
    ///
    /// A log without checkpoints verifies trivially.
    pub fn verify_final_state(&self, board: &BoardState) -> Result<(), LogError> {
        let Some(&(turn, expected)) = self.checkpoints.last() else {
            return Ok(());
        };
        let actual = board.digest()?;
        if actual == expected {
            Ok(())
        } else {
            Err(LogError::ReplayDivergence { expected, actual, turn })
        }
    }
}

impl FromStr for BattleDeserializer {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_reader(s.as_bytes())
    }
}
