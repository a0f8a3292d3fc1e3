//! Rule engine: pure legality queries.
//!
//! The action engine consults it before enqueuing a play, the play action
//! re-checks it when it activates, and the action generator uses it to pick
//! moves.

pub mod engine;

pub use engine::RuleEngine;
