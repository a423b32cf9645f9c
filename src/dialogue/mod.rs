//! Turn orchestration: one player message in, one NPC node out.

mod engine;

pub use engine::{DialogueEngine, TurnOutcome, TurnReply, TurnRequest};
