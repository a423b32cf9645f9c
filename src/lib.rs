pub mod config;
pub mod error;
pub mod cache;
pub mod graph;
pub mod classifier;
pub mod dialogue;
pub mod http;

pub use config::Config;
pub use error::{DialogueError, Result};
pub use dialogue::{DialogueEngine, TurnOutcome, TurnReply, TurnRequest};
pub use graph::{CandidateNode, DialogueGraph, DialogueIntent, DialogueNode, GraphStore};
