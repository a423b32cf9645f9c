//! Intent classification: the external LLM that picks the next node.

pub mod mistral;
pub mod prompt;

pub use mistral::{ClassifierSettings, MistralClassifier};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::graph::CandidateNode;
use crate::{DialogueError, Result};

/// One chat message in a classifier request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

impl std::fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.role, self.content)
    }
}

/// The user-turn payload, sent JSON-encoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationRequest {
    #[serde(rename = "previousPhrase")]
    pub previous_phrase: String,
    pub message: String,
    pub intents: Vec<CandidateNode>,
}

/// Everything the classifier sees for one turn.
#[derive(Debug, Clone)]
pub struct ClassificationInput {
    /// Persona text of the resolved character.
    pub persona: String,
    pub chat_summary: String,
    pub request: ClassificationRequest,
}

/// The classifier's decision for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Verdict {
    /// Chosen candidate id. Not checked against the candidates here.
    pub intent: String,
    /// Line the NPC actually delivers.
    pub message: String,
    /// Delta appended to the running summary.
    #[serde(rename = "chatSummary")]
    pub chat_summary: String,
}

impl Verdict {
    /// Decode the classifier's JSON reply
    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content.trim()).map_err(|e| {
            DialogueError::ClassificationFormat(format!("{}: {}", e, content))
        })
    }
}

/// Decision oracle for a turn
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, input: ClassificationInput) -> Result<Verdict>;
}
