use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::classifier::{ClassificationInput, ClassificationRequest, IntentClassifier};
use crate::graph::{CandidateSet, DialogueNode, GraphStore};
use crate::{DialogueError, Result};

/// Resolved node for a turn plus the extended running summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnReply {
    #[serde(flatten)]
    pub node: DialogueNode,
    #[serde(rename = "chatSummary")]
    pub chat_summary: String,
}

/// Caller-supplied state for one turn
#[derive(Debug, Clone, Default)]
pub struct TurnRequest {
    pub message: Option<String>,
    pub node_id: Option<String>,
    pub previous_message: String,
    pub chat_summary: String,
    pub character: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Conversation start: the entry node verbatim, if the graph has one.
    Entry(Option<DialogueNode>),
    Reply(TurnReply),
}

/// Drives dialogue turns against a graph store and an intent classifier
///
/// Holds no per-conversation state; every turn is resolved from its inputs.
pub struct DialogueEngine {
    store: GraphStore,
    classifier: Arc<dyn IntentClassifier>,
}

impl DialogueEngine {
    pub fn new(store: GraphStore, classifier: Arc<dyn IntentClassifier>) -> Self {
        Self { store, classifier }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Entry node of the character's graph
    pub async fn first_node(&self, character: &str) -> Result<Option<DialogueNode>> {
        self.store.find_entry_node(character).await
    }

    /// Run one turn, or return the entry node when message or node id is missing
    pub async fn handle_turn(&self, request: TurnRequest) -> Result<TurnOutcome> {
        let message = request.message.filter(|m| !m.is_empty());
        let node_id = request.node_id.filter(|n| !n.is_empty());

        match (message, node_id) {
            (Some(message), Some(node_id)) => {
                let reply = self
                    .answer_to(
                        &message,
                        &node_id,
                        &request.previous_message,
                        &request.chat_summary,
                        &request.character,
                    )
                    .await?;
                Ok(TurnOutcome::Reply(reply))
            }
            _ => Ok(TurnOutcome::Entry(self.first_node(&request.character).await?)),
        }
    }

    /// Advance the conversation from `node_id` given the player's `message`.
    ///
    /// The verdict must name a node from this turn's candidate set. The returned
    /// node carries the classifier's phrasing in place of its authored content.
    pub async fn answer_to(
        &self,
        message: &str,
        node_id: &str,
        previous_message: &str,
        chat_summary: &str,
        character: &str,
    ) -> Result<TurnReply> {
        let turn_id = Uuid::new_v4();
        let graph = self.store.load_graph(character).await?;

        let current = graph
            .find_node(node_id)
            .ok_or_else(|| DialogueError::UnknownNode(node_id.to_string()))?;

        let candidates = CandidateSet::build(&graph, current)?;
        log::debug!(
            "[{}] character={} node={} candidates={:?}",
            turn_id,
            graph.character,
            node_id,
            candidates.ids()
        );

        let persona = self.store.load_persona(&graph.character).await?;
        let verdict = self
            .classifier
            .classify(ClassificationInput {
                persona,
                chat_summary: chat_summary.to_string(),
                request: ClassificationRequest {
                    previous_phrase: previous_message.to_string(),
                    message: message.to_string(),
                    intents: candidates.minimal(),
                },
            })
            .await?;

        let offered = candidates.ids().join(", ");
        let mut node = candidates.take(&verdict.intent).ok_or_else(|| {
            DialogueError::UnmatchedIntent(format!("{} (offered: {})", verdict.intent, offered))
        })?;

        log::info!("[{}] Transition: {} -> {}", turn_id, node_id, node.id);

        node.content = verdict.message;
        Ok(TurnReply {
            node,
            chat_summary: format!("{}\n{}", chat_summary, verdict.chat_summary),
        })
    }
}
