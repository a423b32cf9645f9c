//! Dialogue graph module: data model, document store, reachability, integrity checks.
//!
//! A character's graph is a flat list of nodes; edges are the `intents` each
//! node carries. Graphs are read-only once loaded.

pub mod check;
pub mod reachability;
pub mod store;

pub use check::{check_characters, check_graph, CharacterCheck, GraphReport};
pub use reachability::CandidateSet;
pub use store::GraphStore;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Id of the node every conversation starts from.
pub const ENTRY_NODE_ID: &str = "initial";

/// A player-triggered edge from one node to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueIntent {
    /// Example of what the player might say to take this edge.
    pub content: String,
    #[serde(rename = "targetNodeId")]
    pub target_node_id: String,
}

/// One authored NPC line plus its outgoing choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueNode {
    pub id: String,
    /// NPC-facing response text.
    pub content: String,
    #[serde(default)]
    pub intents: Vec<DialogueIntent>,
    /// Reachable from any node, not only through explicit intents.
    #[serde(default)]
    pub global: bool,
    /// Short label shown to the classifier instead of `content`.
    #[serde(default)]
    pub action: String,
}

/// Minimal `{id, action}` projection of a node sent to the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateNode {
    pub id: String,
    pub action: String,
}

impl From<&DialogueNode> for CandidateNode {
    fn from(node: &DialogueNode) -> Self {
        Self {
            id: node.id.clone(),
            action: node.action.clone(),
        }
    }
}

/// All nodes authored for one character.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueGraph {
    /// Resolved character key this graph was loaded for.
    pub character: String,
    pub nodes: Vec<DialogueNode>,
}

impl DialogueGraph {
    pub fn new(character: impl Into<String>, nodes: Vec<DialogueNode>) -> Self {
        Self {
            character: character.into(),
            nodes,
        }
    }

    /// Exact-match lookup by id.
    pub fn find_node(&self, node_id: &str) -> Option<&DialogueNode> {
        self.nodes.iter().find(|node| node.id == node_id)
    }

    /// Nodes whose id is in `node_ids`, in graph order.
    pub fn find_nodes(&self, node_ids: &HashSet<&str>) -> Vec<&DialogueNode> {
        self.nodes
            .iter()
            .filter(|node| node_ids.contains(node.id.as_str()))
            .collect()
    }

    pub fn find_global_nodes(&self) -> Vec<&DialogueNode> {
        self.nodes.iter().filter(|node| node.global).collect()
    }

    /// The `"initial"` node, if the graph has one.
    pub fn find_entry_node(&self) -> Option<&DialogueNode> {
        self.find_node(ENTRY_NODE_ID)
    }
}

#[cfg(test)]
pub(crate) fn node(id: &str, action: &str, global: bool, targets: &[&str]) -> DialogueNode {
    DialogueNode {
        id: id.to_string(),
        content: format!("{} content", id),
        intents: targets
            .iter()
            .map(|target| DialogueIntent {
                content: format!("go to {}", target),
                target_node_id: target.to_string(),
            })
            .collect(),
        global,
        action: action.to_string(),
    }
}
