//! Candidate set construction: local intents plus global nodes.

use std::collections::HashSet;

use crate::graph::{CandidateNode, DialogueGraph, DialogueNode};
use crate::{DialogueError, Result};

/// Nodes offered to the classifier for one turn.
///
/// The verdict is matched against this exact set, so a node only counts as
/// reachable if it was offered.
#[derive(Debug, Clone)]
pub struct CandidateSet {
    nodes: Vec<DialogueNode>,
}

impl CandidateSet {
    /// Union of `current`'s intent targets and every global node, deduplicated
    /// by id and resolved against `graph`.
    ///
    /// Targets that do not resolve are dropped with a warning.
    pub fn build(graph: &DialogueGraph, current: &DialogueNode) -> Result<Self> {
        let mut ids: HashSet<&str> = current
            .intents
            .iter()
            .map(|intent| intent.target_node_id.as_str())
            .collect();
        ids.extend(graph.find_global_nodes().into_iter().map(|node| node.id.as_str()));

        let nodes: Vec<DialogueNode> = graph.find_nodes(&ids).into_iter().cloned().collect();

        if nodes.len() < ids.len() {
            let resolved: HashSet<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
            let dangling: Vec<&str> = ids.difference(&resolved).copied().collect();
            log::warn!(
                "Node '{}' of character '{}' targets unknown nodes: {:?}",
                current.id,
                graph.character,
                dangling
            );
        }

        if nodes.is_empty() {
            return Err(DialogueError::NoCandidates(current.id.clone()));
        }

        Ok(Self { nodes })
    }

    /// Payload sent to the classifier.
    pub fn minimal(&self) -> Vec<CandidateNode> {
        self.nodes.iter().map(CandidateNode::from).collect()
    }

    /// Take the offered node with this id.
    pub fn take(self, node_id: &str) -> Option<DialogueNode> {
        self.nodes.into_iter().find(|node| node.id == node_id)
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.nodes.iter().any(|node| node.id == node_id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|node| node.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
