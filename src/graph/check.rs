//! Offline integrity report for authored graphs.
//!
//! Turns never repair bad data; this is what the `check` command runs so authors
//! find broken references before players do.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::Result;
use crate::graph::{DialogueGraph, GraphStore, ENTRY_NODE_ID};

/// Data-quality problems found in one graph
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct GraphReport {
    pub character: String,
    pub node_count: usize,
    pub duplicate_ids: Vec<String>,
    pub missing_entry: bool,
    /// `(source node, missing target)` pairs.
    pub dangling_intents: Vec<(String, String)>,
}

impl GraphReport {
    pub fn is_clean(&self) -> bool {
        self.duplicate_ids.is_empty() && !self.missing_entry && self.dangling_intents.is_empty()
    }
}

pub fn check_graph(graph: &DialogueGraph) -> GraphReport {
    let mut seen = HashSet::new();
    let mut duplicate_ids = Vec::new();
    for node in &graph.nodes {
        if !seen.insert(node.id.as_str()) && !duplicate_ids.contains(&node.id) {
            duplicate_ids.push(node.id.clone());
        }
    }

    let mut dangling_intents = Vec::new();
    for node in &graph.nodes {
        for intent in &node.intents {
            if !seen.contains(intent.target_node_id.as_str()) {
                dangling_intents.push((node.id.clone(), intent.target_node_id.clone()));
            }
        }
    }

    GraphReport {
        character: graph.character.clone(),
        node_count: graph.nodes.len(),
        duplicate_ids,
        missing_entry: !seen.contains(ENTRY_NODE_ID),
        dangling_intents,
    }
}

/// Everything found for one character
#[derive(Debug)]
pub struct CharacterCheck {
    pub character: String,
    /// Err when the graph document could not be read or parsed.
    pub graph: Result<GraphReport>,
    pub persona: Result<()>,
}

impl CharacterCheck {
    pub fn is_clean(&self) -> bool {
        self.persona.is_ok() && matches!(&self.graph, Ok(report) if report.is_clean())
    }
}

/// Check each character's graph and persona, carrying on past unreadable files
pub async fn check_characters(store: &GraphStore, characters: &[String]) -> Vec<CharacterCheck> {
    let mut checks = Vec::with_capacity(characters.len());
    for character in characters {
        let graph = store
            .load_graph(character)
            .await
            .map(|graph| check_graph(&graph));
        let persona = store.load_persona(character).await.map(|_| ());
        checks.push(CharacterCheck {
            character: character.clone(),
            graph,
            persona,
        });
    }
    checks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DialogueError;
    use crate::graph::node;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_shipped_data_is_clean() {
        let data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        let store = GraphStore::new(data_dir, vec!["1".to_string(), "2".to_string()], "1");
        for character in ["1", "2"] {
            let graph = store.load_graph(character).await.unwrap();
            let report = check_graph(&graph);
            assert!(report.is_clean(), "character {}: {:?}", character, report);
            assert!(store.load_persona(character).await.is_ok());
        }
    }

    #[test]
    fn test_clean_graph() {
        let graph = DialogueGraph::new(
            "1",
            vec![node("initial", "Start", false, &["greet"]), node("greet", "Greeting", false, &[])],
        );
        let report = check_graph(&graph);
        assert!(report.is_clean());
        assert_eq!(report.node_count, 2);
    }

    #[test]
    fn test_reports_problems() {
        let graph = DialogueGraph::new(
            "2",
            vec![
                node("greet", "Greeting", false, &["ghost"]),
                node("greet", "Greeting again", false, &[]),
                node("greet", "Third", false, &[]),
            ],
        );
        let report = check_graph(&graph);
        assert!(!report.is_clean());
        assert_eq!(report.duplicate_ids, vec!["greet"]);
        assert!(report.missing_entry);
        assert_eq!(
            report.dangling_intents,
            vec![("greet".to_string(), "ghost".to_string())]
        );
    }

    #[tokio::test]
    async fn test_check_continues_past_broken_graph() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("conversation1.json"), "[{\"id\": ").unwrap();
        fs::write(
            temp_dir.path().join("conversation2.json"),
            r#"[{"id": "initial", "content": "Move along.", "intents": [], "global": false, "action": "Opening"}]"#,
        )
        .unwrap();
        fs::write(temp_dir.path().join("persona1.txt"), "An innkeeper.").unwrap();
        fs::write(temp_dir.path().join("persona2.txt"), "A guard.").unwrap();

        let characters = vec!["1".to_string(), "2".to_string(), "3".to_string()];
        let store = GraphStore::new(temp_dir.path(), characters.clone(), "1")
            .with_strict_character_keys(true);
        let checks = check_characters(&store, &characters).await;

        assert_eq!(checks.len(), 3);
        assert!(matches!(checks[0].graph, Err(DialogueError::GraphLoad(_))));
        assert!(checks[0].persona.is_ok());
        assert!(!checks[0].is_clean());

        assert_eq!(checks[1].character, "2");
        assert!(checks[1].is_clean(), "{:?}", checks[1]);

        // Listed but never authored
        assert!(checks[2].graph.is_err());
        assert!(checks[2].persona.is_err());
    }
}
