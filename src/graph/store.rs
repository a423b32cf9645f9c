//! File-backed dialogue document store.
//!
//! Each character key `K` maps to `conversation{K}.json` (the graph) and
//! `persona{K}.txt` (the persona text) inside the data directory. Documents are
//! re-read on every call unless a graph cache is attached.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::GraphCache;
use crate::config::DialogueConfig;
use crate::graph::{DialogueGraph, DialogueNode};
use crate::{DialogueError, Result};

/// Read-only access to per-character dialogue documents
pub struct GraphStore {
    data_dir: PathBuf,
    characters: Vec<String>,
    default_character: String,
    strict_character_keys: bool,
    cache: Option<Arc<GraphCache>>,
}

impl GraphStore {
    /// Create a store over `data_dir` with permissive character keys and no cache
    pub fn new(
        data_dir: impl Into<PathBuf>,
        characters: Vec<String>,
        default_character: impl Into<String>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            characters,
            default_character: default_character.into(),
            strict_character_keys: false,
            cache: None,
        }
    }

    pub fn from_config(config: &DialogueConfig) -> Self {
        let cache = if config.graph_cache_capacity > 0 {
            Some(Arc::new(GraphCache::new(config.graph_cache_capacity)))
        } else {
            None
        };

        Self::new(
            config.data_dir.clone(),
            config.characters.clone(),
            config.default_character.clone(),
        )
        .with_strict_character_keys(config.strict_character_keys)
        .with_cache(cache)
    }

    pub fn with_strict_character_keys(mut self, strict: bool) -> Self {
        self.strict_character_keys = strict;
        self
    }

    pub fn with_cache(mut self, cache: Option<Arc<GraphCache>>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> Option<&Arc<GraphCache>> {
        self.cache.as_ref()
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn characters(&self) -> &[String] {
        &self.characters
    }

    pub fn default_character(&self) -> &str {
        &self.default_character
    }

    /// Map a requested character key to a supported one.
    ///
    /// Unknown keys fall back to the default key, or fail in strict mode.
    pub fn resolve_character(&self, key: &str) -> Result<String> {
        let key = key.trim();
        if self.characters.iter().any(|c| c == key) {
            return Ok(key.to_string());
        }

        if self.strict_character_keys {
            return Err(DialogueError::UnknownCharacter(key.to_string()));
        }

        log::warn!(
            "Unknown character '{}', falling back to '{}'",
            key,
            self.default_character
        );
        Ok(self.default_character.clone())
    }

    /// Load the full dialogue graph for a character
    pub async fn load_graph(&self, character: &str) -> Result<Arc<DialogueGraph>> {
        let character = self.resolve_character(character)?;

        if let Some(cache) = &self.cache {
            if let Some(graph) = cache.get(&character) {
                log::debug!("Graph cache hit for character {}", character);
                return Ok(graph);
            }
        }

        let path = self.graph_path(&character);
        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            DialogueError::GraphLoad(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let nodes: Vec<DialogueNode> = serde_json::from_str(&raw).map_err(|e| {
            DialogueError::GraphLoad(format!("JSON parse error in {}: {}", path.display(), e))
        })?;

        log::debug!(
            "Loaded {} dialogue nodes for character {} from {}",
            nodes.len(),
            character,
            path.display()
        );

        let graph = Arc::new(DialogueGraph::new(character.clone(), nodes));
        if let Some(cache) = &self.cache {
            cache.put(character, Arc::clone(&graph));
        }
        Ok(graph)
    }

    /// Persona text for a character, as authored
    pub async fn load_persona(&self, character: &str) -> Result<String> {
        let character = self.resolve_character(character)?;
        let path = self.persona_path(&character);
        tokio::fs::read_to_string(&path).await.map_err(|e| {
            DialogueError::GraphLoad(format!("Failed to read {}: {}", path.display(), e))
        })
    }

    /// Look up a single node by id
    pub async fn find_node(&self, character: &str, node_id: &str) -> Result<Option<DialogueNode>> {
        let graph = self.load_graph(character).await?;
        Ok(graph.find_node(node_id).cloned())
    }

    /// Entry node of a character's graph
    pub async fn find_entry_node(&self, character: &str) -> Result<Option<DialogueNode>> {
        let graph = self.load_graph(character).await?;
        Ok(graph.find_entry_node().cloned())
    }

    fn graph_path(&self, character: &str) -> PathBuf {
        self.data_dir.join(format!("conversation{}.json", character))
    }

    fn persona_path(&self, character: &str) -> PathBuf {
        self.data_dir.join(format!("persona{}.txt", character))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const GRAPH_ONE: &str = r#"[
        {"id": "initial", "content": "Hello traveller.", "intents": [{"content": "hi", "targetNodeId": "greet"}], "global": false, "action": "Opening"},
        {"id": "greet", "content": "Nice to meet you.", "intents": [], "global": false, "action": "Greeting"}
    ]"#;

    const GRAPH_TWO: &str = r#"[
        {"id": "initial", "content": "What do you want?", "intents": [], "global": false, "action": "Opening"}
    ]"#;

    fn setup_store() -> (GraphStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("conversation1.json"), GRAPH_ONE).unwrap();
        fs::write(temp_dir.path().join("conversation2.json"), GRAPH_TWO).unwrap();
        fs::write(temp_dir.path().join("persona1.txt"), "A friendly innkeeper.").unwrap();
        let store = GraphStore::new(
            temp_dir.path(),
            vec!["1".to_string(), "2".to_string()],
            "1",
        );
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_load_graph_per_character() {
        let (store, _temp) = setup_store();
        let one = store.load_graph("1").await.unwrap();
        let two = store.load_graph("2").await.unwrap();
        assert_eq!(one.nodes.len(), 2);
        assert_eq!(two.nodes.len(), 1);
        assert_eq!(two.character, "2");
    }

    #[tokio::test]
    async fn test_unknown_character_falls_back() {
        let (store, _temp) = setup_store();
        let graph = store.load_graph("42").await.unwrap();
        assert_eq!(graph.character, "1");
        assert_eq!(graph.nodes.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_character_strict() {
        let (store, _temp) = setup_store();
        let store = store.with_strict_character_keys(true);
        let err = store.load_graph("42").await.unwrap_err();
        assert!(matches!(err, DialogueError::UnknownCharacter(ref k) if k == "42"));
    }

    #[tokio::test]
    async fn test_missing_document() {
        let temp_dir = TempDir::new().unwrap();
        let store = GraphStore::new(temp_dir.path(), vec!["1".to_string()], "1");
        let err = store.load_graph("1").await.unwrap_err();
        assert!(matches!(err, DialogueError::GraphLoad(_)));
    }

    #[tokio::test]
    async fn test_malformed_document() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("conversation1.json"), "{ not json").unwrap();
        let store = GraphStore::new(temp_dir.path(), vec!["1".to_string()], "1");
        let err = store.load_graph("1").await.unwrap_err();
        assert!(matches!(err, DialogueError::GraphLoad(ref msg) if msg.contains("JSON parse error")));
    }

    #[tokio::test]
    async fn test_rereads_document_every_call() {
        let (store, temp) = setup_store();
        assert!(store.find_node("1", "farewell").await.unwrap().is_none());

        fs::write(
            temp.path().join("conversation1.json"),
            r#"[{"id": "farewell", "content": "Bye", "intents": [], "global": true, "action": "Leave"}]"#,
        )
        .unwrap();

        assert!(store.find_node("1", "farewell").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_cache_serves_stale_until_invalidated() {
        let (store, temp) = setup_store();
        let cache = Arc::new(GraphCache::new(4));
        let store = store.with_cache(Some(Arc::clone(&cache)));

        assert_eq!(store.load_graph("1").await.unwrap().nodes.len(), 2);
        fs::write(temp.path().join("conversation1.json"), GRAPH_TWO).unwrap();
        assert_eq!(store.load_graph("1").await.unwrap().nodes.len(), 2);

        cache.invalidate("1");
        assert_eq!(store.load_graph("1").await.unwrap().nodes.len(), 1);
    }

    #[tokio::test]
    async fn test_find_entry_node() {
        let (store, _temp) = setup_store();
        let entry = store.find_entry_node("2").await.unwrap().unwrap();
        assert_eq!(entry.content, "What do you want?");
    }

    #[tokio::test]
    async fn test_load_persona() {
        let (store, _temp) = setup_store();
        assert_eq!(store.load_persona("1").await.unwrap(), "A friendly innkeeper.");
        assert!(matches!(
            store.load_persona("2").await,
            Err(DialogueError::GraphLoad(_))
        ));
    }
}
