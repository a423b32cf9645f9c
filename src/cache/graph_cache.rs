use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use crate::graph::DialogueGraph;

/// Thread-safe LRU cache of loaded dialogue graphs, keyed by character
///
/// Opt-in: without it every lookup re-reads the backing document. With it,
/// edits to a document are only seen after `invalidate` or `clear`.
pub struct GraphCache {
    cache: Mutex<LruCache<String, Arc<DialogueGraph>>>,
}

impl GraphCache {
    /// Create a new graph cache holding up to `capacity` characters
    ///
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);

        Self {
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    pub fn get(&self, character: &str) -> Option<Arc<DialogueGraph>> {
        self.cache.lock().unwrap().get(character).cloned()
    }

    pub fn put(&self, character: String, graph: Arc<DialogueGraph>) {
        self.cache.lock().unwrap().put(character, graph);
    }

    /// Drop one character's graph so the next load re-reads its document
    pub fn invalidate(&self, character: &str) -> bool {
        self.cache.lock().unwrap().pop(character).is_some()
    }

    pub fn len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().unwrap().is_empty()
    }

    pub fn clear(&self) {
        self.cache.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(character: &str) -> Arc<DialogueGraph> {
        Arc::new(DialogueGraph::new(character, Vec::new()))
    }

    #[test]
    fn test_cache_put_and_get() {
        let cache = GraphCache::new(2);
        cache.put("1".to_string(), graph("1"));
        assert_eq!(cache.get("1").unwrap().character, "1");
        assert!(cache.get("2").is_none());
    }

    #[test]
    fn test_cache_eviction() {
        let cache = GraphCache::new(2);
        cache.put("1".to_string(), graph("1"));
        cache.put("2".to_string(), graph("2"));
        cache.put("3".to_string(), graph("3"));

        assert!(cache.get("1").is_none());
        assert!(cache.get("2").is_some());
        assert!(cache.get("3").is_some());
    }

    #[test]
    fn test_invalidate() {
        let cache = GraphCache::new(2);
        cache.put("1".to_string(), graph("1"));
        assert!(cache.invalidate("1"));
        assert!(!cache.invalidate("1"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = GraphCache::new(4);
        cache.put("1".to_string(), graph("1"));
        cache.put("2".to_string(), graph("2"));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let cache = GraphCache::new(0);
        cache.put("1".to_string(), graph("1"));
        cache.put("2".to_string(), graph("2"));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("2").is_some());
    }
}
