//! Document cache
//!
//! Fetched documents (with tab content) are cached per document ID with a
//! TTL, so repeated tab reads against the same document avoid refetching.
//! Edits invalidate the entry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::google::types::Document;

/// Time to live for cached documents
const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

struct CacheEntry {
    document: Arc<Document>,
    fetched_at: Instant,
}

/// TTL cache of fetched documents keyed by document ID
pub struct DocumentCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl Default for DocumentCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl DocumentCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Get a cached document if present and not expired
    pub async fn get(&self, document_id: &str) -> Option<Arc<Document>> {
        let entries = self.entries.read().await;
        let entry = entries.get(document_id)?;
        if entry.fetched_at.elapsed() < self.ttl {
            Some(Arc::clone(&entry.document))
        } else {
            None
        }
    }

    /// Store a freshly fetched document
    pub async fn insert(&self, document_id: &str, document: Document) -> Arc<Document> {
        let document = Arc::new(document);
        let mut entries = self.entries.write().await;
        entries.insert(
            document_id.to_string(),
            CacheEntry {
                document: Arc::clone(&document),
                fetched_at: Instant::now(),
            },
        );
        tracing::debug!("Cached document {}", document_id);
        document
    }

    /// Drop the entry for a document, forcing a refetch on next read
    pub async fn invalidate(&self, document_id: &str) {
        let mut entries = self.entries.write().await;
        if entries.remove(document_id).is_some() {
            tracing::debug!("Invalidated cache for document {}", document_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str) -> Document {
        Document {
            document_id: id.to_string(),
            title: "Test".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_cache_hit_within_ttl() {
        let cache = DocumentCache::default();
        cache.insert("doc1", doc("doc1")).await;
        let cached = cache.get("doc1").await;
        assert!(cached.is_some());
        assert_eq!(cached.unwrap().document_id, "doc1");
    }

    #[tokio::test]
    async fn test_cache_miss_for_unknown_document() {
        let cache = DocumentCache::default();
        assert!(cache.get("doc1").await.is_none());
    }

    #[tokio::test]
    async fn test_cache_expires_after_ttl() {
        let cache = DocumentCache::new(Duration::from_millis(10));
        cache.insert("doc1", doc("doc1")).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.get("doc1").await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let cache = DocumentCache::default();
        cache.insert("doc1", doc("doc1")).await;
        cache.invalidate("doc1").await;
        assert!(cache.get("doc1").await.is_none());
    }
}
