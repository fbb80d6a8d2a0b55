//! In-process, namespace-partitioned vector store.
//!
//! Each namespace keeps a flat `Vec<Chunk>`; search is a linear cosine-
//! similarity scan. Namespaces in this server are bounded by one
//! document's chunk count (hard-capped by `MAX_PAGES_TOTAL` upstream), so
//! an approximate index is unnecessary overhead here — the structure
//! (per-namespace entry list behind a single lock, content-hash dedup
//! check) otherwise mirrors a single-tenant HNSW index generalized across
//! namespaces.

use std::collections::HashMap;

use async_trait::async_trait;
use ordered_float::OrderedFloat;
use parking_lot::RwLock;

use crate::dedup::content_hash;
use crate::error::{CoreError, Result};
use crate::types::Chunk;

use super::{VectorEntry, VectorMatch, VectorStore};

#[derive(Default)]
struct NamespaceState {
    chunks: Vec<Chunk>,
    content_hashes: std::collections::HashSet<u64>,
}

/// Thread-safe, in-memory implementation of [`VectorStore`].
#[derive(Default)]
pub struct InMemoryVectorStore {
    namespaces: RwLock<HashMap<String, NamespaceState>>,
}

impl InMemoryVectorStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, namespace: &str, chunks: Vec<Chunk>) -> Result<()> {
        if chunks.iter().any(|c| c.text.trim().is_empty()) {
            return Err(CoreError::Internal(
                "refusing to upsert an empty chunk".into(),
            ));
        }
        let mut namespaces = self.namespaces.write();
        let state = namespaces.entry(namespace.to_string()).or_default();
        for chunk in chunks {
            let hash = content_hash(&chunk.text);
            if state.content_hashes.insert(hash) {
                state.chunks.push(chunk);
            }
        }
        Ok(())
    }

    async fn search(
        &self,
        namespace: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<VectorMatch>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let namespaces = self.namespaces.read();
        let Some(state) = namespaces.get(namespace) else {
            return Ok(Vec::new());
        };
        let mut scored: Vec<VectorMatch> = state
            .chunks
            .iter()
            .map(|chunk| VectorMatch {
                chunk: chunk.clone(),
                similarity: cosine_similarity(&chunk.embedding, query_embedding),
            })
            .collect();
        scored.sort_by(|a, b| {
            OrderedFloat(b.similarity)
                .cmp(&OrderedFloat(a.similarity))
                .then_with(|| a.chunk.metadata.chunk_index.cmp(&b.chunk.metadata.chunk_index))
        });
        scored.truncate(limit);
        Ok(scored)
    }

    async fn namespaces(&self) -> Result<Vec<String>> {
        Ok(self.namespaces.read().keys().cloned().collect())
    }

    async fn entries(&self, namespace: &str) -> Result<Vec<VectorEntry>> {
        let namespaces = self.namespaces.read();
        Ok(namespaces
            .get(namespace)
            .map(|state| {
                state
                    .chunks
                    .iter()
                    .cloned()
                    .map(|chunk| VectorEntry { chunk })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn len(&self, namespace: &str) -> Result<usize> {
        Ok(self
            .namespaces
            .read()
            .get(namespace)
            .map_or(0, |state| state.chunks.len()))
    }

    async fn delete_namespace(&self, namespace: &str) -> Result<()> {
        self.namespaces.write().remove(namespace);
        Ok(())
    }
}
