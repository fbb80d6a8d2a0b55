//! Namespace-partitioned vector storage.

mod memory;

pub use memory::InMemoryVectorStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Chunk;

/// A single stored vector entry returned by [`VectorStore::entries`].
#[derive(Debug, Clone, PartialEq)]
pub struct VectorEntry {
    pub chunk: Chunk,
}

/// A scored match returned by [`VectorStore::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub chunk: Chunk,
    pub similarity: f32,
}

/// Namespaced vector storage: every operation is scoped to one
/// `namespace` (equal to a `document_id`), and no method ever reads or
/// writes across namespaces.
///
/// This generalizes a single-tenant vector index by threading a namespace
/// through every method, so one process can serve many documents' chunks
/// from one shared store without cross-document leakage.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Inserts or replaces `chunks` in `namespace`. Implementations must
    /// either insert every chunk or none (callers rely on this for
    /// ingestion atomicity).
    async fn upsert(&self, namespace: &str, chunks: Vec<Chunk>) -> Result<()>;

    /// Returns the `limit` closest entries to `query_embedding` in
    /// `namespace` by cosine similarity, sorted by non-increasing
    /// similarity with `chunk_index` as a deterministic tie-break.
    async fn search(
        &self,
        namespace: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<VectorMatch>>;

    /// Lists every namespace currently holding at least one chunk.
    async fn namespaces(&self) -> Result<Vec<String>>;

    /// Returns every chunk stored in `namespace`, in insertion order.
    async fn entries(&self, namespace: &str) -> Result<Vec<VectorEntry>>;

    /// Number of chunks stored in `namespace`.
    async fn len(&self, namespace: &str) -> Result<usize>;

    /// Deletes an entire namespace and everything in it. Deleting a
    /// namespace that does not exist is not an error.
    async fn delete_namespace(&self, namespace: &str) -> Result<()>;
}
