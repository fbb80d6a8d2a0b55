//! Document, chunk, and retrieval result types shared by ingestion and
//! retrieval.

use serde::{Deserialize, Serialize};

/// A dense embedding vector, dimensionality fixed by the embedder in use.
pub type Embedding = Vec<f32>;

/// Provenance and positional metadata carried by every persisted chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Name of the originating file as supplied at upload time.
    pub filename: String,
    /// 1-based page number within `filename`.
    pub page_number: usize,
    /// 0-based position within the whole document (across all files).
    pub chunk_index: usize,
    /// Character offset of this chunk's start within its page text, if
    /// tracked.
    pub char_start: Option<usize>,
    /// Character offset of this chunk's end within its page text, if
    /// tracked.
    pub char_end: Option<usize>,
}

/// A bounded, non-empty span of document text plus its embedding and
/// provenance.
///
/// Invariant: `text.trim()` is never empty; empty chunks must never be
/// constructed or persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique within the owning namespace.
    pub chunk_id: String,
    pub text: String,
    pub embedding: Embedding,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    #[must_use]
    pub fn non_whitespace_len(&self) -> usize {
        self.text.chars().filter(|c| !c.is_whitespace()).count()
    }
}

/// A chunk surfaced by retrieval, carrying its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk: Chunk,
    /// Cosine similarity to the query embedding, in `[-1, 1]`.
    pub similarity: f32,
}

/// The manifest returned after a successful ingestion, and the summary
/// `list_documents` recovers from the vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentManifest {
    pub document_id: String,
    pub filenames: Vec<String>,
    pub page_count_total: usize,
    pub chunk_count: usize,
}

/// One row of `GET /documents/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub document_id: String,
    pub filename: String,
    pub vector_count: usize,
}
