//! Hybrid chunking, namespaced vector storage, and the ingestion and
//! retrieval services built on top of them.

pub mod chunking;
pub mod config;
pub mod dedup;
pub mod error;
pub mod ingestion;
pub mod retrieval;
pub mod store;
pub mod types;

pub use config::RagConfig;
pub use ingestion::{IngestFile, IngestionService};
pub use retrieval::RetrievalService;
pub use store::{InMemoryVectorStore, VectorEntry, VectorMatch, VectorStore};
pub use types::{Chunk, ChunkMetadata, DocumentManifest, DocumentSummary, RetrievedChunk};
