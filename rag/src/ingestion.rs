//! Ingestion: extract -> chunk -> embed -> upsert into a fresh namespace.

use std::sync::Arc;
use std::time::Duration;

use studyforge_core::{CoreError, EmbeddingModel, Result};
use tracing::{info, warn};
use uuid::Uuid;

use crate::chunking::{chunk_pages, PageText};
use crate::config::RagConfig;
use crate::store::VectorStore;
use crate::types::{Chunk, ChunkMetadata, DocumentManifest, DocumentSummary};

/// One uploaded file, already extracted into per-page text.
pub struct IngestFile {
    pub filename: String,
    pub pages: Vec<String>,
}

/// Embedding calls are batched to bound how much outstanding upstream
/// work a single ingestion request can create.
const EMBED_BATCH_SIZE: usize = 96;

/// Enforced deadline for any single upstream call made during ingestion.
const UPSTREAM_TIMEOUT: Duration = Duration::from_millis(30_000);

pub struct IngestionService {
    embedder: Arc<dyn EmbeddingModel>,
    store: Arc<dyn VectorStore>,
    config: RagConfig,
}

impl IngestionService {
    #[must_use]
    pub fn new(embedder: Arc<dyn EmbeddingModel>, store: Arc<dyn VectorStore>, config: RagConfig) -> Self {
        Self {
            embedder,
            store,
            config,
        }
    }

    /// Extracts, chunks, embeds, and upserts `files` under a freshly
    /// minted `document_id`. On any embedder or vector-store failure the
    /// namespace is deleted rather than left half-indexed.
    pub async fn ingest(&self, files: Vec<IngestFile>) -> Result<DocumentManifest> {
        if files.is_empty() {
            return Err(CoreError::BadInput("no files supplied".into()));
        }

        let page_count_total: usize = files.iter().map(|f| f.pages.len()).sum();
        if page_count_total > self.config.max_pages_total {
            return Err(CoreError::BadInput(format!(
                "document has {page_count_total} pages, maximum is {}",
                self.config.max_pages_total
            )));
        }

        let total_non_whitespace: usize = files
            .iter()
            .flat_map(|f| f.pages.iter())
            .map(|p| p.chars().filter(|c| !c.is_whitespace()).count())
            .sum();
        if total_non_whitespace < 10 {
            return Err(CoreError::BadInput(
                "document contains fewer than 10 non-whitespace characters".into(),
            ));
        }

        // Each file's pages keep their own filename + 1-based page_number in
        // metadata. A literal separator line is also prepended to the first
        // page of every file but the first, so the concatenated text itself
        // marks where one upload ends and the next begins.
        let mut page_texts = Vec::new();
        for (file_index, file) in files.iter().enumerate() {
            for (i, text) in file.pages.iter().enumerate() {
                let text = if file_index > 0 && i == 0 {
                    format!("\n\n--- {} ---\n\n{text}", file.filename)
                } else {
                    text.clone()
                };
                page_texts.push(PageText {
                    filename: file.filename.clone(),
                    page_number: i + 1,
                    text,
                });
            }
        }

        let raw_chunks = chunk_pages(
            &page_texts,
            self.config.chunk_size,
            self.config.chunk_overlap,
            self.config.min_chunk_chars,
        );

        if raw_chunks.is_empty() {
            return Err(CoreError::BadInput(
                "document produced no usable text chunks".into(),
            ));
        }

        let document_id = Uuid::new_v4().to_string();
        let texts: Vec<String> = raw_chunks.iter().map(|c| c.text.clone()).collect();

        let embeddings = match self.embed_all(&texts).await {
            Ok(embeddings) => embeddings,
            Err(err) => {
                warn!(document_id, error = %err, "embedding failed during ingestion, discarding namespace");
                let _ = self.store.delete_namespace(&document_id).await;
                return Err(err);
            }
        };

        let chunks: Vec<Chunk> = raw_chunks
            .into_iter()
            .zip(embeddings)
            .map(|(raw, embedding)| Chunk {
                chunk_id: format!("{document_id}#chunk_{}", raw.chunk_index),
                text: raw.text,
                embedding,
                metadata: ChunkMetadata {
                    filename: raw.filename,
                    page_number: raw.page_number,
                    chunk_index: raw.chunk_index,
                    char_start: Some(raw.char_start),
                    char_end: Some(raw.char_end),
                },
            })
            .collect();
        let chunk_count = chunks.len();

        if let Err(err) = self.store.upsert(&document_id, chunks).await {
            warn!(document_id, error = %err, "vector store upsert failed, discarding namespace");
            let _ = self.store.delete_namespace(&document_id).await;
            return Err(err);
        }

        info!(document_id, chunk_count, page_count_total, "ingestion complete");

        Ok(DocumentManifest {
            document_id,
            filenames: files.into_iter().map(|f| f.filename).collect(),
            page_count_total,
            chunk_count,
        })
    }

    async fn embed_all(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBED_BATCH_SIZE) {
            let embedded = tokio::time::timeout(UPSTREAM_TIMEOUT, self.embedder.embed_batch(batch))
                .await
                .map_err(|_| CoreError::UpstreamTimeout("embedder".into()))??;
            out.extend(embedded);
        }
        Ok(out)
    }

    /// Reads every namespace in the store and returns one summary row per
    /// namespace, recovering the display filename from any one of its
    /// stored chunks.
    pub async fn list_documents(&self) -> Result<Vec<DocumentSummary>> {
        let mut summaries = Vec::new();
        for namespace in self.store.namespaces().await? {
            let entries = self.store.entries(&namespace).await?;
            let Some(first) = entries.first() else {
                continue;
            };
            summaries.push(DocumentSummary {
                document_id: namespace,
                filename: first.chunk.metadata.filename.clone(),
                vector_count: entries.len(),
            });
        }
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryVectorStore;
    use async_trait::async_trait;

    struct FixedEmbedder;

    #[async_trait]
    impl EmbeddingModel for FixedEmbedder {
        fn dim(&self) -> usize {
            4
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let len = text.len() as f32;
            Ok(vec![len, 0.0, 0.0, 0.0])
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingModel for FailingEmbedder {
        fn dim(&self) -> usize {
            4
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(CoreError::Upstream(anyhow::anyhow!("embedder unavailable")))
        }
    }

    fn service(embedder: Arc<dyn EmbeddingModel>, store: Arc<dyn VectorStore>) -> IngestionService {
        IngestionService::new(embedder, store, RagConfig::default())
    }

    #[tokio::test]
    async fn ingest_rejects_empty_document() {
        let svc = service(Arc::new(FixedEmbedder), Arc::new(InMemoryVectorStore::new()));
        let err = svc
            .ingest(vec![IngestFile {
                filename: "empty.pdf".into(),
                pages: vec!["   ".into()],
            }])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::BadInput(_)));
    }

    #[tokio::test]
    async fn ingest_rejects_too_many_pages() {
        let svc = service(Arc::new(FixedEmbedder), Arc::new(InMemoryVectorStore::new()));
        let pages = vec!["some reasonable page content here.".to_string(); 301];
        let err = svc
            .ingest(vec![IngestFile {
                filename: "big.pdf".into(),
                pages,
            }])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::BadInput(_)));
    }

    #[tokio::test]
    async fn ingest_succeeds_and_returns_manifest() {
        let store = Arc::new(InMemoryVectorStore::new());
        let svc = service(Arc::new(FixedEmbedder), store.clone());
        let manifest = svc
            .ingest(vec![IngestFile {
                filename: "doc.pdf".into(),
                pages: vec!["Photosynthesis converts light energy into chemical energy.".into()],
            }])
            .await
            .unwrap();
        assert_eq!(manifest.filenames, vec!["doc.pdf".to_string()]);
        assert_eq!(manifest.chunk_count, 1);
        assert_eq!(store.len(&manifest.document_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn ingest_inserts_a_literal_separator_between_multiple_files() {
        let store = Arc::new(InMemoryVectorStore::new());
        let svc = service(Arc::new(FixedEmbedder), store.clone());
        let manifest = svc
            .ingest(vec![
                IngestFile {
                    filename: "first.pdf".into(),
                    pages: vec!["Photosynthesis converts light energy into chemical energy.".into()],
                },
                IngestFile {
                    filename: "second.pdf".into(),
                    pages: vec!["Mitochondria are the powerhouse of the cell.".into()],
                },
            ])
            .await
            .unwrap();
        assert_eq!(manifest.filenames, vec!["first.pdf".to_string(), "second.pdf".to_string()]);
        let entries = store.entries(&manifest.document_id).await.unwrap();
        let second_chunk = entries
            .iter()
            .find(|e| e.chunk.metadata.filename == "second.pdf")
            .expect("second file produced a chunk");
        assert!(second_chunk.chunk.text.contains("--- second.pdf ---"));
    }

    #[tokio::test]
    async fn ingest_cleans_up_namespace_on_embedder_failure() {
        let store = Arc::new(InMemoryVectorStore::new());
        let svc = service(Arc::new(FailingEmbedder), store.clone());
        let result = svc
            .ingest(vec![IngestFile {
                filename: "doc.pdf".into(),
                pages: vec!["Enough non-whitespace content to pass the floor check.".into()],
            }])
            .await;
        assert!(result.is_err());
        assert!(store.namespaces().await.unwrap().is_empty());
    }
}
