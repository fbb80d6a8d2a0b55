//! Retrieval: embed query -> namespaced search -> quality filter -> rank
//! -> token-budgeted context window.

use std::sync::Arc;
use std::time::Duration;

use studyforge_core::{CoreError, EmbeddingModel, Result};
use unicode_segmentation::UnicodeSegmentation;

use crate::config::RagConfig;
use crate::store::VectorStore;
use crate::types::RetrievedChunk;

const UPSTREAM_TIMEOUT: Duration = Duration::from_millis(30_000);

pub struct RetrievalService {
    embedder: Arc<dyn EmbeddingModel>,
    store: Arc<dyn VectorStore>,
    config: RagConfig,
}

impl RetrievalService {
    #[must_use]
    pub fn new(embedder: Arc<dyn EmbeddingModel>, store: Arc<dyn VectorStore>, config: RagConfig) -> Self {
        Self {
            embedder,
            store,
            config,
        }
    }

    /// Embeds `query`, searches `document_id`'s namespace for `2k`
    /// candidates, applies the quality floor, ranks, and returns up to `k`
    /// chunks that fit the context-window token budget.
    pub async fn retrieve(&self, document_id: &str, query: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = tokio::time::timeout(UPSTREAM_TIMEOUT, self.embedder.embed(query))
            .await
            .map_err(|_| CoreError::UpstreamTimeout("embedder".into()))??;

        let matches = self
            .store
            .search(document_id, &query_embedding, k * 2)
            .await?;

        let mut candidates: Vec<RetrievedChunk> = matches
            .into_iter()
            .filter(|m| {
                m.chunk
                    .text
                    .trim()
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .count()
                    >= self.config.min_chunk_chars
            })
            .map(|m| RetrievedChunk {
                chunk: m.chunk,
                similarity: m.similarity,
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.chunk.text.len().cmp(&a.chunk.text.len()))
                .then_with(|| a.chunk.metadata.chunk_index.cmp(&b.chunk.metadata.chunk_index))
        });
        candidates.truncate(k);

        Ok(apply_token_budget(
            candidates,
            query,
            self.config.max_context_tokens,
            self.config.response_reserve,
            self.config.min_chunk_chars,
        ))
    }
}

fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

/// Greedily admits ranked candidates into the context window, truncating
/// the last one at a sentence boundary when it would overflow, and
/// dropping it entirely if no truncation keeps it above the quality
/// floor.
fn apply_token_budget(
    ranked: Vec<RetrievedChunk>,
    query: &str,
    max_context_tokens: usize,
    response_reserve: usize,
    min_chunk_chars: usize,
) -> Vec<RetrievedChunk> {
    let query_tokens = estimate_tokens(query);
    let budget = max_context_tokens.saturating_sub(query_tokens + response_reserve);

    let mut selected = Vec::new();
    let mut used = 0usize;

    for mut candidate in ranked {
        let cost = estimate_tokens(&candidate.chunk.text);
        let remaining = budget.saturating_sub(used);
        if cost <= remaining {
            used += cost;
            selected.push(candidate);
            continue;
        }
        if remaining == 0 {
            break;
        }
        let truncated = truncate_to_token_budget(&candidate.chunk.text, remaining);
        let non_whitespace = truncated.chars().filter(|c| !c.is_whitespace()).count();
        if non_whitespace < min_chunk_chars {
            break;
        }
        candidate.chunk.text = truncated;
        used += estimate_tokens(&candidate.chunk.text);
        selected.push(candidate);
        break;
    }

    selected
}

/// Truncates `text` to fit within `token_budget` estimated tokens, cutting
/// at the last sentence boundary that fits.
fn truncate_to_token_budget(text: &str, token_budget: usize) -> String {
    let char_budget = token_budget * 4;
    if text.len() <= char_budget {
        return text.to_string();
    }

    let mut best: Option<&str> = None;
    let mut acc_len = 0usize;
    for sentence in text.unicode_sentences() {
        let candidate_len = acc_len + sentence.len();
        if candidate_len > char_budget {
            break;
        }
        acc_len = candidate_len;
        best = Some(&text[..acc_len]);
    }
    best.unwrap_or("").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryVectorStore;
    use crate::types::{Chunk, ChunkMetadata};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EchoEmbedder;

    #[async_trait]
    impl EmbeddingModel for EchoEmbedder {
        fn dim(&self) -> usize {
            2
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }
    }

    fn chunk(id: &str, index: usize, text: &str) -> Chunk {
        Chunk {
            chunk_id: id.into(),
            text: text.into(),
            embedding: vec![1.0, 0.0],
            metadata: ChunkMetadata {
                filename: "doc.pdf".into(),
                page_number: 1,
                chunk_index: index,
                char_start: None,
                char_end: None,
            },
        }
    }

    #[tokio::test]
    async fn retrieve_with_k_zero_makes_no_upstream_call() {
        let store = Arc::new(InMemoryVectorStore::new());
        let svc = RetrievalService::new(Arc::new(EchoEmbedder), store, RagConfig::default());
        let results = svc.retrieve("doc", "anything", 0).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn retrieve_drops_chunks_below_quality_floor() {
        let store = Arc::new(InMemoryVectorStore::new());
        store
            .upsert("doc", vec![chunk("short", 0, "tiny")])
            .await
            .unwrap();
        let svc = RetrievalService::new(Arc::new(EchoEmbedder), store, RagConfig::default());
        let results = svc.retrieve("doc", "query", 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn retrieve_returns_at_most_k_in_ranked_order() {
        let store = Arc::new(InMemoryVectorStore::new());
        let long_text = "word ".repeat(20);
        store
            .upsert(
                "doc",
                vec![
                    chunk("a", 0, &long_text),
                    chunk("b", 1, &long_text),
                    chunk("c", 2, &long_text),
                ],
            )
            .await
            .unwrap();
        let svc = RetrievalService::new(Arc::new(EchoEmbedder), store, RagConfig::default());
        let results = svc.retrieve("doc", "query", 2).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn token_budget_truncates_at_sentence_boundary() {
        let text = "First sentence here. Second sentence here. Third sentence here.";
        let truncated = truncate_to_token_budget(text, 6);
        assert!(text.starts_with(&truncated));
        assert!(truncated.ends_with('.') || truncated.is_empty());
    }

    #[test]
    fn token_budget_keeps_short_text_whole() {
        let text = "short text";
        assert_eq!(truncate_to_token_budget(text, 1000), text);
    }
}
