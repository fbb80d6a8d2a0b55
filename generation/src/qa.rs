//! Grounded question answering with out-of-document fallback.

use std::sync::Arc;
use std::time::Duration;

use studyforge_core::{Completer, CoreError};
use studyforge_rag::RetrievalService;

use crate::classify::classify;
use crate::error::Result;
use crate::prompting::{build_fallback_prompt, build_prompt, is_from_document, post_process};

const QA_RETRIEVAL_K: usize = 5;
const MAX_SOURCES: usize = 3;
const SOURCE_SNIPPET_CHARS: usize = 300;
const UPSTREAM_TIMEOUT: Duration = Duration::from_millis(30_000);

/// One grounded answer's supporting excerpt.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub filename: String,
    pub page_number: usize,
    pub text: String,
}

/// The result of a `POST /chat` request.
#[derive(Debug, Clone, PartialEq)]
pub struct QaAnswer {
    pub answer: String,
    pub sources: Vec<Source>,
    pub from_document: bool,
}

pub struct QaService {
    retrieval: Arc<RetrievalService>,
    completer: Arc<dyn Completer>,
    similarity_threshold: f32,
}

impl QaService {
    #[must_use]
    pub fn new(retrieval: Arc<RetrievalService>, completer: Arc<dyn Completer>, similarity_threshold: f32) -> Self {
        Self {
            retrieval,
            completer,
            similarity_threshold,
        }
    }

    pub async fn answer(&self, document_id: &str, question: &str) -> Result<QaAnswer> {
        let context = self.retrieval.retrieve(document_id, question, QA_RETRIEVAL_K).await?;

        let question_type = classify(question);
        let prompt = build_prompt(question_type, &context, question);
        let raw = self.complete(&prompt).await?;
        let processed = post_process(&raw);

        let from_document = is_from_document(&context, &processed, self.similarity_threshold);

        if !from_document {
            let fallback_prompt = build_fallback_prompt(question);
            let fallback_raw = self.complete(&fallback_prompt).await?;
            let fallback_answer = post_process(&fallback_raw);
            return Ok(QaAnswer {
                answer: fallback_answer,
                sources: Vec::new(),
                from_document: false,
            });
        }

        let sources = context
            .iter()
            .take(MAX_SOURCES)
            .map(|c| Source {
                filename: c.chunk.metadata.filename.clone(),
                page_number: c.chunk.metadata.page_number,
                text: truncate_chars(&c.chunk.text, SOURCE_SNIPPET_CHARS),
            })
            .collect();

        Ok(QaAnswer {
            answer: processed,
            sources,
            from_document: true,
        })
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        tokio::time::timeout(UPSTREAM_TIMEOUT, self.completer.complete(prompt))
            .await
            .map_err(|_| CoreError::UpstreamTimeout("completer".into()))?
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use studyforge_core::{EmbeddingModel, Result as CoreResult};
    use studyforge_rag::{InMemoryVectorStore, RagConfig, VectorStore};

    struct FixedEmbedder;

    #[async_trait]
    impl EmbeddingModel for FixedEmbedder {
        fn dim(&self) -> usize {
            2
        }

        async fn embed(&self, _text: &str) -> CoreResult<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }
    }

    struct ScriptedCompleter {
        responses: std::sync::Mutex<std::collections::VecDeque<String>>,
    }

    impl ScriptedCompleter {
        fn new(responses: Vec<&str>) -> Self {
            Self {
                responses: std::sync::Mutex::new(responses.into_iter().map(String::from).collect()),
            }
        }
    }

    #[async_trait]
    impl Completer for ScriptedCompleter {
        async fn complete(&self, _prompt: &str) -> CoreResult<String> {
            Ok(self.responses.lock().unwrap().pop_front().unwrap_or_default())
        }
    }

    async fn seeded_store(text: &str) -> Arc<InMemoryVectorStore> {
        let store = Arc::new(InMemoryVectorStore::new());
        store
            .upsert(
                "doc",
                vec![studyforge_rag::Chunk {
                    chunk_id: "doc#chunk_0".into(),
                    text: text.into(),
                    embedding: vec![1.0, 0.0],
                    metadata: studyforge_rag::ChunkMetadata {
                        filename: "doc.pdf".into(),
                        page_number: 3,
                        chunk_index: 0,
                        char_start: None,
                        char_end: None,
                    },
                }],
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn grounded_answer_carries_sources_with_page_numbers() {
        let store = seeded_store(
            "Photosynthesis converts light energy into chemical energy stored in glucose, a process central to plant biology.",
        )
        .await;
        let retrieval = Arc::new(RetrievalService::new(
            Arc::new(FixedEmbedder),
            store,
            RagConfig::default(),
        ));
        let completer = Arc::new(ScriptedCompleter::new(vec![
            "Photosynthesis converts light energy into chemical energy.",
        ]));
        let qa = QaService::new(retrieval, completer, 0.3);

        let result = qa.answer("doc", "What does photosynthesis do?").await.unwrap();
        assert!(result.from_document);
        assert!(result.answer.to_lowercase().contains("light"));
        assert_eq!(result.sources[0].page_number, 3);
    }

    #[tokio::test]
    async fn fallback_triggers_second_completer_call() {
        let store = seeded_store("Photosynthesis converts light energy into chemical energy in plants.").await;
        let retrieval = Arc::new(RetrievalService::new(
            Arc::new(FixedEmbedder),
            store,
            RagConfig::default(),
        ));
        let completer = Arc::new(ScriptedCompleter::new(vec![
            "This is not mentioned in the provided context.",
            "The information is not available in the uploaded materials. The 2024 Olympic 100m final was won by an athlete I cannot verify here.",
        ]));
        let qa = QaService::new(retrieval, completer, 0.3);

        let result = qa
            .answer("doc", "Who won the 2024 Olympic 100m final?")
            .await
            .unwrap();
        assert!(!result.from_document);
        assert!(result.sources.is_empty());
        assert!(result.answer.to_lowercase().contains("not available in the uploaded"));
    }
}
