//! Dependency-injection context shared by every handler: a single
//! object carrying every service, constructed once at startup and
//! handed to `axum::Router::with_state`.

use std::sync::Arc;

use studyforge_core::{Completer, EmbeddingModel};
use studyforge_generation::{ContentGenerators, QaService};
use studyforge_rag::{IngestionService, InMemoryVectorStore, RetrievalService, VectorStore};
use studyforge_quiz::QuizEngine;

use crate::config::AppConfig;

pub struct CoreContext {
    pub ingestion: IngestionService,
    pub retrieval: Arc<RetrievalService>,
    pub qa: QaService,
    pub generators: Arc<ContentGenerators>,
    pub quiz: QuizEngine,
    pub config: AppConfig,
}

impl CoreContext {
    #[must_use]
    pub fn new(embedder: Arc<dyn EmbeddingModel>, completer: Arc<dyn Completer>, config: AppConfig) -> Self {
        let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::default());
        let ingestion = IngestionService::new(Arc::clone(&embedder), Arc::clone(&store), config.rag.clone());
        let retrieval = Arc::new(RetrievalService::new(embedder, store, config.rag.clone()));
        let qa = QaService::new(
            Arc::clone(&retrieval),
            Arc::clone(&completer),
            config.rag.similarity_fallback_threshold,
        );
        let generators = Arc::new(ContentGenerators::new(completer));
        let quiz = QuizEngine::new(Arc::clone(&generators), config.quiz);

        Self {
            ingestion,
            retrieval,
            qa,
            generators,
            quiz,
            config,
        }
    }
}

pub type SharedContext = Arc<CoreContext>;
