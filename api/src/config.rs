//! Environment-overridable server configuration.

use studyforge_quiz::QuizConfig;
use studyforge_rag::RagConfig;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Every tunable the server reads from the environment at startup,
/// fanned out into the per-crate config structs that actually consume
/// them.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rag: RagConfig,
    pub quiz: QuizConfig,
    pub upstream_timeout_ms: u64,
}

impl AppConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = RagConfig::default();
        let rag = RagConfig::builder()
            .embedding_dim(env_or("EMBEDDING_DIM", defaults.embedding_dim))
            .max_context_tokens(env_or("MAX_CONTEXT_TOKENS", defaults.max_context_tokens))
            .response_reserve(env_or("RESPONSE_RESERVE", defaults.response_reserve))
            .chunk_size(env_or("CHUNK_SIZE", defaults.chunk_size))
            .chunk_overlap(env_or("CHUNK_OVERLAP", defaults.chunk_overlap))
            .min_chunk_chars(env_or("MIN_CHUNK_CHARS", defaults.min_chunk_chars))
            .max_pages_total(env_or("MAX_PAGES_TOTAL", defaults.max_pages_total))
            .similarity_fallback_threshold(env_or(
                "SIMILARITY_FALLBACK_THRESHOLD",
                defaults.similarity_fallback_threshold,
            ))
            .build();

        let quiz_defaults = QuizConfig::default();
        let quiz = QuizConfig {
            alpha: env_or("QL_ALPHA", quiz_defaults.alpha),
            gamma: env_or("QL_GAMMA", quiz_defaults.gamma),
            epsilon: env_or("QL_EPSILON", quiz_defaults.epsilon),
            blend_weight_q: env_or("BLEND_WEIGHT_Q", quiz_defaults.blend_weight_q),
        };

        Self {
            rag,
            quiz,
            upstream_timeout_ms: env_or("UPSTREAM_TIMEOUT_MS", 30_000),
        }
    }
}
