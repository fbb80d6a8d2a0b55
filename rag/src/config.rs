//! Tunable limits for chunking, ingestion, and retrieval.
//!
//! Every field here has an entry in the configuration table exposed at the
//! HTTP boundary; `studyforge-api::config::Config` is responsible for
//! reading environment overrides and constructing this with
//! [`RagConfig::builder`].

/// Chunking, ingestion, and retrieval limits.
#[derive(Debug, Clone, PartialEq)]
pub struct RagConfig {
    pub embedding_dim: usize,
    pub max_context_tokens: usize,
    pub response_reserve: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub min_chunk_chars: usize,
    pub max_pages_total: usize,
    pub similarity_fallback_threshold: f32,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 1536,
            max_context_tokens: 4000,
            response_reserve: 1000,
            chunk_size: 1024,
            chunk_overlap: 200,
            min_chunk_chars: 50,
            max_pages_total: 300,
            similarity_fallback_threshold: 0.3,
        }
    }
}

impl RagConfig {
    #[must_use]
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

#[derive(Debug, Clone)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    #[must_use]
    pub fn embedding_dim(mut self, dim: usize) -> Self {
        self.config.embedding_dim = dim;
        self
    }

    #[must_use]
    pub fn max_context_tokens(mut self, tokens: usize) -> Self {
        self.config.max_context_tokens = tokens;
        self
    }

    #[must_use]
    pub fn response_reserve(mut self, tokens: usize) -> Self {
        self.config.response_reserve = tokens;
        self
    }

    #[must_use]
    pub fn chunk_size(mut self, chars: usize) -> Self {
        self.config.chunk_size = chars;
        self
    }

    #[must_use]
    pub fn chunk_overlap(mut self, chars: usize) -> Self {
        self.config.chunk_overlap = chars;
        self
    }

    #[must_use]
    pub fn min_chunk_chars(mut self, chars: usize) -> Self {
        self.config.min_chunk_chars = chars;
        self
    }

    #[must_use]
    pub fn max_pages_total(mut self, pages: usize) -> Self {
        self.config.max_pages_total = pages;
        self
    }

    #[must_use]
    pub fn similarity_fallback_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_fallback_threshold = threshold;
        self
    }

    #[must_use]
    pub fn build(self) -> RagConfig {
        self.config
    }
}

impl Default for RagConfigBuilder {
    fn default() -> Self {
        Self {
            config: RagConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_defaults() {
        let config = RagConfig::default();
        assert_eq!(config.embedding_dim, 1536);
        assert_eq!(config.max_context_tokens, 4000);
        assert_eq!(config.response_reserve, 1000);
        assert_eq!(config.chunk_size, 1024);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.min_chunk_chars, 50);
        assert_eq!(config.max_pages_total, 300);
        assert!((config.similarity_fallback_threshold - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn builder_overrides_individual_fields() {
        let config = RagConfig::builder().chunk_size(512).chunk_overlap(64).build();
        assert_eq!(config.chunk_size, 512);
        assert_eq!(config.chunk_overlap, 64);
        assert_eq!(config.embedding_dim, 1536);
    }
}
