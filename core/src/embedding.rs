//! Embedding provider boundary.
//!
//! An embedding model maps text to a fixed-dimension dense vector. Similar
//! texts produce similar vectors, which is what makes cosine-similarity
//! search over them useful for retrieval.

use async_trait::async_trait;

use crate::error::Result;

/// A dense embedding vector.
pub type Embedding = Vec<f32>;

/// Converts text into vector representations.
///
/// Implementations are expected to be cheap to clone (wrap an `Arc` around
/// any HTTP client state) since the server holds one instance for the
/// lifetime of the process and shares it across every request.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// The dimensionality of vectors this model returns. Every vector
    /// produced by [`embed`](Self::embed) and [`embed_batch`](Self::embed_batch)
    /// has exactly this length.
    fn dim(&self) -> usize;

    /// Embeds a single piece of text.
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Embeds a batch of texts.
    ///
    /// The default implementation calls [`embed`](Self::embed) once per
    /// item; providers that support true batched requests should override
    /// this for efficiency.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}
