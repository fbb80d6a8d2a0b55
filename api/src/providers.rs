//! Default OpenAI-compatible provider adapters.
//!
//! `EmbeddingModel` and `Completer` are boundary traits: any
//! implementation may be wired in at startup. This module supplies a
//! minimal REST-backed one so the binary is runnable out of the box
//! against OpenAI or any API-compatible endpoint (Deepseek, OpenRouter,
//! a local proxy, ...).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use studyforge_core::{CoreError, Embedding, EmbeddingModel, Completer, Result};

/// Reads `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `OPENAI_CHAT_MODEL`, and
/// `OPENAI_EMBEDDING_MODEL` from the environment, falling back to
/// OpenAI's own defaults.
pub struct OpenAiProvider {
    api_key: String,
    base_url: String,
    chat_model: String,
    embedding_model: String,
    embedding_dim: usize,
    client: reqwest::Client,
}

impl OpenAiProvider {
    #[must_use]
    pub fn from_env(embedding_dim: usize) -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            base_url: std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            chat_model: std::env::var("OPENAI_CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
            embedding_model: std::env::var("OPENAI_EMBEDDING_MODEL")
                .unwrap_or_else(|_| "text-embedding-3-small".into()),
            embedding_dim,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Embedding,
}

#[async_trait]
impl EmbeddingModel for OpenAiProvider {
    fn dim(&self) -> usize {
        self.embedding_dim
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        Ok(self.embed_batch(&[text.to_string()]).await?.remove(0))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: texts.iter().map(String::as_str).collect(),
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CoreError::Upstream(e.into()))?;

        if !response.status().is_success() {
            return Err(CoreError::Upstream(anyhow::anyhow!(
                "embeddings endpoint returned {}",
                response.status()
            )));
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| CoreError::Upstream(e.into()))?;
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait]
impl Completer for OpenAiProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CoreError::Upstream(e.into()))?;

        if !response.status().is_success() {
            return Err(CoreError::Upstream(anyhow::anyhow!(
                "chat completions endpoint returned {}",
                response.status()
            )));
        }

        let mut parsed: ChatResponse = response.json().await.map_err(|e| CoreError::Upstream(e.into()))?;
        parsed
            .choices
            .pop()
            .map(|c| c.message.content)
            .ok_or_else(|| CoreError::Upstream(anyhow::anyhow!("no completion choices returned")))
    }
}
