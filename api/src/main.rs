//! Binary entrypoint: loads configuration from the environment, wires a
//! default OpenAI-compatible provider, and serves the HTTP API.

use std::sync::Arc;

use anyhow::{Context, Result};
use studyforge_api::{app, AppConfig, CoreContext};
use studyforge_api::providers::OpenAiProvider;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = AppConfig::from_env();
    let provider = Arc::new(OpenAiProvider::from_env(config.rag.embedding_dim));
    let context = Arc::new(CoreContext::new(provider.clone(), provider, config));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!(%bind_addr, "study companion server listening");
    axum::serve(listener, app(context)).await.context("server exited unexpectedly")?;

    Ok(())
}
