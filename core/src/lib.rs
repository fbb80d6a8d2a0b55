//! Provider trait boundary for the study companion server.
//!
//! Every other crate in the workspace depends on this one for two things:
//! the [`CoreError`] taxonomy and the two provider traits, [`EmbeddingModel`]
//! and [`Completer`]. Nothing here talks to a real model provider — that
//! lives behind whatever concrete type `studyforge-api` constructs at
//! startup and hands around as `Arc<dyn EmbeddingModel>` / `Arc<dyn Completer>`.

pub mod completer;
pub mod embedding;
pub mod error;

pub use completer::Completer;
pub use embedding::{Embedding, EmbeddingModel};
pub use error::{CoreError, Result};
