//! HTTP surface for the PDF study companion server: wires the
//! ingestion/retrieval, generation, and adaptive quiz crates behind a
//! single `axum::Router`.

pub mod config;
pub mod context;
pub mod dto;
pub mod error;
pub mod providers;
pub mod routes;

pub use config::AppConfig;
pub use context::{CoreContext, SharedContext};

use axum::Router;

/// Builds the fully wired application router. Splitting this out from
/// `main` lets integration tests mount the same routes in-process
/// without binding a socket.
#[must_use]
pub fn app(context: SharedContext) -> Router {
    routes::router(context)
}
