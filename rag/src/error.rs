//! Error shim: the ingestion and retrieval services report failures using
//! the shared [`CoreError`] taxonomy directly, converting provider-crate
//! errors at the boundary.

pub use studyforge_core::error::{CoreError, Result};
