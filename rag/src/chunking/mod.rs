//! Hybrid page-then-sentence chunking with overlap.

mod hybrid;

pub use hybrid::{chunk_pages, PageText};
