//! Raw PDF byte streams to per-page UTF-8 text.
//!
//! This crate does one job: turn `Vec<u8>` into `Vec<String>` (one entry
//! per page) without OCR, failing only when the stream isn't a PDF or the
//! whole document is effectively empty.

pub mod error;
pub mod extractor;

pub use error::{PdfError, Result};
pub use extractor::{extract, ExtractedPdf};
