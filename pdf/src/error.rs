//! Errors produced while extracting text from a PDF byte stream.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    /// The byte stream could not be parsed as a PDF, or the document as a
    /// whole carries fewer than ten non-whitespace characters of text.
    #[error("{0}")]
    BadInput(String),

    /// Underlying `lopdf` parse failure not attributable to bad input
    /// (corrupt internal structure, unsupported filter, etc).
    #[error("pdf parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, PdfError>;
