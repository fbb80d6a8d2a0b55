//! Per-page text extraction from raw PDF bytes.

use lopdf::Document;
use tracing::warn;

use crate::error::{PdfError, Result};

/// The outcome of extracting text from a PDF byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPdf {
    /// One entry per page, in page order, 1-based page numbering implied
    /// by position (`pages[0]` is page 1).
    pub pages: Vec<String>,
}

impl ExtractedPdf {
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Minimum total non-whitespace characters a document must contain across
/// all pages, or extraction fails with [`PdfError::BadInput`].
const MIN_NON_WHITESPACE_CHARS: usize = 10;

/// Extracts per-page text from a raw PDF byte stream.
///
/// Scanned or image-only pages yield an empty string rather than failing
/// extraction; only a document with fewer than
/// [`MIN_NON_WHITESPACE_CHARS`] non-whitespace characters across every
/// page is rejected. No OCR is performed.
pub fn extract(bytes: &[u8]) -> Result<ExtractedPdf> {
    let doc = Document::load_mem(bytes).map_err(|e| PdfError::BadInput(e.to_string()))?;

    let page_map = doc.get_pages();
    let mut page_numbers: Vec<u32> = page_map.keys().copied().collect();
    page_numbers.sort_unstable();

    if page_numbers.is_empty() {
        return Err(PdfError::BadInput("PDF contains no pages".into()));
    }

    let mut pages = Vec::with_capacity(page_numbers.len());
    for page_number in &page_numbers {
        let raw = doc.extract_text(&[*page_number]).unwrap_or_else(|err| {
            warn!(page = page_number, error = %err, "page text extraction failed, treating as blank");
            String::new()
        });
        pages.push(normalize(&raw));
    }

    let non_whitespace: usize = pages
        .iter()
        .map(|p| p.chars().filter(|c| !c.is_whitespace()).count())
        .sum();
    if non_whitespace < MIN_NON_WHITESPACE_CHARS {
        return Err(PdfError::BadInput(format!(
            "document contains only {non_whitespace} non-whitespace characters, minimum is {MIN_NON_WHITESPACE_CHARS}"
        )));
    }

    Ok(ExtractedPdf { pages })
}

/// Normalizes control characters below U+0020 (other than TAB and LF) to
/// spaces, and collapses runs of 3+ blank lines down to exactly two.
fn normalize(text: &str) -> String {
    let despaced: String = text
        .chars()
        .map(|c| {
            if (c as u32) < 0x20 && c != '\t' && c != '\n' {
                ' '
            } else {
                c
            }
        })
        .collect();

    let mut out = String::with_capacity(despaced.len());
    let mut blank_run = 0usize;
    for line in despaced.lines() {
        let trimmed_line = line.trim_end();
        if trimmed_line.trim().is_empty() {
            blank_run += 1;
            if blank_run <= 2 {
                out.push('\n');
            }
        } else {
            blank_run = 0;
            out.push_str(trimmed_line);
            out.push('\n');
        }
    }
    out.trim_end_matches('\n').to_string()
}
