//! Hybrid page-then-sentence-boundary chunker.
//!
//! Each page is split independently into overlapping windows sized around
//! `chunk_size` characters, snapped to the highest-priority separator
//! (`"\n\n" > "\n" > ". " > " "`) available near the target boundary so
//! sentences are not severed unless a single sentence alone exceeds the
//! target. Adjacent windows within a page share `chunk_overlap` characters.
//! A page's trailing window that contributes fewer than `min_chunk_chars`
//! non-whitespace characters beyond what its predecessor already covered
//! is folded back into that predecessor rather than persisted standalone.

/// One page's worth of already-extracted text, ready to be split.
#[derive(Debug, Clone)]
pub struct PageText {
    pub filename: String,
    /// 1-based page number within `filename`.
    pub page_number: usize,
    pub text: String,
}

/// A chunk produced by [`chunk_pages`], not yet assigned an id or
/// embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct RawChunk {
    /// Monotonic position across the whole document.
    pub chunk_index: usize,
    pub filename: String,
    pub page_number: usize,
    pub text: String,
    pub char_start: usize,
    pub char_end: usize,
}

const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

struct Piece {
    filename: String,
    page_number: usize,
    text: String,
    char_start: usize,
    char_end: usize,
    overlap_prefix_len: usize,
}

/// Splits every page into overlapping chunks and assigns a document-wide
/// monotonic `chunk_index`. Empty or whitespace-only pages contribute no
/// chunks.
#[must_use]
pub fn chunk_pages(
    pages: &[PageText],
    chunk_size: usize,
    chunk_overlap: usize,
    min_chunk_chars: usize,
) -> Vec<RawChunk> {
    let mut pieces: Vec<Piece> = Vec::new();

    for page in pages {
        let trimmed = page.text.trim();
        if trimmed.is_empty() {
            continue;
        }
        let mut page_pieces = split_page(trimmed, chunk_size, chunk_overlap)
            .into_iter()
            .map(|(text, start, end, overlap_prefix_len)| Piece {
                filename: page.filename.clone(),
                page_number: page.page_number,
                text,
                char_start: start,
                char_end: end,
                overlap_prefix_len,
            })
            .collect::<Vec<_>>();
        merge_undersized_tail(&mut page_pieces, min_chunk_chars);
        pieces.append(&mut page_pieces);
    }

    pieces
        .into_iter()
        .enumerate()
        .filter(|(_, piece)| !piece.text.trim().is_empty())
        .map(|(chunk_index, piece)| RawChunk {
            chunk_index,
            filename: piece.filename,
            page_number: piece.page_number,
            text: piece.text,
            char_start: piece.char_start,
            char_end: piece.char_end,
        })
        .collect()
}

/// If the last piece of a page contributes fewer than `min_chunk_chars`
/// non-whitespace characters beyond the overlap it shares with its
/// predecessor, fold it into the predecessor instead of keeping it
/// standalone.
fn merge_undersized_tail(pieces: &mut Vec<Piece>, min_chunk_chars: usize) {
    loop {
        let Some(last) = pieces.last() else { break };
        if pieces.len() < 2 {
            break;
        }
        let new_content_len = last
            .text
            .chars()
            .skip(last.overlap_prefix_len)
            .filter(|c| !c.is_whitespace())
            .count();
        if new_content_len >= min_chunk_chars {
            break;
        }
        let tail = pieces.pop().expect("checked non-empty above");
        let predecessor = pieces.last_mut().expect("checked len >= 2 above");
        let new_suffix: String = tail.text.chars().skip(tail.overlap_prefix_len).collect();
        predecessor.text.push_str(&new_suffix);
        predecessor.char_end = tail.char_end;
    }
}

/// Splits one page's trimmed text into overlapping `(text, char_start,
/// char_end, overlap_prefix_len)` windows.
fn split_page(text: &str, chunk_size: usize, overlap: usize) -> Vec<(String, usize, usize, usize)> {
    let chars: Vec<char> = text.chars().collect();
    let char_len = chars.len();
    if char_len <= chunk_size {
        return vec![(text.to_string(), 0, char_len, 0)];
    }

    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut windows = Vec::new();
    let mut start = 0usize;
    let mut prev_end = 0usize;

    loop {
        let target_end = (start + chunk_size).min(char_len);
        let end = if target_end >= char_len {
            char_len
        } else {
            find_boundary(&chars, start, target_end)
        };
        let overlap_prefix_len = prev_end.saturating_sub(start).min(end - start);
        let slice: String = chars[start..end].iter().collect();
        windows.push((slice, start, end, overlap_prefix_len));

        if end >= char_len {
            break;
        }
        prev_end = end;
        let next_start = start + step;
        start = if next_start <= start { end } else { next_start };
    }

    windows
}

/// Finds the byte-free (char-indexed) boundary closest to `target_end`,
/// preferring higher-priority separators, without searching past the
/// midpoint of `[start, target_end]`.
fn find_boundary(chars: &[char], start: usize, target_end: usize) -> usize {
    let search_floor = start + (target_end - start) / 2;
    for sep in SEPARATORS {
        let sep_chars: Vec<char> = sep.chars().collect();
        let mut pos = target_end;
        while pos > search_floor {
            pos -= 1;
            if pos + sep_chars.len() <= chars.len() && chars[pos..pos + sep_chars.len()] == sep_chars[..] {
                return pos + sep_chars.len();
            }
        }
    }
    target_end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(text: &str) -> PageText {
        PageText {
            filename: "doc.pdf".into(),
            page_number: 1,
            text: text.into(),
        }
    }

    #[test]
    fn short_page_yields_single_chunk() {
        let chunks = chunk_pages(&[page("a short page of text")], 1024, 200, 50);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "a short page of text");
        assert_eq!(chunks[0].chunk_index, 0);
    }

    #[test]
    fn blank_page_yields_no_chunks() {
        let chunks = chunk_pages(&[page("   \n\n  ")], 1024, 200, 50);
        assert!(chunks.is_empty());
    }

    #[test]
    fn chunk_index_is_monotonic_across_pages() {
        let pages = vec![
            PageText {
                filename: "doc.pdf".into(),
                page_number: 1,
                text: "first page content here.".into(),
            },
            PageText {
                filename: "doc.pdf".into(),
                page_number: 2,
                text: "second page content here.".into(),
            },
        ];
        let chunks = chunk_pages(&pages, 1024, 200, 50);
        let indices: Vec<usize> = chunks.iter().map(|c| c.chunk_index).collect();
        assert_eq!(indices, (0..chunks.len()).collect::<Vec<_>>());
        assert_eq!(chunks[0].page_number, 1);
        assert_eq!(chunks[1].page_number, 2);
    }

    #[test]
    fn long_page_is_split_with_overlap() {
        let sentence = "The quick brown fox jumps over the lazy dog. ";
        let long_text = sentence.repeat(80);
        let chunks = chunk_pages(&[page(&long_text)], 200, 40, 50);
        assert!(chunks.len() > 1);
        for w in chunks.windows(2) {
            assert!(w[0].char_end > w[1].char_start, "adjacent chunks should overlap");
        }
    }

    #[test]
    fn never_emits_empty_chunks() {
        let sentence = "Sentence number filler content to pad things out nicely. ";
        let long_text = sentence.repeat(60);
        let chunks = chunk_pages(&[page(&long_text)], 150, 130, 50);
        for c in &chunks {
            assert!(!c.text.trim().is_empty());
        }
    }
}
