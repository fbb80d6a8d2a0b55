//! Content hashing for chunk deduplication.

use xxhash_rust::xxh3::xxh3_64;

/// A fast, non-cryptographic content hash used to detect duplicate chunk
/// text within a namespace.
#[must_use]
pub fn content_hash(text: &str) -> u64 {
    xxh3_64(text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_hashes_identically() {
        assert_eq!(content_hash("hello world"), content_hash("hello world"));
    }

    #[test]
    fn distinct_text_hashes_differ() {
        assert_ne!(content_hash("hello world"), content_hash("goodbye world"));
    }
}
