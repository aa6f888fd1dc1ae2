//! Byte-level reference search over serialized documents

/// Position of the first occurrence of `needle` in `haystack`
///
/// An empty needle matches at position 0.
pub fn index_of(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Drop every whitespace byte, including inside string values
pub fn strip_whitespace(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .copied()
        .filter(|b| !matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c))
        .collect()
}

/// The `"id":"<id>"` token whose presence marks a reference to `id`
pub fn id_literal(id: &str) -> Vec<u8> {
    format!("\"id\":\"{id}\"").into_bytes()
}

/// A document, prepared once and matched against many ids
#[derive(Debug, Clone)]
pub struct NormalizedDocument {
    compact: Vec<u8>,
}

impl NormalizedDocument {
    pub fn new(raw: &[u8]) -> Self {
        Self {
            compact: strip_whitespace(raw),
        }
    }

    /// Whether the document mentions `id` as an id literal
    pub fn references(&self, id: &str) -> bool {
        index_of(&self.compact, &id_literal(id)).is_some()
    }
}

/// Raw containment of `id` anywhere in `content`
pub fn mentions(content: &[u8], id: &str) -> bool {
    index_of(content, id.as_bytes()).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_of() {
        assert_eq!(index_of(b"hello world", b"world"), Some(6));
        assert_eq!(index_of(b"hello world", b"hello"), Some(0));
        assert_eq!(index_of(b"hello", b"hello!"), None);
        assert_eq!(index_of(b"", b"a"), None);
        assert_eq!(index_of(b"abc", b""), Some(0));
        assert_eq!(index_of(b"", b""), Some(0));
    }

    #[test]
    fn test_index_of_overlapping_candidates() {
        // the first partial match "aab" fails at its last byte
        assert_eq!(index_of(b"aaab", b"aab"), Some(1));
        assert_eq!(index_of(b"abababc", b"ababc"), Some(2));
        assert_eq!(index_of(b"xyxy", b"xy"), Some(0));
    }

    #[test]
    fn test_strip_whitespace() {
        assert_eq!(
            strip_whitespace(b"{ \"id\" :\n\t\"a\" \r\x0b\x0c}"),
            b"{\"id\":\"a\"}".to_vec()
        );
    }

    #[test]
    fn test_references_is_anchored_on_quotes() {
        let doc = NormalizedDocument::new(br#"{ "rows": [[{ "id" : "page-10" }]] }"#);
        assert!(doc.references("page-10"));
        assert!(!doc.references("page-1"));
        assert!(!doc.references("age-10"));
    }

    #[test]
    fn test_mentions_is_raw() {
        assert!(mentions(br#"{"id":"page-10"}"#, "page-1"));
        assert!(!mentions(br#"{"id":"page-10"}"#, "page-2"));
    }
}
