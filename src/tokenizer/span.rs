//! Span data model
//!
//! A span is the unit every tokenizer layer emits: an immutable slice of the
//! input tagged as recognized (it matched the layer's pattern) or unrecognized.
//!
//! Spans carry the byte range they occupy in the original raw input. Layers
//! never re-read the input, so ranges are carried forward: a piece split out of
//! an upstream span is offset by that span's start.

use serde::Serialize;
use std::ops::Range as ByteRange;

/// Classification of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    /// The text matched a layer's pattern.
    Recognized,
    /// The text matched no pattern (yet).
    Unrecognized,
}

/// An immutable, classified slice of input text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    text: String,
    kind: SpanKind,
    range: ByteRange<usize>,
}

impl Span {
    /// Create a span from its text and the byte offset where that text starts.
    pub fn new(text: impl Into<String>, kind: SpanKind, start: usize) -> Self {
        let text = text.into();
        let range = start..start + text.len();
        Self { text, kind, range }
    }

    pub fn recognized(text: impl Into<String>, start: usize) -> Self {
        Self::new(text, SpanKind::Recognized, start)
    }

    pub fn unrecognized(text: impl Into<String>, start: usize) -> Self {
        Self::new(text, SpanKind::Unrecognized, start)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> SpanKind {
        self.kind
    }

    /// Byte range of this span in the original raw input.
    pub fn range(&self) -> ByteRange<usize> {
        self.range.clone()
    }

    pub fn is_recognized(&self) -> bool {
        self.kind == SpanKind::Recognized
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// True for the two span texts dropped by elision: `""` and `" "`.
    ///
    /// Tabs, newlines and runs of spaces are not blank.
    pub fn is_blank(&self) -> bool {
        self.text.is_empty() || self.text == " "
    }
}

impl std::fmt::Display for SpanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpanKind::Recognized => f.pad("REC"),
            SpanKind::Unrecognized => f.pad("UNREC"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_follows_text() {
        let span = Span::recognized("héllo", 4);
        assert_eq!(span.range(), 4..10);
        assert_eq!(span.kind(), SpanKind::Recognized);
        assert!(span.is_recognized());
    }

    #[test]
    fn test_blank_is_exactly_empty_or_single_space() {
        assert!(Span::unrecognized("", 0).is_blank());
        assert!(Span::unrecognized(" ", 0).is_blank());
        assert!(Span::recognized(" ", 0).is_blank());

        assert!(!Span::unrecognized("  ", 0).is_blank());
        assert!(!Span::unrecognized("\t", 0).is_blank());
        assert!(!Span::unrecognized("\n", 0).is_blank());
        assert!(!Span::unrecognized(" a", 0).is_blank());
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&Span::unrecognized("ab", 0)).unwrap();
        assert_eq!(
            json,
            r#"{"text":"ab","kind":"unrecognized","range":{"start":0,"end":2}}"#
        );
    }
}
