//! The layered tokenizer
//!
//! A [`Tokenizer`] owns one compiled pattern and exactly one upstream: either a
//! raw character source (the leaf layer) or another tokenizer (a layer). Each
//! [`Tokenizer::pull`] produces spans into a private queue until one survives
//! elision, then hands out the front of the queue.
//!
//! Chains are built by nesting:
//!
//! ```ignore
//! let numbers = Tokenizer::from_text("x = 42 + y", "[0-9]+")?;
//! let words = Tokenizer::layered(numbers, "[a-z]+")?;
//! let ops = Tokenizer::layered(words, "[=+]")?;
//! ```
//!
//! Every layer owns its upstream, and pulling takes `&mut self`, so a chain has
//! a single consumer and no two pulls on one instance can interleave.

use super::error::TokenizeError;
use super::iter::Spans;
use super::layer::split_unrecognized;
use super::pattern::Pattern;
use super::scanner::{ScanStatus, StreamScanner};
use super::source::{CharReader, CharSource, StrSource};
use super::span::Span;
use serde::Deserialize;
use std::collections::VecDeque;
use std::io::Read;

/// How the leaf layer resolves its accumulator when the stream ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlushPolicy {
    /// Emit the leftover text as one unrecognized span, even if it matches.
    #[default]
    Unrecognized,
    /// Re-match the leftover text so a match at the very end is recognized.
    Rematch,
}

/// Per-tokenizer behavior knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerOptions {
    pub flush: FlushPolicy,
    /// Drop spans whose text is exactly `""` or `" "`.
    pub elide_blank: bool,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            flush: FlushPolicy::Unrecognized,
            elide_blank: true,
        }
    }
}

/// Where a tokenizer pulls its input from.
pub enum Upstream<S> {
    /// Raw characters, scanned incrementally.
    Stream(StreamScanner<S>),
    /// The span sequence of a parent tokenizer.
    Layer(Box<Tokenizer<S>>),
}

/// A pattern-driven tokenizer over a raw source or over another tokenizer.
pub struct Tokenizer<S> {
    pattern: Pattern,
    upstream: Upstream<S>,
    pending: VecDeque<Span>,
    options: TokenizerOptions,
    finished: bool,
}

impl<S: CharSource> Tokenizer<S> {
    /// Tokenize a raw character source.
    pub fn new(source: S, pattern: &str) -> Result<Self, TokenizeError> {
        let pattern = Pattern::new(pattern)?;
        tracing::debug!(pattern = pattern.as_str(), depth = 0, "created tokenizer");
        Ok(Self::with_upstream(
            pattern,
            Upstream::Stream(StreamScanner::new(source)),
        ))
    }

    /// Tokenize the unrecognized spans of `parent`.
    pub fn layered(parent: Tokenizer<S>, pattern: &str) -> Result<Self, TokenizeError> {
        let pattern = Pattern::new(pattern)?;
        tracing::debug!(
            pattern = pattern.as_str(),
            depth = parent.depth() + 1,
            "created layered tokenizer"
        );
        let options = parent.options;
        Ok(Self::with_upstream(pattern, Upstream::Layer(Box::new(parent))).with_options(options))
    }

    fn with_upstream(pattern: Pattern, upstream: Upstream<S>) -> Self {
        Self {
            pattern,
            upstream,
            pending: VecDeque::new(),
            options: TokenizerOptions::default(),
            finished: false,
        }
    }

    /// Replace the options of this layer.
    ///
    /// A layer inherits its parent's options when it is created. `elide_blank`
    /// applies to this layer only. `flush` is carried down to the leaf layer,
    /// the only one that reads the raw stream, so the whole chain shares it.
    pub fn with_options(mut self, options: TokenizerOptions) -> Self {
        self.set_flush(options.flush);
        self.options = options;
        self
    }

    fn set_flush(&mut self, flush: FlushPolicy) {
        self.options.flush = flush;
        if let Upstream::Layer(parent) = &mut self.upstream {
            parent.set_flush(flush);
        }
    }

    pub fn options(&self) -> TokenizerOptions {
        self.options
    }

    /// Number of tokenizers between this one and the raw source.
    pub fn depth(&self) -> usize {
        match &self.upstream {
            Upstream::Stream(_) => 0,
            Upstream::Layer(parent) => parent.depth() + 1,
        }
    }

    /// Pull the next span, or `None` at end-of-sequence.
    ///
    /// End-of-sequence is sticky. A read error is returned once and terminates
    /// the tokenizer.
    pub fn pull(&mut self) -> Result<Option<Span>, TokenizeError> {
        if self.finished {
            return Ok(None);
        }

        loop {
            if let Some(span) = self.pending.pop_front() {
                return Ok(Some(span));
            }

            match self.produce() {
                Ok(Produced::Queued) => self.elide(),
                Ok(Produced::Passthrough(span)) => return Ok(Some(span)),
                Ok(Produced::Exhausted) => {
                    self.elide();
                    if self.pending.is_empty() {
                        self.finished = true;
                        return Ok(None);
                    }
                }
                Err(e) => {
                    self.finished = true;
                    self.pending.clear();
                    return Err(e);
                }
            }
        }
    }

    fn produce(&mut self) -> Result<Produced, TokenizeError> {
        match &mut self.upstream {
            Upstream::Stream(scanner) => {
                let status = scanner
                    .scan(&self.pattern, self.options.flush, &mut self.pending)
                    .map_err(|e| {
                        tracing::warn!(error = %e, "raw source read failed");
                        TokenizeError::Io(e)
                    })?;
                Ok(match status {
                    ScanStatus::Produced => Produced::Queued,
                    ScanStatus::Finished => Produced::Exhausted,
                })
            }
            Upstream::Layer(parent) => match parent.pull()? {
                None => Ok(Produced::Exhausted),
                Some(span) if span.is_recognized() => {
                    tracing::trace!(text = span.text(), "passing recognized span through");
                    Ok(Produced::Passthrough(span))
                }
                Some(span) => {
                    split_unrecognized(&self.pattern, span, &mut self.pending);
                    Ok(Produced::Queued)
                }
            },
        }
    }

    fn elide(&mut self) {
        if self.options.elide_blank {
            self.pending.retain(|span| !span.is_blank());
        }
    }

    /// Borrow an iteration view over the remaining spans.
    pub fn spans(&mut self) -> Spans<'_, S> {
        Spans::new(self)
    }

    /// Drain every remaining span.
    pub fn collect_spans(mut self) -> Result<Vec<Span>, TokenizeError> {
        self.spans().collect()
    }
}

impl<S> Tokenizer<S> {
    /// Put a span back at the front of the queue.
    pub(super) fn unread(&mut self, span: Span) {
        self.pending.push_front(span);
    }
}

impl<R: Read> Tokenizer<CharReader<R>> {
    /// Tokenize UTF-8 text read from `reader`.
    pub fn from_reader(reader: R, pattern: &str) -> Result<Self, TokenizeError> {
        Self::new(CharReader::new(reader), pattern)
    }
}

impl<'a> Tokenizer<StrSource<'a>> {
    /// Tokenize an in-memory string, fed one character at a time.
    pub fn from_text(text: &'a str, pattern: &str) -> Result<Self, TokenizeError> {
        Self::new(StrSource::new(text), pattern)
    }
}

enum Produced {
    /// Spans were added to the pending queue.
    Queued,
    /// An upstream span that must be emitted as is.
    Passthrough(Span),
    /// The upstream has ended; any final spans are queued.
    Exhausted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::span::SpanKind;
    use std::io;

    fn pull_all<S: CharSource>(tokenizer: &mut Tokenizer<S>) -> Vec<(String, SpanKind)> {
        let mut out = Vec::new();
        while let Some(span) = tokenizer.pull().unwrap() {
            out.push((span.text().to_string(), span.kind()));
        }
        out
    }

    /// Yields `text`, then fails on every later read.
    struct FailingSource {
        chars: std::vec::IntoIter<char>,
    }

    impl CharSource for FailingSource {
        fn read_char(&mut self) -> io::Result<Option<char>> {
            match self.chars.next() {
                Some(ch) => Ok(Some(ch)),
                None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed")),
            }
        }
    }

    /// Never ends: repeats `a b ` forever.
    struct EndlessSource {
        next: usize,
    }

    impl CharSource for EndlessSource {
        fn read_char(&mut self) -> io::Result<Option<char>> {
            let ch = ['a', ' ', 'b', ' '][self.next % 4];
            self.next += 1;
            Ok(Some(ch))
        }
    }

    #[test]
    fn test_stream_scenario() {
        let mut tokenizer = Tokenizer::from_text("ab12cd", "[0-9]+").unwrap();
        assert_eq!(
            pull_all(&mut tokenizer),
            vec![
                ("ab".to_string(), SpanKind::Unrecognized),
                ("12".to_string(), SpanKind::Recognized),
                ("cd".to_string(), SpanKind::Unrecognized),
            ]
        );
    }

    #[test]
    fn test_end_of_sequence_is_sticky() {
        let mut tokenizer = Tokenizer::from_text("a", "b").unwrap();
        assert_eq!(tokenizer.pull().unwrap().unwrap().text(), "a");
        assert!(tokenizer.pull().unwrap().is_none());
        assert!(tokenizer.pull().unwrap().is_none());
        assert!(tokenizer.pull().unwrap().is_none());
    }

    #[test]
    fn test_blank_only_step_does_not_end_sequence() {
        // Each space commits on its own and is elided; the stream continues.
        let mut tokenizer = Tokenizer::from_text("  x", " ").unwrap();
        assert_eq!(
            pull_all(&mut tokenizer),
            vec![("x".to_string(), SpanKind::Unrecognized)]
        );
    }

    #[test]
    fn test_read_error_is_surfaced_then_terminates() {
        let source = FailingSource {
            chars: vec!['1', 'a'].into_iter(),
        };
        let mut tokenizer = Tokenizer::new(source, "[0-9]+").unwrap();

        let first = tokenizer.pull().unwrap().unwrap();
        assert_eq!(first.text(), "1");
        assert!(first.is_recognized());

        let err = tokenizer.pull().unwrap_err();
        assert!(err.is_io());
        assert!(tokenizer.pull().unwrap().is_none());
    }

    #[test]
    fn test_layer_error_propagates() {
        let source = FailingSource {
            chars: vec!['x'].into_iter(),
        };
        let base = Tokenizer::new(source, "[0-9]+").unwrap();
        let mut layer = Tokenizer::layered(base, "[a-z]+").unwrap();
        assert!(layer.pull().unwrap_err().is_io());
        assert!(layer.pull().unwrap().is_none());
    }

    #[test]
    fn test_endless_source_stays_lazy() {
        let base = Tokenizer::new(EndlessSource { next: 0 }, "[a-z]").unwrap();
        let middle = Tokenizer::layered(base, "x").unwrap();
        let mut layer = Tokenizer::layered(middle, "y").unwrap();
        assert_eq!(layer.depth(), 2);

        for _ in 0..100 {
            let span = layer.pull().unwrap().unwrap();
            assert!(span.is_recognized());
            assert!(span.text() == "a" || span.text() == "b");
        }
    }

    #[test]
    fn test_layer_inherits_options() {
        let options = TokenizerOptions {
            flush: FlushPolicy::Rematch,
            elide_blank: false,
        };
        let base = Tokenizer::from_text("5", "[0-9]+")
            .unwrap()
            .with_options(options);
        let layer = Tokenizer::layered(base, "[a-z]+").unwrap();
        assert_eq!(layer.options(), options);
        assert_eq!(layer.depth(), 1);
    }

    #[test]
    fn test_flush_set_on_outer_layer_reaches_leaf() {
        let base = Tokenizer::from_text("x5", "[0-9]+").unwrap();
        let mut layer = Tokenizer::layered(base, "[a-z]+")
            .unwrap()
            .with_options(TokenizerOptions {
                flush: FlushPolicy::Rematch,
                elide_blank: true,
            });
        assert_eq!(
            pull_all(&mut layer),
            vec![
                ("x".to_string(), SpanKind::Recognized),
                ("5".to_string(), SpanKind::Recognized),
            ]
        );
    }

    #[test]
    fn test_elide_blank_stays_per_layer() {
        let base = Tokenizer::from_text("12c", "[0-9]+").unwrap();
        let mut layer = Tokenizer::layered(base, "q")
            .unwrap()
            .with_options(TokenizerOptions {
                flush: FlushPolicy::Unrecognized,
                elide_blank: false,
            });
        // The leaf still drops the empty prefix before "12".
        assert_eq!(
            pull_all(&mut layer),
            vec![
                ("12".to_string(), SpanKind::Recognized),
                ("c".to_string(), SpanKind::Unrecognized),
            ]
        );
    }

    #[test]
    fn test_rematch_flush_recognizes_tail() {
        let mut tokenizer = Tokenizer::from_text("5", "[0-9]+")
            .unwrap()
            .with_options(TokenizerOptions {
                flush: FlushPolicy::Rematch,
                ..TokenizerOptions::default()
            });
        assert_eq!(
            pull_all(&mut tokenizer),
            vec![("5".to_string(), SpanKind::Recognized)]
        );
    }

    #[test]
    fn test_construction_fails_on_bad_pattern() {
        assert!(matches!(
            Tokenizer::from_text("abc", "(").err(),
            Some(TokenizeError::Pattern { .. })
        ));
        let base = Tokenizer::from_text("abc", "a").unwrap();
        assert!(matches!(
            Tokenizer::layered(base, "[").err(),
            Some(TokenizeError::Pattern { .. })
        ));
    }
}
