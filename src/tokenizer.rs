//! Tokenizer
//!
//! This module holds the layered tokenizer: a pattern-driven splitter that turns
//! a character stream into alternating recognized and unrecognized spans.
//!
//! Structure:
//!     A tokenizer is built either over a raw character source or over another
//!     tokenizer. Each layer peels one lexical category off the spans its
//!     upstream left unrecognized, without re-reading the source.
//!
//! The pieces:
//! 1. span.rs: the emitted data type, with byte ranges into the raw input
//! 2. pattern.rs: compiled regex, leftmost-match lookup
//! 3. source.rs: raw character sources (UTF-8 readers, strings)
//! 4. scanner.rs: incremental scanning of a raw stream with deferred commit
//! 5. layer.rs: splitting an upstream span with a layer's own pattern
//! 6. engine.rs: the `Tokenizer` pull state machine and its options
//! 7. iter.rs: the peekable iteration view
//!
//! Elision
//!
//!     After every production step, spans whose text is exactly `""` or exactly
//!     `" "` are dropped (unless `elide_blank` is off). Nothing else is trimmed:
//!     tabs, newlines and runs of spaces are kept as ordinary spans.

pub mod engine;
pub mod error;
pub mod iter;
pub mod layer;
pub mod pattern;
pub mod scanner;
pub mod source;
pub mod span;

pub use engine::{FlushPolicy, Tokenizer, TokenizerOptions, Upstream};
pub use error::TokenizeError;
pub use iter::Spans;
pub use pattern::Pattern;
pub use source::{CharReader, CharSource, StrSource};
pub use span::{Span, SpanKind};
