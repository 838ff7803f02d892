//! # lexstack
//!
//! A composable, pattern-driven tokenizer.
//!
//! A tokenizer scans a character stream, or the output of another tokenizer,
//! and splits it into spans that either match its pattern (recognized) or do
//! not (unrecognized). Stacking tokenizers builds a pipeline where each layer
//! peels off one lexical category from what the layers below left over.
//!
//! - [`tokenizer`]: spans, sources and the layered tokenizer itself
//! - [`config`]: TOML pipeline descriptions and built-in pattern presets
//! - [`pipeline`]: building tokenizer chains from a configuration, rendering output

pub mod config;
pub mod pipeline;
pub mod tokenizer;

pub use tokenizer::{
    CharReader, CharSource, FlushPolicy, Span, SpanKind, StrSource, TokenizeError, Tokenizer,
    TokenizerOptions,
};
