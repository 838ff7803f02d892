//! Tokenizer error taxonomy

use std::io;

/// Errors surfaced by tokenizer construction and by `pull`.
#[derive(Debug, thiserror::Error)]
pub enum TokenizeError {
    /// The pattern did not compile. Raised at construction, never on first use.
    #[error("invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// Reading the raw source failed. The tokenizer is terminated.
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    /// A span was taken after the sequence had already ended.
    #[error("no more spans: the sequence is exhausted")]
    Exhausted,
}

impl TokenizeError {
    pub fn is_io(&self) -> bool {
        matches!(self, TokenizeError::Io(_))
    }
}
