//! Compiled patterns
//!
//! The tokenizer needs one thing from its matching engine: the leftmost match
//! of a compiled pattern inside a piece of text, as byte offsets. `Pattern`
//! wraps a `regex::Regex` behind an `Arc` so every holder shares one compiled
//! program read-only.

use super::error::TokenizeError;
use regex::Regex;
use std::ops::Range as ByteRange;
use std::sync::Arc;

/// A compiled, shareable pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Arc<Regex>,
}

impl Pattern {
    /// Compile a pattern. Invalid syntax fails here.
    pub fn new(pattern: &str) -> Result<Self, TokenizeError> {
        let regex = Regex::new(pattern).map_err(|e| TokenizeError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            regex: Arc::new(regex),
        })
    }

    /// Leftmost match of this pattern in `text`.
    pub fn find(&self, text: &str) -> Option<ByteRange<usize>> {
        self.regex.find(text).map(|m| m.range())
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}
