//! Iteration view over a tokenizer
//!
//! [`Spans`] borrows its tokenizer mutably, so there is at most one live view
//! per tokenizer. Peeking pulls at most once and caches the result; taking after
//! a peek returns the peeked span rather than pulling a new one.

use super::engine::Tokenizer;
use super::error::TokenizeError;
use super::source::CharSource;
use super::span::Span;
use std::iter::FusedIterator;

pub struct Spans<'t, S> {
    tokenizer: &'t mut Tokenizer<S>,
    /// `Some(None)` caches a peeked end-of-sequence.
    peeked: Option<Option<Span>>,
}

impl<'t, S: CharSource> Spans<'t, S> {
    pub(super) fn new(tokenizer: &'t mut Tokenizer<S>) -> Self {
        Self {
            tokenizer,
            peeked: None,
        }
    }

    /// Look at the next span without consuming it.
    pub fn peek(&mut self) -> Result<Option<&Span>, TokenizeError> {
        if self.peeked.is_none() {
            let next = self.tokenizer.pull()?;
            self.peeked = Some(next);
        }
        Ok(self.peeked.as_ref().and_then(Option::as_ref))
    }

    pub fn has_next(&mut self) -> Result<bool, TokenizeError> {
        Ok(self.peek()?.is_some())
    }

    /// Take the next span. Taking past the end is an error, not `None`.
    pub fn next_span(&mut self) -> Result<Span, TokenizeError> {
        let next = match self.peeked.take() {
            Some(peeked) => peeked,
            None => self.tokenizer.pull()?,
        };
        next.ok_or(TokenizeError::Exhausted)
    }
}

impl<S: CharSource> Iterator for Spans<'_, S> {
    type Item = Result<Span, TokenizeError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.peeked.take() {
            Some(peeked) => peeked.map(Ok),
            None => self.tokenizer.pull().transpose(),
        }
    }
}

// `pull` keeps returning `Ok(None)` once the sequence has ended or failed.
impl<S: CharSource> FusedIterator for Spans<'_, S> {}

impl<S> Drop for Spans<'_, S> {
    fn drop(&mut self) {
        // A peeked span belongs to the next view.
        if let Some(Some(span)) = self.peeked.take() {
            self.tokenizer.unread(span);
        }
    }
}
