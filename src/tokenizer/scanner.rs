//! Incremental scanning of a raw character stream
//!
//! The leaf layer grows an accumulator one character at a time and re-runs its
//! pattern over the whole accumulator after every character.
//!
//! Deferred commit:
//!     A match is accepted only when at least one character follows it in the
//!     accumulator. A match that ends exactly at the tail could still grow once
//!     more input arrives (`[0-9]+` over `"12"` may become `"123"`), so it is
//!     left pending. When a match is accepted the accumulator is split into the
//!     unrecognized prefix and the recognized match, and everything up to the
//!     match end is dropped from the accumulator.
//!
//! End of stream:
//!     Whatever is left in the accumulator is flushed according to the
//!     [`FlushPolicy`]. The default flushes it as a single unrecognized span, so
//!     a match still waiting for confirmation (`"5"` under `[0-9]+`) comes out
//!     unrecognized.

use super::engine::FlushPolicy;
use super::pattern::Pattern;
use super::source::CharSource;
use super::span::Span;
use std::collections::VecDeque;
use std::io;

/// Outcome of one scanning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// At least one span was queued; the stream may have more.
    Produced,
    /// The stream has ended. The final flush, if any, has been queued.
    Finished,
}

/// Scanning state for a raw-stream upstream.
pub struct StreamScanner<S> {
    source: S,
    /// Read but not yet resolved into spans.
    accumulator: String,
    /// Byte offset of `accumulator[0]` in the raw input.
    offset: usize,
    at_eof: bool,
}

impl<S: CharSource> StreamScanner<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            accumulator: String::new(),
            offset: 0,
            at_eof: false,
        }
    }

    pub fn pending_text(&self) -> &str {
        &self.accumulator
    }

    /// Read until at least one span has been queued or the stream ends.
    ///
    /// Spans are appended to `out` in input order; blank spans are queued too
    /// and left for the caller to elide.
    pub fn scan(
        &mut self,
        pattern: &Pattern,
        flush: FlushPolicy,
        out: &mut VecDeque<Span>,
    ) -> io::Result<ScanStatus> {
        if self.at_eof {
            return Ok(ScanStatus::Finished);
        }

        let queued = out.len();
        while out.len() == queued {
            match self.source.read_char()? {
                Some(ch) => {
                    self.accumulator.push(ch);
                    self.try_commit(pattern, out);
                }
                None => {
                    self.at_eof = true;
                    self.flush(pattern, flush, out);
                    return Ok(ScanStatus::Finished);
                }
            }
        }

        Ok(ScanStatus::Produced)
    }

    fn try_commit(&mut self, pattern: &Pattern, out: &mut VecDeque<Span>) {
        let Some(found) = pattern.find(&self.accumulator) else {
            return;
        };
        if found.end >= self.accumulator.len() {
            return;
        }

        tracing::trace!(
            offset = self.offset + found.start,
            text = &self.accumulator[found.clone()],
            "committed match"
        );
        out.push_back(Span::unrecognized(
            &self.accumulator[..found.start],
            self.offset,
        ));
        out.push_back(Span::recognized(
            &self.accumulator[found.clone()],
            self.offset + found.start,
        ));
        self.accumulator.drain(..found.end);
        self.offset += found.end;
    }

    fn flush(&mut self, pattern: &Pattern, policy: FlushPolicy, out: &mut VecDeque<Span>) {
        let rest = std::mem::take(&mut self.accumulator);
        tracing::debug!(
            bytes = rest.len(),
            policy = ?policy,
            "end of stream, flushing accumulator"
        );

        if policy == FlushPolicy::Rematch {
            // `emitted` trails `search` when empty matches are stepped over.
            let mut emitted = 0;
            let mut search = 0;
            while let Some(found) = pattern.find(&rest[search..]) {
                let (start, end) = (search + found.start, search + found.end);
                if start == end {
                    match rest[start..].chars().next() {
                        Some(ch) => {
                            search = start + ch.len_utf8();
                            continue;
                        }
                        None => break,
                    }
                }
                out.push_back(Span::unrecognized(
                    &rest[emitted..start],
                    self.offset + emitted,
                ));
                out.push_back(Span::recognized(&rest[start..end], self.offset + start));
                emitted = end;
                search = end;
            }
            out.push_back(Span::unrecognized(&rest[emitted..], self.offset + emitted));
            self.offset += rest.len();
        } else {
            out.push_back(Span::unrecognized(rest.as_str(), self.offset));
            self.offset += rest.len();
        }
    }
}
