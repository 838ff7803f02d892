//! Re-matching of upstream spans
//!
//! A layered tokenizer never reads raw input. It takes each unrecognized span
//! from its upstream and looks for its own pattern inside that span's text.
//! Recognized upstream spans are passed through by the engine without reaching
//! this module.
//!
//! A span is split at most once: the first match yields three pieces, text
//! before the match, the match, and text after it. The trailing piece is not
//! searched again by this layer.

use super::pattern::Pattern;
use super::span::Span;
use std::collections::VecDeque;

/// Split one unrecognized upstream span with `pattern`, queueing the pieces.
///
/// With a match, three spans are queued even if the outer pieces are empty.
/// Without one, the span is queued unchanged.
pub fn split_unrecognized(pattern: &Pattern, span: Span, out: &mut VecDeque<Span>) {
    debug_assert!(!span.is_recognized());

    let Some(found) = pattern.find(span.text()) else {
        out.push_back(span);
        return;
    };

    let start = span.range().start;
    let text = span.text();
    tracing::trace!(
        offset = start + found.start,
        text = &text[found.clone()],
        "layer match"
    );

    out.push_back(Span::unrecognized(&text[..found.start], start));
    out.push_back(Span::recognized(
        &text[found.clone()],
        start + found.start,
    ));
    out.push_back(Span::unrecognized(&text[found.end..], start + found.end));
}
