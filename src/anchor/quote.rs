//! Approximate relocation by normalized quote search
//!
//! Optional fallback for when no window digest matches, typically because
//! the re-extracted text reflowed whitespace so the original window no
//! longer spans the same number of characters. The stored context is
//! searched in document order over normalized text and the hit is mapped
//! back to raw character offsets.

use super::context::AnchorContext;
use super::normalize::{normalize, normalize_with_map};
use super::selection::SelectionRange;
use super::types::{MatchResult, MatchType};

/// Find the stored quote (`before + selected + after`) in `document`.
///
/// The first occurrence wins. Returns `None` when the quote or the selection
/// normalizes to nothing, or when the quote is absent.
pub fn locate_quote(context: &AnchorContext, document: &str) -> Option<MatchResult> {
    if normalize(&context.selected_text).is_empty() {
        return None;
    }

    let before_chars = context.context_before.chars().count();
    let selected_chars = context.selected_text.chars().count();

    let mut raw_quote = String::with_capacity(
        context.context_before.len() + context.selected_text.len() + context.context_after.len(),
    );
    raw_quote.push_str(&context.context_before);
    raw_quote.push_str(&context.selected_text);
    raw_quote.push_str(&context.context_after);

    let (quote, quote_map) = normalize_with_map(&raw_quote);
    if quote.is_empty() {
        return None;
    }

    // Normalized span of the selection inside the quote
    let sel_start = quote_map.iter().position(|&raw| raw >= before_chars)?;
    let sel_end = quote_map
        .iter()
        .rposition(|&raw| raw < before_chars + selected_chars)
        .map(|last| last + 1)?;
    if sel_end <= sel_start {
        return None;
    }

    let (haystack, doc_map) = normalize_with_map(document);
    let byte_hit = haystack.find(&quote)?;
    let hit = haystack[..byte_hit].chars().count();

    let selection = SelectionRange {
        start_offset: doc_map[hit + sel_start],
        end_offset: doc_map[hit + sel_end - 1] + 1,
    };

    tracing::debug!(
        offset = doc_map[hit],
        start = selection.start_offset,
        end = selection.end_offset,
        "Quote matched after exact scan miss"
    );

    Some(MatchResult {
        offset: doc_map[hit],
        match_type: MatchType::Approximate,
        selection: Some(selection),
    })
}
