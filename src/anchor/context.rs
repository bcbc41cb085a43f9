//! Context extraction
//!
//! Slices a selection and the text around it out of a document body. All
//! offsets are character offsets.

use serde::{Deserialize, Serialize};

use super::error::{AnchorError, AnchorResult};

/// Default number of characters captured on each side of a selection
pub const DEFAULT_CONTEXT_LENGTH: usize = 100;

/// A selection and its surrounding context windows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorContext {
    pub selected_text: String,
    pub context_before: String,
    pub context_after: String,
}

/// Extract the selection `start..end` and up to `context_length` characters
/// on either side of it.
///
/// The selection bounds are validated, never clamped. The context windows
/// are clamped to the document and may come back shorter than requested.
pub fn extract_context(
    full_text: &str,
    start_offset: usize,
    end_offset: usize,
    context_length: usize,
) -> AnchorResult<AnchorContext> {
    let bounds = char_boundaries(full_text);
    let len = bounds.len() - 1;

    if start_offset > end_offset || end_offset > len {
        return Err(AnchorError::OutOfRange {
            start: start_offset,
            end: end_offset,
            len,
        });
    }

    let before_start = start_offset.saturating_sub(context_length);
    let after_end = end_offset.saturating_add(context_length).min(len);

    Ok(AnchorContext {
        selected_text: full_text[bounds[start_offset]..bounds[end_offset]].to_string(),
        context_before: full_text[bounds[before_start]..bounds[start_offset]].to_string(),
        context_after: full_text[bounds[end_offset]..bounds[after_end]].to_string(),
    })
}

/// Byte offset of every character boundary in `text`.
///
/// Entry `i` is where character `i` starts; the final entry is `text.len()`,
/// so the vector always has `char_count + 1` entries.
pub(crate) fn char_boundaries(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()))
        .collect()
}
