//! Selection resolution
//!
//! Maps a raw selected substring onto the logical text of the displayed
//! page or section. When the substring occurs more than once, the first
//! occurrence is taken.

use serde::{Deserialize, Serialize};

/// Character range of a resolved selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRange {
    pub start_offset: usize,
    pub end_offset: usize,
}

impl SelectionRange {
    /// Midpoint of the range, used as a display hint
    pub fn midpoint(&self) -> usize {
        self.start_offset + (self.end_offset - self.start_offset) / 2
    }

    pub fn len(&self) -> usize {
        self.end_offset - self.start_offset
    }

    pub fn is_empty(&self) -> bool {
        self.start_offset == self.end_offset
    }
}

/// Locate the first literal occurrence of `selected` in `full_text`.
///
/// Returns character offsets, or `None` when the substring is absent or
/// empty.
pub fn resolve_selection(selected: &str, full_text: &str) -> Option<SelectionRange> {
    if selected.is_empty() {
        return None;
    }

    let byte_start = full_text.find(selected)?;
    let start_offset = full_text[..byte_start].chars().count();
    let end_offset = start_offset + selected.chars().count();

    Some(SelectionRange {
        start_offset,
        end_offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "The quick brown fox jumps over the lazy dog";

    #[test]
    fn test_resolves_first_occurrence() {
        assert_eq!(
            resolve_selection("brown", DOC),
            Some(SelectionRange {
                start_offset: 10,
                end_offset: 15
            })
        );
    }

    #[test]
    fn test_missing_selection() {
        assert_eq!(resolve_selection("purple", DOC), None);
        assert_eq!(resolve_selection("", DOC), None);
    }

    #[test]
    fn test_repeated_phrase_takes_first() {
        let range = resolve_selection("the", "the cat and the hat").unwrap();
        assert_eq!(range.start_offset, 0);
        assert_eq!(range.end_offset, 3);
    }

    #[test]
    fn test_literal_match_is_case_sensitive() {
        assert_eq!(resolve_selection("Brown", DOC), None);
    }

    #[test]
    fn test_character_offsets_after_multibyte_text() {
        let range = resolve_selection("lait", "café au lait").unwrap();
        assert_eq!(range.start_offset, 8);
        assert_eq!(range.end_offset, 12);
    }

    #[test]
    fn test_midpoint_rounds_down() {
        let range = SelectionRange {
            start_offset: 10,
            end_offset: 15,
        };
        assert_eq!(range.midpoint(), 12);
        assert_eq!(range.len(), 5);
    }
}
