//! Anchor and match types

use serde::{Deserialize, Serialize};

use super::context::{extract_context, AnchorContext};
use super::error::{AnchorError, AnchorResult};
use super::fingerprint::{fingerprint, Fingerprint};
use super::selection::{resolve_selection, SelectionRange};

/// A commented span identified by its content rather than its position.
///
/// The fingerprint is always derived from the selection and context held by
/// the anchor; there is no way to set it independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnchor {
    selected_text: String,
    context_before: String,
    context_after: String,
    start_offset: usize,
    end_offset: usize,
    fingerprint: Fingerprint,
}

impl TextAnchor {
    /// Build an anchor for the character range `start..end` of `full_text`
    pub fn from_range(
        full_text: &str,
        start_offset: usize,
        end_offset: usize,
        context_length: usize,
    ) -> AnchorResult<Self> {
        let context = extract_context(full_text, start_offset, end_offset, context_length)?;
        Ok(Self::from_context(context, start_offset, end_offset))
    }

    /// Build an anchor from a live user selection.
    ///
    /// The selection is trimmed first, then resolved to its first literal
    /// occurrence in `full_text`.
    pub fn from_selection(
        selected: &str,
        full_text: &str,
        context_length: usize,
    ) -> AnchorResult<Self> {
        let range =
            resolve_selection(selected.trim(), full_text).ok_or(AnchorError::SelectionNotFound)?;
        Self::from_range(full_text, range.start_offset, range.end_offset, context_length)
    }

    fn from_context(context: AnchorContext, start_offset: usize, end_offset: usize) -> Self {
        let fingerprint = fingerprint(
            &context.selected_text,
            &context.context_before,
            &context.context_after,
        );
        Self {
            selected_text: context.selected_text,
            context_before: context.context_before,
            context_after: context.context_after,
            start_offset,
            end_offset,
            fingerprint,
        }
    }

    pub fn selected_text(&self) -> &str {
        &self.selected_text
    }

    pub fn context_before(&self) -> &str {
        &self.context_before
    }

    pub fn context_after(&self) -> &str {
        &self.context_after
    }

    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn range(&self) -> SelectionRange {
        SelectionRange {
            start_offset: self.start_offset,
            end_offset: self.end_offset,
        }
    }

    /// Midpoint of the original selection (display hint only)
    pub fn character_offset(&self) -> usize {
        self.range().midpoint()
    }

    /// Copy of the selection and context triple
    pub fn context(&self) -> AnchorContext {
        AnchorContext {
            selected_text: self.selected_text.clone(),
            context_before: self.context_before.clone(),
            context_after: self.context_after.clone(),
        }
    }

    /// Everything needed to relocate this anchor later
    pub fn relocation_target(&self) -> RelocationTarget {
        RelocationTarget {
            fingerprint: self.fingerprint.clone(),
            context: Some(self.context()),
        }
    }
}

/// How a placement was recovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Window digest equals the stored fingerprint
    Exact,
    /// Normalized quote search, used when the exact scan fails
    Approximate,
}

/// A recovered placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// Character offset where the matched window begins
    pub offset: usize,
    pub match_type: MatchType,
    /// Raw range of the selected text, when the matcher can tell
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionRange>,
}

impl MatchResult {
    pub fn exact(offset: usize) -> Self {
        Self {
            offset,
            match_type: MatchType::Exact,
            selection: None,
        }
    }
}

/// What the relocator needs to find an anchor again
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelocationTarget {
    pub fingerprint: Fingerprint,
    /// Stored selection and context; enables the quote fallback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<AnchorContext>,
}

impl RelocationTarget {
    pub fn fingerprint_only(fingerprint: Fingerprint) -> Self {
        Self {
            fingerprint,
            context: None,
        }
    }
}
