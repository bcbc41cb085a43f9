//! Comment record types
//!
//! A comment carries the anchor it was created with. Comments are deleted,
//! never edited, so the anchor fields are fixed once stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::anchor::{AnchorContext, Fingerprint, MatchResult, RelocationTarget, TextAnchor};

/// A stored comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Unique identifier (UUID)
    pub id: String,
    /// Author
    pub user_id: String,
    /// The text (book, article) this comment belongs to
    pub text_id: String,
    pub comment_text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph_number: Option<i64>,
    /// Midpoint of the original selection; a display hint, not used to
    /// re-anchor
    pub character_offset: i64,

    pub selected_text: String,
    pub context_before: String,
    pub context_after: String,
    pub fingerprint: Fingerprint,

    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How the creator identified the commented span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AnchorSelection {
    /// Explicit character offsets into the logical text
    #[serde(rename_all = "camelCase")]
    Range { start_offset: usize, end_offset: usize },
    /// The raw selected string, resolved to its first occurrence
    Text { selected: String },
}

/// Data needed to create a comment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub text_id: String,
    pub comment_text: String,
    pub selection: AnchorSelection,
    #[serde(default)]
    pub chapter: Option<String>,
    #[serde(default)]
    pub page_number: Option<i64>,
    #[serde(default)]
    pub paragraph_number: Option<i64>,
    #[serde(default = "default_public")]
    pub is_public: bool,
}

fn default_public() -> bool {
    true
}

/// A comment together with where it landed in the current document
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedComment {
    pub comment: Comment,
    /// `None` when the anchor could not be recovered
    pub placement: Option<MatchResult>,
}

impl PlacedComment {
    pub fn is_anchored(&self) -> bool {
        self.placement.is_some()
    }
}

impl Comment {
    /// Build a new comment record from a freshly created anchor
    pub fn new(user_id: &str, request: &NewComment, anchor: &TextAnchor) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            text_id: request.text_id.clone(),
            comment_text: request.comment_text.clone(),
            chapter: request.chapter.clone(),
            page_number: request.page_number,
            paragraph_number: request.paragraph_number,
            character_offset: anchor.character_offset() as i64,
            selected_text: anchor.selected_text().to_string(),
            context_before: anchor.context_before().to_string(),
            context_after: anchor.context_after().to_string(),
            fingerprint: anchor.fingerprint().clone(),
            is_public: request.is_public,
            created_at: now,
            updated_at: now,
        }
    }

    /// Stored selection and context
    pub fn anchor_context(&self) -> AnchorContext {
        AnchorContext {
            selected_text: self.selected_text.clone(),
            context_before: self.context_before.clone(),
            context_after: self.context_after.clone(),
        }
    }

    pub fn relocation_target(&self) -> RelocationTarget {
        RelocationTarget {
            fingerprint: self.fingerprint.clone(),
            context: Some(self.anchor_context()),
        }
    }
}
