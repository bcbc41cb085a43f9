//! Annotation service
//!
//! Ties the anchoring engine to comment storage: builds anchors when a
//! comment is created and places stored comments back onto the current
//! text when a page or section is displayed.

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::anchor::{AnchorError, Relocator, TextAnchor};
use crate::comments::{
    AnchorSelection, Comment, CommentStore, NewComment, PlacedComment, FEED_LIMIT,
};
use crate::config::Config;
use crate::error::{AppError, Result};

/// Comment creation, listing, placement and deletion
#[derive(Clone)]
pub struct AnnotationService {
    store: Arc<dyn CommentStore>,
    relocator: Relocator,
    config: Config,
}

impl AnnotationService {
    pub fn new(store: Arc<dyn CommentStore>, config: Config) -> Self {
        let relocator = Relocator::new(config.relocator());
        Self {
            store,
            relocator,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Anchor a new comment in `document_text` and store it
    pub async fn create_comment(
        &self,
        user_id: &str,
        request: NewComment,
        document_text: &str,
    ) -> Result<Comment> {
        if request.comment_text.trim().is_empty() {
            return Err(AppError::BadRequest("Comment text is required".to_string()));
        }

        let context_length = self.config.anchor.context_length;
        let anchor = match &request.selection {
            AnchorSelection::Range {
                start_offset,
                end_offset,
            } => TextAnchor::from_range(document_text, *start_offset, *end_offset, context_length),
            AnchorSelection::Text { selected } => {
                TextAnchor::from_selection(selected, document_text, context_length)
            }
        }
        .map_err(|e| {
            tracing::debug!(text_id = %request.text_id, error = %e, "Cannot anchor selection");
            anchor_rejection(e)
        })?;

        self.check_limits(&anchor)?;

        let comment = Comment::new(user_id, &request, &anchor);
        self.store.insert(&comment).await?;

        tracing::info!(
            comment_id = %comment.id,
            text_id = %comment.text_id,
            user_id = %user_id,
            offset = comment.character_offset,
            "Created anchored comment"
        );

        Ok(comment)
    }

    /// Public comments on a text, in document order
    pub async fn comments_for_text(&self, text_id: &str) -> Result<Vec<Comment>> {
        self.store.list_for_text(text_id).await
    }

    /// Recent public comments from the authors a reader follows
    pub async fn feed(&self, following_ids: &[String]) -> Result<Vec<Comment>> {
        self.store.list_by_authors(following_ids, FEED_LIMIT).await
    }

    /// Relocate every public comment on `text_id` within `document_text`.
    ///
    /// Comments that cannot be recovered (including those whose scan ran out
    /// of time) come back with no placement. Output keeps store order.
    pub async fn place_comments(
        &self,
        text_id: &str,
        document_text: &str,
    ) -> Result<Vec<PlacedComment>> {
        let comments = self.store.list_for_text(text_id).await?;
        let document: Arc<str> = Arc::from(document_text);
        let width = self.config.anchor.relocate_concurrency.max(1);

        let placed: Vec<PlacedComment> = stream::iter(comments)
            .map(|comment| {
                let relocator = self.relocator.clone();
                let document = Arc::clone(&document);
                async move {
                    let placement = match relocator
                        .relocate(comment.relocation_target(), document)
                        .await
                    {
                        Ok(placement) => placement,
                        Err(e) => {
                            tracing::warn!(
                                comment_id = %comment.id,
                                error = %e,
                                "Relocation failed, leaving comment unanchored"
                            );
                            None
                        }
                    };
                    PlacedComment { comment, placement }
                }
            })
            .buffered(width)
            .collect()
            .await;

        let anchored = placed.iter().filter(|p| p.is_anchored()).count();
        tracing::info!(
            text_id = %text_id,
            total = placed.len(),
            anchored,
            "Placed comments"
        );

        Ok(placed)
    }

    /// Delete a comment; only its author may do so
    pub async fn delete_comment(&self, user_id: &str, comment_id: &str) -> Result<()> {
        let comment = self
            .store
            .get(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", comment_id)))?;

        if comment.user_id != user_id {
            return Err(AppError::Forbidden(
                "You can only delete your own comments".to_string(),
            ));
        }

        self.store.delete(comment_id).await?;
        tracing::info!(comment_id = %comment_id, user_id = %user_id, "Deleted comment");
        Ok(())
    }

    fn check_limits(&self, anchor: &TextAnchor) -> Result<()> {
        let limits = &self.config.limits;
        let selected = anchor.selected_text().chars().count();

        if selected == 0 || selected > limits.max_selected_chars {
            return Err(AppError::BadRequest(format!(
                "Selected text must be 1 to {} characters, got {}",
                limits.max_selected_chars, selected
            )));
        }

        let longest_context = anchor
            .context_before()
            .chars()
            .count()
            .max(anchor.context_after().chars().count());
        if longest_context > limits.max_context_chars {
            return Err(AppError::BadRequest(format!(
                "Context may be at most {} characters, got {}",
                limits.max_context_chars, longest_context
            )));
        }

        Ok(())
    }
}

/// Anchor failures on creation are the caller's fault
fn anchor_rejection(err: AnchorError) -> AppError {
    match err {
        AnchorError::OutOfRange { .. } | AnchorError::SelectionNotFound => {
            AppError::BadRequest(format!("Cannot anchor this selection: {}", err))
        }
        other => AppError::Anchor(other),
    }
}
