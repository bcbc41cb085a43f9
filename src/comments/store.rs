//! Comment storage
//!
//! Persistence is a collaborator of the anchoring engine. The service talks
//! to it through [`CommentStore`]; an in-memory implementation lives here
//! and a SQLite one in `sqlite.rs`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::types::Comment;
use crate::error::Result;

/// Maximum number of comments returned by a feed query
pub const FEED_LIMIT: usize = 50;

/// Key-value style comment persistence
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Store a new comment
    async fn insert(&self, comment: &Comment) -> Result<()>;

    /// Fetch one comment by id
    async fn get(&self, id: &str) -> Result<Option<Comment>>;

    /// Public comments on a text, in document order (by character offset,
    /// then creation time)
    async fn list_for_text(&self, text_id: &str) -> Result<Vec<Comment>>;

    /// Recent public comments by any of the given authors, newest first
    async fn list_by_authors(&self, author_ids: &[String], limit: usize) -> Result<Vec<Comment>>;

    /// Remove a comment; returns whether it existed
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// Process-local store backed by a map
#[derive(Clone, Default)]
pub struct MemoryCommentStore {
    comments: Arc<RwLock<HashMap<String, Comment>>>,
}

impl MemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.comments.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.comments.read().await.is_empty()
    }
}

#[async_trait]
impl CommentStore for MemoryCommentStore {
    async fn insert(&self, comment: &Comment) -> Result<()> {
        let mut comments = self.comments.write().await;
        comments.insert(comment.id.clone(), comment.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Comment>> {
        let comments = self.comments.read().await;
        Ok(comments.get(id).cloned())
    }

    async fn list_for_text(&self, text_id: &str) -> Result<Vec<Comment>> {
        let comments = self.comments.read().await;
        let mut found: Vec<Comment> = comments
            .values()
            .filter(|c| c.text_id == text_id && c.is_public)
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            a.character_offset
                .cmp(&b.character_offset)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(found)
    }

    async fn list_by_authors(&self, author_ids: &[String], limit: usize) -> Result<Vec<Comment>> {
        let comments = self.comments.read().await;
        let mut found: Vec<Comment> = comments
            .values()
            .filter(|c| c.is_public && author_ids.iter().any(|id| id == &c.user_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found.truncate(limit);
        Ok(found)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut comments = self.comments.write().await;
        Ok(comments.remove(id).is_some())
    }
}
