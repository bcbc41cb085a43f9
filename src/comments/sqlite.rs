//! SQLite storage for comments

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::store::CommentStore;
use super::types::Comment;
use crate::anchor::Fingerprint;
use crate::error::{AppError, Result};

/// Create a connection pool and make sure the schema exists
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    SqliteCommentStore::new(pool.clone()).init().await?;

    Ok(pool)
}

/// Comment store backed by a SQLite pool
#[derive(Clone)]
pub struct SqliteCommentStore {
    pool: SqlitePool,
}

impl SqliteCommentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the comments table
    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                text_id TEXT NOT NULL,
                comment_text TEXT NOT NULL,
                chapter TEXT,
                page_number INTEGER,
                paragraph_number INTEGER,
                character_offset INTEGER NOT NULL,
                selected_text TEXT NOT NULL,
                context_before TEXT NOT NULL,
                context_after TEXT NOT NULL,
                fingerprint TEXT NOT NULL,
                is_public INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_comments_text ON comments(text_id, character_offset);
            CREATE INDEX IF NOT EXISTS idx_comments_user ON comments(user_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_comments_fingerprint ON comments(fingerprint);
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CommentStore for SqliteCommentStore {
    async fn insert(&self, comment: &Comment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (
                id, user_id, text_id, comment_text, chapter, page_number,
                paragraph_number, character_offset, selected_text,
                context_before, context_after, fingerprint, is_public,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.user_id)
        .bind(&comment.text_id)
        .bind(&comment.comment_text)
        .bind(&comment.chapter)
        .bind(comment.page_number)
        .bind(comment.paragraph_number)
        .bind(comment.character_offset)
        .bind(&comment.selected_text)
        .bind(&comment.context_before)
        .bind(&comment.context_after)
        .bind(comment.fingerprint.as_str())
        .bind(comment.is_public)
        .bind(format_timestamp(&comment.created_at))
        .bind(format_timestamp(&comment.updated_at))
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            comment_id = %comment.id,
            text_id = %comment.text_id,
            fingerprint = %comment.fingerprint,
            "Stored comment"
        );

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, user_id, text_id, comment_text, chapter, page_number,
                   paragraph_number, character_offset, selected_text,
                   context_before, context_after, fingerprint, is_public,
                   created_at, updated_at
            FROM comments
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CommentRow::into_comment).transpose()
    }

    async fn list_for_text(&self, text_id: &str) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, user_id, text_id, comment_text, chapter, page_number,
                   paragraph_number, character_offset, selected_text,
                   context_before, context_after, fingerprint, is_public,
                   created_at, updated_at
            FROM comments
            WHERE text_id = ? AND is_public = 1
            ORDER BY character_offset ASC, created_at ASC
            "#,
        )
        .bind(text_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CommentRow::into_comment).collect()
    }

    async fn list_by_authors(&self, author_ids: &[String], limit: usize) -> Result<Vec<Comment>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; author_ids.len()].join(", ");
        let sql = format!(
            r#"
            SELECT id, user_id, text_id, comment_text, chapter, page_number,
                   paragraph_number, character_offset, selected_text,
                   context_before, context_after, fingerprint, is_public,
                   created_at, updated_at
            FROM comments
            WHERE is_public = 1 AND user_id IN ({})
            ORDER BY created_at DESC
            LIMIT ?
            "#,
            placeholders
        );

        let mut query = sqlx::query_as::<_, CommentRow>(&sql);
        for author in author_ids {
            query = query.bind(author);
        }
        let rows = query
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(CommentRow::into_comment).collect()
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Database row for comments
#[derive(sqlx::FromRow)]
struct CommentRow {
    id: String,
    user_id: String,
    text_id: String,
    comment_text: String,
    chapter: Option<String>,
    page_number: Option<i64>,
    paragraph_number: Option<i64>,
    character_offset: i64,
    selected_text: String,
    context_before: String,
    context_after: String,
    fingerprint: String,
    is_public: bool,
    created_at: String,
    updated_at: String,
}

impl CommentRow {
    fn into_comment(self) -> Result<Comment> {
        let fingerprint = Fingerprint::from_hex(&self.fingerprint)?;
        let created_at = parse_timestamp(&self.created_at)?;
        let updated_at = parse_timestamp(&self.updated_at)?;

        Ok(Comment {
            id: self.id,
            user_id: self.user_id,
            text_id: self.text_id,
            comment_text: self.comment_text,
            chapter: self.chapter,
            page_number: self.page_number,
            paragraph_number: self.paragraph_number,
            character_offset: self.character_offset,
            selected_text: self.selected_text,
            context_before: self.context_before,
            context_after: self.context_after,
            fingerprint,
            is_public: self.is_public,
            created_at,
            updated_at,
        })
    }
}

/// Fixed-width RFC 3339 so text ordering matches time ordering
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| AppError::Internal(format!("Invalid stored timestamp {:?}: {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::store::test_support::comment;
    use crate::comments::store::FEED_LIMIT;

    async fn setup_test_db() -> SqliteCommentStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteCommentStore::new(pool);
        store.init().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let store = setup_test_db().await;
        let mut c = comment("alice", "book-123", 4, 9, 0);
        c.chapter = Some("Chapter 1".to_string());
        c.page_number = Some(12);
        let id = c.id.clone();

        store.insert(&c).await.unwrap();

        let loaded = store.get(&id).await.unwrap().unwrap();
        assert_eq!(loaded.text_id, "book-123");
        assert_eq!(loaded.selected_text, "quick");
        assert_eq!(loaded.fingerprint, c.fingerprint);
        assert_eq!(loaded.chapter.as_deref(), Some("Chapter 1"));
        assert_eq!(loaded.page_number, Some(12));
        assert_eq!(loaded.paragraph_number, None);
        assert_eq!(loaded.created_at, c.created_at);
    }

    #[tokio::test]
    async fn test_list_for_text() {
        let store = setup_test_db().await;

        store.insert(&comment("alice", "book-a", 35, 39, 0)).await.unwrap();
        store.insert(&comment("alice", "book-a", 4, 9, 0)).await.unwrap();
        store.insert(&comment("bob", "book-b", 4, 9, 0)).await.unwrap();

        let mut hidden = comment("bob", "book-a", 10, 15, 0);
        hidden.is_public = false;
        store.insert(&hidden).await.unwrap();

        let results = store.list_for_text("book-a").await.unwrap();
        let texts: Vec<&str> = results.iter().map(|c| c.selected_text.as_str()).collect();
        assert_eq!(texts, vec!["quick", "lazy"]);
    }

    #[tokio::test]
    async fn test_list_by_authors() {
        let store = setup_test_db().await;

        store.insert(&comment("alice", "book-a", 4, 9, 30)).await.unwrap();
        store.insert(&comment("bob", "book-a", 10, 15, 10)).await.unwrap();
        store.insert(&comment("eve", "book-a", 16, 19, 0)).await.unwrap();

        let authors = vec!["alice".to_string(), "bob".to_string()];
        let feed = store.list_by_authors(&authors, FEED_LIMIT).await.unwrap();
        let users: Vec<&str> = feed.iter().map(|c| c.user_id.as_str()).collect();
        assert_eq!(users, vec!["bob", "alice"]);

        assert!(store.list_by_authors(&[], FEED_LIMIT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = setup_test_db().await;
        let c = comment("alice", "book-123", 4, 9, 0);
        let id = c.id.clone();

        store.insert(&c).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_some());

        assert!(store.delete(&id).await.unwrap());
        assert!(store.get(&id).await.unwrap().is_none());
        assert!(!store.delete(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_file_backed_pool() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("comments.db").display());
        let pool = create_pool(&url).await.unwrap();
        let store = SqliteCommentStore::new(pool);

        let c = comment("alice", "book-1", 4, 9, 0);
        store.insert(&c).await.unwrap();
        assert!(store.get(&c.id).await.unwrap().is_some());
    }
}
