//! Comment module
//!
//! Comment records carry the text anchor they were created with. Storage
//! sits behind [`CommentStore`] so the anchoring flow does not care whether
//! comments live in memory or in SQLite.

mod sqlite;
mod store;
mod types;

pub use sqlite::{create_pool, SqliteCommentStore};
pub use store::{CommentStore, MemoryCommentStore, FEED_LIMIT};
pub use types::{AnchorSelection, Comment, NewComment, PlacedComment};
