//! Minimal post repository.
//!
//! Posts are owned by the content layer upstream; this crate keeps just
//! enough of them persisted for bookmark foreign keys and cascade behavior
//! to be real.

use rusqlite::{params, Connection, Row};

use crate::model::post::{PostId, PostRecord};
use crate::model::profile::ProfileId;
use crate::repo::{ensure_connection_ready, RepoResult};

const POST_SELECT_SQL: &str = "SELECT
    id,
    author_profile_id,
    content,
    created_at
FROM posts";

const REQUIRED_COLUMNS: &[&str] = &["id", "author_profile_id", "content", "created_at"];

/// Repository interface for referenced posts.
pub trait PostRepository {
    /// Inserts one post and returns its store-assigned id.
    fn create_post(&self, author: ProfileId, content: &str) -> RepoResult<PostId>;
    /// Gets one post by surrogate id.
    fn get_post(&self, id: PostId) -> RepoResult<Option<PostRecord>>;
}

/// SQLite-backed post repository.
pub struct SqlitePostRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[("posts", REQUIRED_COLUMNS)])?;
        Ok(Self { conn })
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn create_post(&self, author: ProfileId, content: &str) -> RepoResult<PostId> {
        self.conn.execute(
            "INSERT INTO posts (author_profile_id, content) VALUES (?1, ?2);",
            params![author, content],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_post(&self, id: PostId) -> RepoResult<Option<PostRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POST_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_post_row(row)?));
        }
        Ok(None)
    }
}

fn parse_post_row(row: &Row<'_>) -> RepoResult<PostRecord> {
    Ok(PostRecord {
        id: row.get("id")?,
        author_profile_id: row.get("author_profile_id")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
    })
}
