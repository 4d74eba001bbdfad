//! Post bookmark repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Own the bookmark write/read path used by the post API layer.
//! - Keep the (user, post) pair uniqueness entirely in the store.
//!
//! # Invariants
//! - `add_bookmark` never pre-checks for duplicates; concurrent attempts
//!   for the same pair are serialized by the store and the loser sees
//!   `ConstraintViolation`.
//! - Bookmark listings are ordered `created_at DESC, id DESC` (newest
//!   first, stable within one millisecond).
//!
//! # See also
//! - docs/architecture/data-model.md

use rusqlite::{params, Connection, Row};

use crate::model::bookmark::{BookmarkId, PostBookmark};
use crate::model::post::PostId;
use crate::model::profile::ProfileId;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};

const BOOKMARK_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    post_id,
    created_at
FROM post_bookmarks";

const BOOKMARKS_DEFAULT_LIMIT: u32 = 20;
const BOOKMARKS_LIMIT_MAX: u32 = 100;

const REQUIRED_COLUMNS: &[&str] = &["id", "user_id", "post_id", "created_at"];

/// Pagination options for a user's bookmark listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkListQuery {
    /// Maximum rows to return. Defaults to 20 and clamps to 100.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: u32,
}

/// Repository interface for post bookmarks.
pub trait BookmarkRepository {
    /// Inserts one bookmark and returns the stored record.
    fn add_bookmark(&self, user_id: ProfileId, post_id: PostId) -> RepoResult<PostBookmark>;
    /// Deletes the bookmark for the given pair.
    fn remove_bookmark(&self, user_id: ProfileId, post_id: PostId) -> RepoResult<()>;
    /// Gets one bookmark by surrogate id.
    fn get_bookmark(&self, id: BookmarkId) -> RepoResult<Option<PostBookmark>>;
    /// Gets the bookmark for the given pair, if any.
    fn find_bookmark(
        &self,
        user_id: ProfileId,
        post_id: PostId,
    ) -> RepoResult<Option<PostBookmark>>;
    /// Returns whether the given profile bookmarked the given post.
    fn is_bookmarked(&self, user_id: ProfileId, post_id: PostId) -> RepoResult<bool>;
    /// Lists one profile's bookmarks, newest first.
    fn list_bookmarks_for_user(
        &self,
        user_id: ProfileId,
        query: &BookmarkListQuery,
    ) -> RepoResult<Vec<PostBookmark>>;
    /// Counts bookmarks pointing at one post.
    fn count_for_post(&self, post_id: PostId) -> RepoResult<u64>;
}

/// SQLite-backed bookmark repository.
pub struct SqliteBookmarkRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookmarkRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[("post_bookmarks", REQUIRED_COLUMNS)])?;
        Ok(Self { conn })
    }
}

impl BookmarkRepository for SqliteBookmarkRepository<'_> {
    fn add_bookmark(&self, user_id: ProfileId, post_id: PostId) -> RepoResult<PostBookmark> {
        self.conn.execute(
            "INSERT INTO post_bookmarks (user_id, post_id) VALUES (?1, ?2);",
            params![user_id, post_id],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_bookmark(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("bookmark {id} missing after insert"))
        })
    }

    fn remove_bookmark(&self, user_id: ProfileId, post_id: PostId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM post_bookmarks WHERE user_id = ?1 AND post_id = ?2;",
            params![user_id, post_id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "post bookmark",
                key: format!("user={user_id} post={post_id}"),
            });
        }

        Ok(())
    }

    fn get_bookmark(&self, id: BookmarkId) -> RepoResult<Option<PostBookmark>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOKMARK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_bookmark_row(row)?));
        }
        Ok(None)
    }

    fn find_bookmark(
        &self,
        user_id: ProfileId,
        post_id: PostId,
    ) -> RepoResult<Option<PostBookmark>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BOOKMARK_SELECT_SQL} WHERE user_id = ?1 AND post_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![user_id, post_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_bookmark_row(row)?));
        }
        Ok(None)
    }

    fn is_bookmarked(&self, user_id: ProfileId, post_id: PostId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM post_bookmarks
                WHERE user_id = ?1 AND post_id = ?2
            );",
            params![user_id, post_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn list_bookmarks_for_user(
        &self,
        user_id: ProfileId,
        query: &BookmarkListQuery,
    ) -> RepoResult<Vec<PostBookmark>> {
        let limit = normalize_bookmark_limit(query.limit);
        let mut stmt = self.conn.prepare(&format!(
            "{BOOKMARK_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2 OFFSET ?3;"
        ))?;

        let mut rows = stmt.query(params![
            user_id,
            i64::from(limit),
            i64::from(query.offset)
        ])?;
        let mut bookmarks = Vec::new();
        while let Some(row) = rows.next()? {
            bookmarks.push(parse_bookmark_row(row)?);
        }
        Ok(bookmarks)
    }

    fn count_for_post(&self, post_id: PostId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM post_bookmarks WHERE post_id = ?1;",
            params![post_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

/// Normalizes the bookmark listing limit.
pub fn normalize_bookmark_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) => BOOKMARKS_DEFAULT_LIMIT,
        Some(value) if value > BOOKMARKS_LIMIT_MAX => BOOKMARKS_LIMIT_MAX,
        Some(value) => value,
        None => BOOKMARKS_DEFAULT_LIMIT,
    }
}

fn parse_bookmark_row(row: &Row<'_>) -> RepoResult<PostBookmark> {
    Ok(PostBookmark {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        post_id: row.get("post_id")?,
        created_at: row.get("created_at")?,
    })
}
