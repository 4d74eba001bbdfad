//! Bookmark use-case service.
//!
//! # Responsibility
//! - Provide bookmark/unbookmark entry points for the post API layer.
//! - Name the "already bookmarked" condition when the store rejects a
//!   duplicate pair; presenting it to users belongs to the caller.
//!
//! # Invariants
//! - The service never pre-checks the pair before inserting; the store's
//!   uniqueness constraint is the only arbiter under concurrency.

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::model::bookmark::PostBookmark;
use crate::model::post::PostId;
use crate::model::profile::ProfileId;
use crate::repo::bookmark_repo::{BookmarkListQuery, BookmarkRepository};
use crate::repo::{RepoError, RepoResult};

/// Service error for bookmark use-cases.
#[derive(Debug)]
pub enum BookmarkServiceError {
    /// The profile already bookmarked this post.
    AlreadyBookmarked { user_id: ProfileId, post_id: PostId },
    /// No bookmark exists for this pair.
    BookmarkNotFound { user_id: ProfileId, post_id: PostId },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for BookmarkServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyBookmarked { user_id, post_id } => {
                write!(f, "profile {user_id} already bookmarked post {post_id}")
            }
            Self::BookmarkNotFound { user_id, post_id } => {
                write!(f, "no bookmark by profile {user_id} on post {post_id}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BookmarkServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for BookmarkServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Bookmark service facade over repository implementations.
pub struct BookmarkService<R: BookmarkRepository> {
    repo: R,
}

impl<R: BookmarkRepository> BookmarkService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Bookmarks one post for one profile.
    ///
    /// A duplicate pair surfaces as `AlreadyBookmarked`; constraint
    /// failures for other reasons (unknown profile or post) pass through
    /// unchanged.
    pub fn bookmark_post(
        &self,
        user_id: ProfileId,
        post_id: PostId,
    ) -> Result<PostBookmark, BookmarkServiceError> {
        match self.repo.add_bookmark(user_id, post_id) {
            Ok(bookmark) => Ok(bookmark),
            Err(RepoError::ConstraintViolation { detail }) => {
                if self.repo.is_bookmarked(user_id, post_id)? {
                    Err(BookmarkServiceError::AlreadyBookmarked { user_id, post_id })
                } else {
                    Err(BookmarkServiceError::Repo(RepoError::ConstraintViolation {
                        detail,
                    }))
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Removes one profile's bookmark from one post.
    pub fn unbookmark_post(
        &self,
        user_id: ProfileId,
        post_id: PostId,
    ) -> Result<(), BookmarkServiceError> {
        match self.repo.remove_bookmark(user_id, post_id) {
            Ok(()) => Ok(()),
            Err(RepoError::NotFound { .. }) => {
                Err(BookmarkServiceError::BookmarkNotFound { user_id, post_id })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Returns whether the profile bookmarked the post.
    pub fn is_bookmarked(&self, user_id: ProfileId, post_id: PostId) -> RepoResult<bool> {
        self.repo.is_bookmarked(user_id, post_id)
    }

    /// Lists one profile's bookmarks, newest first.
    pub fn list_bookmarks(
        &self,
        user_id: ProfileId,
        query: &BookmarkListQuery,
    ) -> RepoResult<Vec<PostBookmark>> {
        self.repo.list_bookmarks_for_user(user_id, query)
    }

    /// Counts bookmarks pointing at one post.
    pub fn bookmarks_count(&self, post_id: PostId) -> RepoResult<u64> {
        self.repo.count_for_post(post_id)
    }
}
