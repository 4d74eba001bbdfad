//! Post bookmark domain model.
//!
//! # Responsibility
//! - Represent the fact "profile U bookmarked post P at time T".
//! - Provide pure ownership predicates for callers that already hold the
//!   record.
//!
//! # Invariants
//! - The (user_id, post_id) pair is unique across all bookmarks; the store
//!   enforces it, application code never pre-checks.
//! - `created_at` is store-assigned once and never mutated.
//! - Both references are required columns; a bookmark without an owner or
//!   a target post is unrepresentable.
//!
//! # See also
//! - docs/architecture/data-model.md

use serde::{Deserialize, Serialize};

use crate::model::post::{PostId, PostRecord};
use crate::model::profile::{CommunityProfile, ProfileId};

/// Store-assigned surrogate key for bookmarks.
pub type BookmarkId = i64;

/// One bookmark row: a profile/post join record with creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostBookmark {
    pub id: BookmarkId,
    /// Bookmarking profile; resolved on demand through the profile
    /// repository.
    pub user_id: ProfileId,
    /// Bookmarked post; resolved on demand through the post repository.
    pub post_id: PostId,
    /// Epoch milliseconds, store-assigned at insert.
    pub created_at: i64,
}

impl PostBookmark {
    /// Returns whether this bookmark belongs to the given profile.
    ///
    /// Used for ownership checks before removal without an extra query.
    pub fn belongs_to_user(&self, profile: &CommunityProfile) -> bool {
        self.user_id == profile.id
    }

    /// Returns whether this bookmark references the given post.
    pub fn references_post(&self, post: &PostRecord) -> bool {
        self.post_id == post.id
    }
}
