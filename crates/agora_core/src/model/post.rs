//! Minimal post record referenced by bookmarks.
//!
//! The full post aggregate (hashtags, categories, like/comment counters,
//! publication state) is owned by the content layer upstream; bookmarks
//! only need a stable id, an author and creation time.

use serde::{Deserialize, Serialize};

use crate::model::profile::ProfileId;

/// Store-assigned surrogate key for posts.
pub type PostId = i64;

/// Referenced post state kept by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: PostId,
    /// Authoring profile; deleting the profile cascades to its posts.
    pub author_profile_id: ProfileId,
    pub content: String,
    /// Epoch milliseconds, store-assigned at insert.
    pub created_at: i64,
}
