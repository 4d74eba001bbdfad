//! Community profile domain model.
//!
//! # Responsibility
//! - Define the profile record projected from `community_profiles` rows.
//! - Represent external account identity (`UserRef`) without pulling the
//!   full user aggregate into this crate.
//!
//! # Invariants
//! - `nickname` is globally unique; the store enforces it.
//! - Each external user owns at most one profile (`user_id` unique).
//! - Counter fields are maintained by external collaborators and read here.
//!
//! # See also
//! - docs/architecture/data-model.md

use serde::{Deserialize, Serialize};

/// Store-assigned surrogate key for community profiles.
pub type ProfileId = i64;

/// Identifier of the external account that owns a profile.
pub type UserId = i64;

/// Lightweight reference to an external user account.
///
/// The full user aggregate (credentials, email, roles) lives outside this
/// crate; lookups only need its stable id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: UserId,
}

/// Community presence of one external user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityProfile {
    /// Store-assigned surrogate key.
    pub id: ProfileId,
    /// Owning external account. Unique across profiles.
    pub user_id: UserId,
    /// Globally unique handle used for exact lookup and collision checks.
    pub nickname: String,
    /// Free-form name shown in feeds; searchable by substring.
    pub display_name: String,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    /// Private profiles are excluded from directory queries.
    pub is_public: bool,
    pub allow_follow: bool,
    /// Denormalized counters owned by external collaborators.
    pub posts_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
    /// Epoch milliseconds, store-assigned at insert.
    pub created_at: i64,
    /// Epoch milliseconds, bumped by every profile mutation.
    pub updated_at: i64,
}

impl CommunityProfile {
    /// Returns whether this profile is owned by the given external account.
    pub fn owned_by(&self, user: &UserRef) -> bool {
        self.user_id == user.id
    }
}
