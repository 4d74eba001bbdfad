//! Profile use-case service.
//!
//! # Responsibility
//! - Provide registration/edit entry points with nickname normalization.
//! - Expose every profile lookup with service-level input hygiene.
//! - Name the uniqueness condition that tripped a rejected registration.
//!
//! # Invariants
//! - Nicknames are trimmed and validated before any store write; the store
//!   still owns uniqueness.
//! - Writes are followed by a read-back so callers always receive stored
//!   state, including store-assigned fields.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::model::profile::{CommunityProfile, ProfileId, UserId, UserRef};
use crate::repo::profile_repo::{
    normalize_profile_limit, NewProfile, ProfileRepository, ProfileUpdate, TopProfilesQuery,
};
use crate::repo::{RepoError, RepoResult};

static NICKNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}\p{N}_.\-]{2,20}$").expect("valid nickname regex"));

/// Service error for profile use-cases.
#[derive(Debug)]
pub enum ProfileServiceError {
    /// Nickname failed normalization rules (length, allowed characters).
    InvalidNickname(String),
    /// Another profile already holds the nickname.
    NicknameTaken(String),
    /// The external account already owns a profile.
    ProfileAlreadyExists(UserId),
    /// Target profile does not exist.
    ProfileNotFound(ProfileId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ProfileServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNickname(value) => write!(f, "invalid nickname: `{value}`"),
            Self::NicknameTaken(value) => write!(f, "nickname already taken: `{value}`"),
            Self::ProfileAlreadyExists(user_id) => {
                write!(f, "user {user_id} already has a profile")
            }
            Self::ProfileNotFound(id) => write!(f, "profile not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent profile state: {details}")
            }
        }
    }
}

impl Error for ProfileServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ProfileServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Ranked-listing envelope returned to directory callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopProfilesResult {
    /// Public profiles ordered by `followers_count DESC, id ASC`.
    pub items: Vec<CommunityProfile>,
    /// Effective normalized limit used by the query.
    pub applied_limit: u32,
}

/// Profile service facade over repository implementations.
pub struct ProfileService<R: ProfileRepository> {
    repo: R,
}

impl<R: ProfileRepository> ProfileService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a community profile for an external account.
    ///
    /// The nickname is normalized first; the store then decides which
    /// uniqueness rule, if any, the registration breaks.
    pub fn register_profile(
        &self,
        request: &NewProfile,
    ) -> Result<CommunityProfile, ProfileServiceError> {
        let nickname = normalize_nickname(&request.nickname)?;
        let normalized = NewProfile {
            nickname,
            ..request.clone()
        };

        let id = match self.repo.create_profile(&normalized) {
            Ok(id) => id,
            Err(RepoError::ConstraintViolation { detail }) => {
                if self.repo.exists_by_nickname(&normalized.nickname)? {
                    return Err(ProfileServiceError::NicknameTaken(normalized.nickname));
                }
                if self.repo.find_by_user_id(normalized.user_id)?.is_some() {
                    return Err(ProfileServiceError::ProfileAlreadyExists(
                        normalized.user_id,
                    ));
                }
                return Err(ProfileServiceError::Repo(RepoError::ConstraintViolation {
                    detail,
                }));
            }
            Err(err) => return Err(err.into()),
        };

        self.repo
            .get_profile(id)?
            .ok_or(ProfileServiceError::InconsistentState(
                "created profile not found in read-back",
            ))
    }

    /// Replaces the editable fields of one profile.
    pub fn edit_profile(
        &self,
        id: ProfileId,
        update: &ProfileUpdate,
    ) -> Result<CommunityProfile, ProfileServiceError> {
        match self.repo.update_profile(id, update) {
            Ok(()) => {}
            Err(RepoError::NotFound { .. }) => {
                return Err(ProfileServiceError::ProfileNotFound(id));
            }
            Err(err) => return Err(err.into()),
        }

        self.repo
            .get_profile(id)?
            .ok_or(ProfileServiceError::InconsistentState(
                "updated profile not found in read-back",
            ))
    }

    /// Gets one profile by surrogate id.
    pub fn profile(&self, id: ProfileId) -> RepoResult<Option<CommunityProfile>> {
        self.repo.get_profile(id)
    }

    /// Gets the profile owned by the given external account.
    pub fn profile_for_user(&self, user: &UserRef) -> RepoResult<Option<CommunityProfile>> {
        self.repo.find_by_user(user)
    }

    /// Gets the profile owned by the given external account id.
    pub fn profile_for_user_id(&self, user_id: UserId) -> RepoResult<Option<CommunityProfile>> {
        self.repo.find_by_user_id(user_id)
    }

    /// Gets one profile by exact nickname.
    pub fn profile_by_nickname(&self, nickname: &str) -> RepoResult<Option<CommunityProfile>> {
        self.repo.find_by_nickname(nickname)
    }

    /// Returns whether a nickname is already held by any profile.
    ///
    /// Registration-time collision probe; the store remains authoritative
    /// at insert time.
    pub fn exists_by_nickname(&self, nickname: &str) -> RepoResult<bool> {
        self.repo.exists_by_nickname(nickname)
    }

    /// Searches profiles whose display name contains the fragment.
    ///
    /// A blank fragment matches nothing and skips the store entirely.
    pub fn search_by_display_name(&self, fragment: &str) -> RepoResult<Vec<CommunityProfile>> {
        let trimmed = fragment.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        self.repo.find_by_display_name_containing(trimmed)
    }

    /// Lists all public profiles.
    pub fn public_profiles(&self) -> RepoResult<Vec<CommunityProfile>> {
        self.repo.find_public_profiles()
    }

    /// Lists public profiles ranked by follower count.
    pub fn top_by_followers(
        &self,
        limit: Option<u32>,
        offset: u32,
    ) -> RepoResult<TopProfilesResult> {
        let applied_limit = normalize_profile_limit(limit);
        let query = TopProfilesQuery {
            limit: Some(applied_limit),
            offset,
        };
        let items = self.repo.find_top_profiles_by_followers(&query)?;
        Ok(TopProfilesResult {
            items,
            applied_limit,
        })
    }
}

/// Normalizes one nickname according to the registration contract.
///
/// Rules: surrounding whitespace is dropped; 2 to 20 characters; letters,
/// digits, `_`, `.` and `-` only. Case is preserved because nickname
/// uniqueness is exact.
pub fn normalize_nickname(raw: &str) -> Result<String, ProfileServiceError> {
    let trimmed = raw.trim();
    if NICKNAME_RE.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ProfileServiceError::InvalidNickname(raw.to_string()))
    }
}
