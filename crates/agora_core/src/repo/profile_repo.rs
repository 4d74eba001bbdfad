//! Community profile repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the profile lookup surface (by owner, nickname, display name,
//!   visibility, follower ranking) with documented filter/sort semantics.
//! - Own the profile write path used by the profile-edit flow upstream.
//!
//! # Invariants
//! - Nickname lookups are exact matches; uniqueness is store-enforced.
//! - Directory queries (`find_public_profiles`,
//!   `find_top_profiles_by_followers`) never return private profiles.
//! - Follower ranking orders by `followers_count DESC, id ASC`; the id
//!   tie-break keeps pagination stable.
//! - Substring search escapes `%`/`_` so user input matches literally; case
//!   behavior is whatever the store defines for `LIKE`.
//!
//! # See also
//! - docs/architecture/data-model.md

use rusqlite::{params, Connection, Row};

use crate::model::profile::{CommunityProfile, ProfileId, UserId, UserRef};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};

const PROFILE_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    nickname,
    display_name,
    bio,
    profile_image_url,
    is_public,
    allow_follow,
    posts_count,
    followers_count,
    following_count,
    created_at,
    updated_at
FROM community_profiles";

const PROFILES_DEFAULT_LIMIT: u32 = 20;
const PROFILES_LIMIT_MAX: u32 = 100;

const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "user_id",
    "nickname",
    "display_name",
    "bio",
    "profile_image_url",
    "is_public",
    "allow_follow",
    "posts_count",
    "followers_count",
    "following_count",
    "created_at",
    "updated_at",
];

/// Input for profile creation.
///
/// Counters and timestamps are store-assigned and intentionally absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub user_id: UserId,
    pub nickname: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub is_public: bool,
    pub allow_follow: bool,
}

/// Editable profile fields, replaced as a whole.
///
/// `nickname` and `user_id` are identity-like and not editable here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub display_name: String,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub is_public: bool,
    pub allow_follow: bool,
}

/// Pagination options for the follower ranking query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopProfilesQuery {
    /// Maximum rows to return. Defaults to 20 and clamps to 100.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: u32,
}

/// Repository interface for community profiles.
pub trait ProfileRepository {
    /// Inserts one profile and returns its store-assigned id.
    fn create_profile(&self, profile: &NewProfile) -> RepoResult<ProfileId>;
    /// Replaces the editable fields of one profile and bumps `updated_at`.
    fn update_profile(&self, id: ProfileId, update: &ProfileUpdate) -> RepoResult<()>;
    /// Gets one profile by surrogate id.
    fn get_profile(&self, id: ProfileId) -> RepoResult<Option<CommunityProfile>>;
    /// Gets the profile owned by the given external account.
    fn find_by_user(&self, user: &UserRef) -> RepoResult<Option<CommunityProfile>>;
    /// Gets the profile owned by the given external account id.
    fn find_by_user_id(&self, user_id: UserId) -> RepoResult<Option<CommunityProfile>>;
    /// Gets one profile by exact nickname.
    fn find_by_nickname(&self, nickname: &str) -> RepoResult<Option<CommunityProfile>>;
    /// Returns whether any profile holds the given nickname.
    fn exists_by_nickname(&self, nickname: &str) -> RepoResult<bool>;
    /// Lists profiles whose display name contains the fragment anywhere.
    fn find_by_display_name_containing(
        &self,
        fragment: &str,
    ) -> RepoResult<Vec<CommunityProfile>>;
    /// Lists all public profiles.
    fn find_public_profiles(&self) -> RepoResult<Vec<CommunityProfile>>;
    /// Lists public profiles ranked by follower count, paginated.
    fn find_top_profiles_by_followers(
        &self,
        query: &TopProfilesQuery,
    ) -> RepoResult<Vec<CommunityProfile>>;
}

/// SQLite-backed profile repository.
pub struct SqliteProfileRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProfileRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[("community_profiles", REQUIRED_COLUMNS)])?;
        Ok(Self { conn })
    }
}

impl ProfileRepository for SqliteProfileRepository<'_> {
    fn create_profile(&self, profile: &NewProfile) -> RepoResult<ProfileId> {
        self.conn.execute(
            "INSERT INTO community_profiles (
                user_id,
                nickname,
                display_name,
                bio,
                profile_image_url,
                is_public,
                allow_follow
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                profile.user_id,
                profile.nickname.as_str(),
                profile.display_name.as_str(),
                profile.bio.as_deref(),
                profile.profile_image_url.as_deref(),
                bool_to_int(profile.is_public),
                bool_to_int(profile.allow_follow),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_profile(&self, id: ProfileId, update: &ProfileUpdate) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE community_profiles
             SET
                display_name = ?2,
                bio = ?3,
                profile_image_url = ?4,
                is_public = ?5,
                allow_follow = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                id,
                update.display_name.as_str(),
                update.bio.as_deref(),
                update.profile_image_url.as_deref(),
                bool_to_int(update.is_public),
                bool_to_int(update.allow_follow),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "community profile",
                key: id.to_string(),
            });
        }

        Ok(())
    }

    fn get_profile(&self, id: ProfileId) -> RepoResult<Option<CommunityProfile>> {
        self.query_single(&format!("{PROFILE_SELECT_SQL} WHERE id = ?1;"), params![id])
    }

    fn find_by_user(&self, user: &UserRef) -> RepoResult<Option<CommunityProfile>> {
        self.find_by_user_id(user.id)
    }

    fn find_by_user_id(&self, user_id: UserId) -> RepoResult<Option<CommunityProfile>> {
        self.query_single(
            &format!("{PROFILE_SELECT_SQL} WHERE user_id = ?1;"),
            params![user_id],
        )
    }

    fn find_by_nickname(&self, nickname: &str) -> RepoResult<Option<CommunityProfile>> {
        self.query_single(
            &format!("{PROFILE_SELECT_SQL} WHERE nickname = ?1;"),
            params![nickname],
        )
    }

    fn exists_by_nickname(&self, nickname: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM community_profiles
                WHERE nickname = ?1
            );",
            [nickname],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn find_by_display_name_containing(
        &self,
        fragment: &str,
    ) -> RepoResult<Vec<CommunityProfile>> {
        let pattern = format!("%{}%", escape_like_pattern(fragment));
        self.query_many(
            &format!(
                "{PROFILE_SELECT_SQL}
                 WHERE display_name LIKE ?1 ESCAPE '\\'
                 ORDER BY id ASC;"
            ),
            params![pattern],
        )
    }

    fn find_public_profiles(&self) -> RepoResult<Vec<CommunityProfile>> {
        self.query_many(
            &format!(
                "{PROFILE_SELECT_SQL}
                 WHERE is_public = 1
                 ORDER BY id ASC;"
            ),
            params![],
        )
    }

    fn find_top_profiles_by_followers(
        &self,
        query: &TopProfilesQuery,
    ) -> RepoResult<Vec<CommunityProfile>> {
        let limit = normalize_profile_limit(query.limit);
        self.query_many(
            &format!(
                "{PROFILE_SELECT_SQL}
                 WHERE is_public = 1
                 ORDER BY followers_count DESC, id ASC
                 LIMIT ?1 OFFSET ?2;"
            ),
            params![i64::from(limit), i64::from(query.offset)],
        )
    }
}

impl SqliteProfileRepository<'_> {
    fn query_single(
        &self,
        sql: &str,
        bind: impl rusqlite::Params,
    ) -> RepoResult<Option<CommunityProfile>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_profile_row(row)?));
        }
        Ok(None)
    }

    fn query_many(
        &self,
        sql: &str,
        bind: impl rusqlite::Params,
    ) -> RepoResult<Vec<CommunityProfile>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        let mut profiles = Vec::new();
        while let Some(row) = rows.next()? {
            profiles.push(parse_profile_row(row)?);
        }
        Ok(profiles)
    }
}

/// Normalizes the follower-ranking limit according to the directory
/// contract.
pub fn normalize_profile_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) => PROFILES_DEFAULT_LIMIT,
        Some(value) if value > PROFILES_LIMIT_MAX => PROFILES_LIMIT_MAX,
        Some(value) => value,
        None => PROFILES_DEFAULT_LIMIT,
    }
}

/// Escapes `%`, `_` and the escape character itself for literal LIKE
/// matching.
fn escape_like_pattern(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for ch in fragment.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn parse_profile_row(row: &Row<'_>) -> RepoResult<CommunityProfile> {
    Ok(CommunityProfile {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        nickname: row.get("nickname")?,
        display_name: row.get("display_name")?,
        bio: row.get("bio")?,
        profile_image_url: row.get("profile_image_url")?,
        is_public: parse_flag(row.get("is_public")?, "community_profiles.is_public")?,
        allow_follow: parse_flag(row.get("allow_follow")?, "community_profiles.allow_follow")?,
        posts_count: row.get("posts_count")?,
        followers_count: row.get("followers_count")?,
        following_count: row.get("following_count")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_flag(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
