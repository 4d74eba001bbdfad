use agora_core::db::open_db_in_memory;
use agora_core::{
    NewProfile, ProfileRepository, ProfileService, ProfileServiceError, ProfileUpdate, RepoError,
    SqliteProfileRepository, UserRef,
};
use rusqlite::{params, Connection};

fn new_profile(user_id: i64, nickname: &str, display_name: &str) -> NewProfile {
    NewProfile {
        user_id,
        nickname: nickname.to_string(),
        display_name: display_name.to_string(),
        bio: None,
        profile_image_url: None,
        is_public: true,
        allow_follow: true,
    }
}

#[test]
fn create_and_lookup_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();

    let id = repo
        .create_profile(&new_profile(7, "alice", "Alice Kim"))
        .unwrap();

    let by_id = repo.get_profile(id).unwrap().unwrap();
    assert_eq!(by_id.user_id, 7);
    assert_eq!(by_id.nickname, "alice");
    assert_eq!(by_id.display_name, "Alice Kim");
    assert!(by_id.is_public);
    assert!(by_id.allow_follow);
    assert_eq!(by_id.followers_count, 0);
    assert_eq!(by_id.posts_count, 0);
    assert!(by_id.created_at > 0);
    assert!(by_id.updated_at > 0);

    let by_user = repo.find_by_user(&UserRef { id: 7 }).unwrap().unwrap();
    assert_eq!(by_user.id, id);
    let by_user_id = repo.find_by_user_id(7).unwrap().unwrap();
    assert_eq!(by_user_id.id, id);
    let by_nickname = repo.find_by_nickname("alice").unwrap().unwrap();
    assert_eq!(by_nickname.id, id);
}

#[test]
fn lookup_misses_are_none_not_errors() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();

    assert!(repo.get_profile(999).unwrap().is_none());
    assert!(repo.find_by_user_id(999).unwrap().is_none());
    assert!(repo.find_by_nickname("ghost").unwrap().is_none());
}

#[test]
fn exists_by_nickname_agrees_with_find_by_nickname() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();

    assert!(!repo.exists_by_nickname("alice").unwrap());
    assert!(repo.find_by_nickname("alice").unwrap().is_none());

    repo.create_profile(&new_profile(1, "alice", "Alice"))
        .unwrap();

    assert!(repo.exists_by_nickname("alice").unwrap());
    assert!(repo.find_by_nickname("alice").unwrap().is_some());
}

#[test]
fn nickname_matching_is_exact() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();

    repo.create_profile(&new_profile(1, "Alice", "Alice"))
        .unwrap();

    assert!(repo.find_by_nickname("Alice").unwrap().is_some());
    assert!(repo.find_by_nickname("alice").unwrap().is_none());
    assert!(!repo.exists_by_nickname("alice").unwrap());
}

#[test]
fn duplicate_nickname_fails_with_constraint_violation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();

    repo.create_profile(&new_profile(1, "alice", "First"))
        .unwrap();
    let err = repo
        .create_profile(&new_profile(2, "alice", "Second"))
        .unwrap_err();

    assert!(matches!(err, RepoError::ConstraintViolation { .. }));
}

#[test]
fn second_profile_for_same_user_fails_with_constraint_violation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();

    repo.create_profile(&new_profile(1, "alice", "First"))
        .unwrap();
    let err = repo
        .create_profile(&new_profile(1, "alice2", "Second"))
        .unwrap_err();

    assert!(matches!(err, RepoError::ConstraintViolation { .. }));
}

#[test]
fn display_name_search_matches_substring_anywhere() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();

    repo.create_profile(&new_profile(1, "alice", "Alice the Builder"))
        .unwrap();
    repo.create_profile(&new_profile(2, "bob", "Bob the Builder"))
        .unwrap();
    repo.create_profile(&new_profile(3, "carol", "Carol"))
        .unwrap();

    let builders = repo.find_by_display_name_containing("the Build").unwrap();
    assert_eq!(builders.len(), 2);

    let middle = repo.find_by_display_name_containing("lice").unwrap();
    assert_eq!(middle.len(), 1);
    assert_eq!(middle[0].nickname, "alice");
}

#[test]
fn display_name_search_is_ascii_case_insensitive() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();

    repo.create_profile(&new_profile(1, "alice", "alice smith"))
        .unwrap();

    let found = repo.find_by_display_name_containing("ALICE").unwrap();
    assert_eq!(found.len(), 1);
}

#[test]
fn display_name_search_treats_wildcards_literally() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();

    repo.create_profile(&new_profile(1, "legit", "100% legit"))
        .unwrap();
    repo.create_profile(&new_profile(2, "plain", "plain name"))
        .unwrap();

    let percent = repo.find_by_display_name_containing("100% l").unwrap();
    assert_eq!(percent.len(), 1);
    assert_eq!(percent[0].nickname, "legit");

    // A bare `%` would match every row if passed through unescaped.
    let literal_percent = repo.find_by_display_name_containing("%").unwrap();
    assert_eq!(literal_percent.len(), 1);
    assert_eq!(literal_percent[0].nickname, "legit");
}

#[test]
fn service_search_skips_store_for_blank_input() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();
    let service = ProfileService::new(repo);

    assert!(service.search_by_display_name("   ").unwrap().is_empty());
}

#[test]
fn register_profile_trims_and_validates_nickname() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();
    let service = ProfileService::new(repo);

    let created = service
        .register_profile(&new_profile(1, "  alice-01 ", "Alice"))
        .unwrap();
    assert_eq!(created.nickname, "alice-01");

    let err = service
        .register_profile(&new_profile(2, "bad nickname", "Broken"))
        .unwrap_err();
    assert!(matches!(err, ProfileServiceError::InvalidNickname(_)));
}

#[test]
fn register_profile_names_the_tripped_uniqueness_rule() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();
    let service = ProfileService::new(repo);

    service
        .register_profile(&new_profile(1, "alice", "Alice"))
        .unwrap();

    let nickname_err = service
        .register_profile(&new_profile(2, "alice", "Impostor"))
        .unwrap_err();
    assert!(matches!(
        nickname_err,
        ProfileServiceError::NicknameTaken(nickname) if nickname == "alice"
    ));

    let owner_err = service
        .register_profile(&new_profile(1, "alice2", "Second Presence"))
        .unwrap_err();
    assert!(matches!(
        owner_err,
        ProfileServiceError::ProfileAlreadyExists(1)
    ));
}

#[test]
fn edit_profile_replaces_fields_and_bumps_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let created_id = {
        let repo = SqliteProfileRepository::try_new(&conn).unwrap();
        repo.create_profile(&new_profile(1, "alice", "Alice"))
            .unwrap()
    };

    zero_updated_at(&conn, created_id);

    let repo = SqliteProfileRepository::try_new(&conn).unwrap();
    let service = ProfileService::new(repo);
    let updated = service
        .edit_profile(
            created_id,
            &ProfileUpdate {
                display_name: "Alice K.".to_string(),
                bio: Some("builder of things".to_string()),
                profile_image_url: None,
                is_public: false,
                allow_follow: false,
            },
        )
        .unwrap();

    assert_eq!(updated.display_name, "Alice K.");
    assert_eq!(updated.bio.as_deref(), Some("builder of things"));
    assert!(!updated.is_public);
    assert!(!updated.allow_follow);
    assert!(updated.updated_at > 0);
    assert_eq!(updated.nickname, "alice");
}

#[test]
fn edit_missing_profile_returns_profile_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();
    let service = ProfileService::new(repo);

    let err = service
        .edit_profile(
            404,
            &ProfileUpdate {
                display_name: "Nobody".to_string(),
                bio: None,
                profile_image_url: None,
                is_public: true,
                allow_follow: true,
            },
        )
        .unwrap_err();

    assert!(matches!(err, ProfileServiceError::ProfileNotFound(404)));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteProfileRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

fn zero_updated_at(conn: &Connection, id: i64) {
    conn.execute(
        "UPDATE community_profiles SET updated_at = 0 WHERE id = ?1;",
        params![id],
    )
    .unwrap();
}
