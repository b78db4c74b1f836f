//! Tests for database repository operations.

mod common;

use common::setup_test_db;
use scoreboard::{DbErrorKind, NewUser};

#[test]
fn test_create_user() {
    let (_db, repo) = setup_test_db();
    let mut session = repo.session().expect("Session failed");
    let user = session
        .create_user(NewUser::new("alice".to_string(), 0))
        .expect("Create failed");
    assert_eq!(user.name(), "alice");
    assert_eq!(*user.score(), 0);
    assert!(*user.id() > 0);
}

#[test]
fn test_create_user_duplicate_name_conflicts() {
    let (_db, repo) = setup_test_db();
    let mut session = repo.session().expect("Session failed");
    session
        .create_user(NewUser::new("bob".to_string(), 0))
        .expect("First create failed");
    let err = session
        .create_user(NewUser::new("bob".to_string(), 5))
        .expect_err("Duplicate name should fail");
    assert_eq!(err.kind, DbErrorKind::Conflict);
    assert!(err.is_conflict());
}

#[test]
fn test_migrations_are_idempotent() {
    let (_db, repo) = setup_test_db();
    repo.run_migrations().expect("Second run failed");
}

#[test]
fn test_get_user_by_name_is_exact() {
    let (_db, repo) = setup_test_db();
    let mut session = repo.session().expect("Session failed");
    session
        .create_user(NewUser::new("Carol".to_string(), 0))
        .expect("Create failed");

    let found = session.get_user_by_name("Carol").expect("Query failed");
    assert_eq!(found.map(|u| u.name().clone()), Some("Carol".to_string()));

    let folded = session.get_user_by_name("carol").expect("Query failed");
    assert!(folded.is_none());
}

#[test]
fn test_get_user_by_id() {
    let (_db, repo) = setup_test_db();
    let mut session = repo.session().expect("Session failed");
    let created = session
        .create_user(NewUser::new("dave".to_string(), 0))
        .expect("Create failed");

    let found = session.get_user_by_id(*created.id()).expect("Query failed");
    assert_eq!(found, Some(created));

    let missing = session.get_user_by_id(9999).expect("Query failed");
    assert!(missing.is_none());
}

#[test]
fn test_get_users_paging() {
    let (_db, repo) = setup_test_db();
    let mut session = repo.session().expect("Session failed");
    for name in ["a", "b", "c", "d"] {
        session
            .create_user(NewUser::new(name.to_string(), 0))
            .expect("Create failed");
    }

    let all = session.get_users(0, None).expect("List failed");
    let names: Vec<_> = all.iter().map(|u| u.name().as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c", "d"]);

    let tail = session.get_users(1, None).expect("List failed");
    assert_eq!(tail.len(), 3);
    assert_eq!(tail[0].name(), "b");

    let page = session.get_users(1, Some(2)).expect("List failed");
    let names: Vec<_> = page.iter().map(|u| u.name().as_str()).collect();
    assert_eq!(names, vec!["b", "c"]);

    let past_end = session.get_users(10, Some(5)).expect("List failed");
    assert!(past_end.is_empty());
}

#[test]
fn test_update_user_score() {
    let (_db, repo) = setup_test_db();
    let mut session = repo.session().expect("Session failed");
    session
        .create_user(NewUser::new("erin".to_string(), 0))
        .expect("Create failed");

    let up = session.update_user_score("erin", 1).expect("Update failed");
    assert_eq!(*up.score(), 1);

    session.update_user_score("erin", -1).expect("Update failed");
    let down = session.update_user_score("erin", -1).expect("Update failed");
    assert_eq!(*down.score(), -1, "Scores may go negative");
}

#[test]
fn test_score_past_i32_range_round_trips() {
    let (_db, repo) = setup_test_db();
    let mut session = repo.session().expect("Session failed");
    session
        .create_user(NewUser::new("x".to_string(), i64::from(i32::MAX)))
        .expect("Create failed");

    let updated = session.update_user_score("x", 1).expect("Update failed");
    assert_eq!(*updated.score(), 2_147_483_648);

    let reloaded = session
        .get_user_by_name("x")
        .expect("Query failed")
        .expect("User missing");
    assert_eq!(*reloaded.score(), 2_147_483_648);
}

#[test]
fn test_update_user_score_unknown_name() {
    let (_db, repo) = setup_test_db();
    let mut session = repo.session().expect("Session failed");
    let err = session
        .update_user_score("ghost", 1)
        .expect_err("Unknown name should fail");
    assert!(err.is_not_found());
}

#[test]
fn test_top10_caps_and_orders() {
    let (_db, repo) = setup_test_db();
    let mut session = repo.session().expect("Session failed");
    for i in 0..12 {
        session
            .create_user(NewUser::new(format!("player{i}"), i % 5))
            .expect("Create failed");
    }

    let top = session.get_users_top10().expect("Top10 failed");
    assert_eq!(top.len(), 10);
    assert!(top.windows(2).all(|w| w[0].score() >= w[1].score()));
    assert_eq!(*top[0].score(), 4);

    // Equal scores fall back to id order.
    for pair in top.windows(2) {
        if pair[0].score() == pair[1].score() {
            assert!(pair[0].id() < pair[1].id());
        }
    }
}

#[test]
fn test_top10_with_few_users() {
    let (_db, repo) = setup_test_db();
    let mut session = repo.session().expect("Session failed");
    assert!(session.get_users_top10().expect("Top10 failed").is_empty());

    session
        .create_user(NewUser::new("solo".to_string(), 3))
        .expect("Create failed");
    let top = session.get_users_top10().expect("Top10 failed");
    assert_eq!(top.len(), 1);
}

#[test]
fn test_sessions_share_state() {
    let (_db, repo) = setup_test_db();
    {
        let mut writer = repo.session().expect("Session failed");
        writer
            .create_user(NewUser::new("shared".to_string(), 0))
            .expect("Create failed");
    }
    let mut reader = repo.session().expect("Session failed");
    assert!(
        reader
            .get_user_by_name("shared")
            .expect("Query failed")
            .is_some()
    );
}
