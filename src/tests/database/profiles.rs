//! Profile Database Tests
//!
//! Ownership scoping, server-stamped audit timestamps, username uniqueness,
//! and storyfire accounting.

use std::time::Duration;

use crate::database::{ProfileOps, StoreError};
use crate::tests::common::{create_test_db, create_test_identity};

// =============================================================================
// Read / Update Tests
// =============================================================================

#[tokio::test]
async fn test_get_own_profile() {
    let (db, _temp) = create_test_db().await;
    create_test_identity(&db, "u1", "a@x.com").await;

    let profile = db.session("u1").get_profile().await.expect("Failed to get profile");
    assert_eq!(profile.id, "u1");
    assert_eq!(profile.email, "a@x.com");
}

#[tokio::test]
async fn test_get_profile_unknown_identity() {
    let (db, _temp) = create_test_db().await;

    let result = db.session("ghost").get_profile().await;
    assert!(matches!(result, Err(StoreError::NotFound)));
}

#[tokio::test]
async fn test_update_profile_fields() {
    let (db, _temp) = create_test_db().await;
    create_test_identity(&db, "u1", "a@x.com").await;
    let session = db.session("u1");

    let mut profile = session.get_profile().await.expect("get");
    profile.username = Some("kestrel".to_string());
    profile.full_name = Some("Kestrel of the Crossroads".to_string());
    profile.avatar_url = Some("https://cdn.example/av.png".to_string());
    profile.is_premium = true;

    session.update_profile(&profile).await.expect("Failed to update profile");

    let updated = session.get_profile().await.expect("get");
    assert_eq!(updated.username.as_deref(), Some("kestrel"));
    assert_eq!(updated.full_name.as_deref(), Some("Kestrel of the Crossroads"));
    assert!(updated.is_premium);
}

#[tokio::test]
async fn test_updated_at_is_store_stamped() {
    let (db, _temp) = create_test_db().await;
    create_test_identity(&db, "u1", "a@x.com").await;
    let session = db.session("u1");

    let mut profile = session.get_profile().await.expect("get");
    let before = profile.updated_at.clone();

    tokio::time::sleep(Duration::from_millis(5)).await;

    // Whatever the caller supplies for updated_at is discarded
    profile.username = Some("kestrel".to_string());
    profile.updated_at = "2099-01-01T00:00:00+00:00".to_string();
    session.update_profile(&profile).await.expect("update");

    let updated = session.get_profile().await.expect("get");
    assert_ne!(updated.updated_at, "2099-01-01T00:00:00+00:00");
    assert!(updated.updated_at > before, "updated_at must advance");
}

#[tokio::test]
async fn test_update_foreign_profile_denied() {
    let (db, _temp) = create_test_db().await;
    create_test_identity(&db, "u1", "a@x.com").await;
    create_test_identity(&db, "u2", "b@x.com").await;

    // u2 holds u1's record but acts through its own session
    let mut profile = db.session("u1").get_profile().await.expect("get");
    profile.username = Some("hijacked".to_string());

    let result = db.session("u2").update_profile(&profile).await;
    assert!(matches!(result, Err(StoreError::Ownership)));

    let untouched = db.session("u1").get_profile().await.expect("get");
    assert!(untouched.username.is_none());
}

#[tokio::test]
async fn test_negative_balance_rejected() {
    let (db, _temp) = create_test_db().await;
    create_test_identity(&db, "u1", "a@x.com").await;
    let session = db.session("u1");

    let mut profile = session.get_profile().await.expect("get");
    profile.storyfire_balance = -1;

    let result = session.update_profile(&profile).await;
    assert!(matches!(result, Err(StoreError::Constraint(_))));
}

// =============================================================================
// Username Uniqueness Tests
// =============================================================================

#[tokio::test]
async fn test_duplicate_username_conflict() {
    let (db, _temp) = create_test_db().await;
    create_test_identity(&db, "u1", "a@x.com").await;
    create_test_identity(&db, "u2", "b@x.com").await;

    let mut p1 = db.session("u1").get_profile().await.expect("get");
    p1.username = Some("kestrel".to_string());
    db.session("u1").update_profile(&p1).await.expect("update");

    let mut p2 = db.session("u2").get_profile().await.expect("get");
    p2.username = Some("kestrel".to_string());
    let result = db.session("u2").update_profile(&p2).await;
    assert!(matches!(result, Err(StoreError::Conflict(_))));
}

#[tokio::test]
async fn test_username_uniqueness_is_case_sensitive() {
    // Pins the engine's default BINARY collation: usernames differing only
    // in case are distinct.
    let (db, _temp) = create_test_db().await;
    create_test_identity(&db, "u1", "a@x.com").await;
    create_test_identity(&db, "u2", "b@x.com").await;

    let mut p1 = db.session("u1").get_profile().await.expect("get");
    p1.username = Some("Alice".to_string());
    db.session("u1").update_profile(&p1).await.expect("update");

    let mut p2 = db.session("u2").get_profile().await.expect("get");
    p2.username = Some("alice".to_string());
    db.session("u2")
        .update_profile(&p2)
        .await
        .expect("case-variant username should be accepted");
}

#[tokio::test]
async fn test_unset_usernames_do_not_collide() {
    let (db, _temp) = create_test_db().await;
    create_test_identity(&db, "u1", "a@x.com").await;
    create_test_identity(&db, "u2", "b@x.com").await;

    // Both profiles start with NULL usernames; provisioning the second
    // must not trip the unique index.
    let p1 = db.session("u1").get_profile().await.expect("get");
    let p2 = db.session("u2").get_profile().await.expect("get");
    assert!(p1.username.is_none());
    assert!(p2.username.is_none());
}

// =============================================================================
// Storyfire Tests
// =============================================================================

#[tokio::test]
async fn test_spend_storyfire_deducts() {
    let (db, _temp) = create_test_db().await;
    create_test_identity(&db, "u1", "a@x.com").await;
    let session = db.session("u1");

    let balance = session.spend_storyfire(2).await.expect("spend");
    assert_eq!(balance, 38);

    let profile = session.get_profile().await.expect("get");
    assert_eq!(profile.storyfire_balance, 38);
}

#[tokio::test]
async fn test_storyfire_exhaustion() {
    let (db, _temp) = create_test_db().await;
    create_test_identity(&db, "u1", "a@x.com").await;
    let session = db.session("u1");

    // 40 storyfire buys exactly 20 actions at 2 apiece
    for _ in 0..20 {
        session.spend_storyfire(2).await.expect("spend");
    }
    let profile = session.get_profile().await.expect("get");
    assert_eq!(profile.storyfire_balance, 0);

    let result = session.spend_storyfire(2).await;
    assert!(matches!(result, Err(StoreError::StoryfireExhausted)));
}

#[tokio::test]
async fn test_premium_profiles_never_charged() {
    let (db, _temp) = create_test_db().await;
    create_test_identity(&db, "u1", "a@x.com").await;
    let session = db.session("u1");

    let mut profile = session.get_profile().await.expect("get");
    profile.is_premium = true;
    session.update_profile(&profile).await.expect("update");

    let balance = session.spend_storyfire(2).await.expect("spend");
    assert_eq!(balance, 40);

    let profile = session.get_profile().await.expect("get");
    assert_eq!(profile.storyfire_balance, 40);
}

#[tokio::test]
async fn test_reset_storyfire() {
    let (db, _temp) = create_test_db().await;
    create_test_identity(&db, "u1", "a@x.com").await;
    let session = db.session("u1");

    session.spend_storyfire(10).await.expect("spend");
    let drained = session.get_profile().await.expect("get");

    tokio::time::sleep(Duration::from_millis(5)).await;
    session.reset_storyfire(40).await.expect("reset");

    let profile = session.get_profile().await.expect("get");
    assert_eq!(profile.storyfire_balance, 40);
    assert!(profile.last_storyfire_reset > drained.last_storyfire_reset);
}

#[tokio::test]
async fn test_negative_spend_rejected() {
    let (db, _temp) = create_test_db().await;
    create_test_identity(&db, "u1", "a@x.com").await;

    let result = db.session("u1").spend_storyfire(-2).await;
    assert!(matches!(result, Err(StoreError::Constraint(_))));
}
