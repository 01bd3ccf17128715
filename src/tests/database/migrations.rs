//! Migration Tests

use sqlx::Row;

use crate::database::migrations::{self, SCHEMA_VERSION};
use crate::tests::common::create_test_db;

#[tokio::test]
async fn test_fresh_database_reaches_current_version() {
    let (db, _temp) = create_test_db().await;

    let version = migrations::current_version(db.pool())
        .await
        .expect("Failed to read schema version");
    assert_eq!(version, SCHEMA_VERSION);
}

#[tokio::test]
async fn test_rerunning_migrations_is_idempotent() {
    let (db, _temp) = create_test_db().await;

    migrations::run_migrations(db.pool())
        .await
        .expect("Re-running migrations should succeed");

    let version = migrations::current_version(db.pool())
        .await
        .expect("Failed to read schema version");
    assert_eq!(version, SCHEMA_VERSION);
}

#[tokio::test]
async fn test_foreign_keys_enabled() {
    // Cascade deletion depends on the pragma being set on every connection
    let (db, _temp) = create_test_db().await;

    let row = sqlx::query("PRAGMA foreign_keys")
        .fetch_one(db.pool())
        .await
        .expect("pragma query");
    let enabled: i64 = row.get(0);
    assert_eq!(enabled, 1);
}
