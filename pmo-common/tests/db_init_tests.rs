//! Unit tests for document-store initialization

use pmo_common::db::init::{init_database, ping, COLLECTIONS};

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("sub").join("pmo.db");

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("pmo.db");

    let pool1 = init_database(&db_path).await;
    assert!(pool1.is_ok());

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_collection_tables_exist_and_ping_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("pmo.db")).await.unwrap();

    for collection in COLLECTIONS {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", collection))
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0, "{} should start empty", collection);
    }

    assert!(ping(&pool).await);
    pool.close().await;
    assert!(!ping(&pool).await, "closed pool must report unavailable");
}
