//! Integration tests for the SQLite source store.
//!
//! These tests run against an in-memory SQLite database so the real sqlx
//! decoding of dynamically typed cells is exercised.
//!
//! Run with: `cargo test --test sqlite_source`

use migrator_repository::{SourceStore, SourceStoreError, SqliteSourceStore};
use migrator_shared::types::RawValue;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// Creates a single-connection in-memory database.
///
/// In-memory databases are private to their connection, so the pool must
/// never open a second one or drop the first.
async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

async fn seeded_store() -> SqliteSourceStore {
    let pool = memory_pool().await;

    sqlx::query(
        "CREATE TABLE \"Member\" (id TEXT PRIMARY KEY, active BOOLEAN, joinedAt DATETIME, score REAL, avatar BLOB)",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query("CREATE TABLE \"Program\" (id INTEGER PRIMARY KEY, name TEXT)")
        .execute(&pool)
        .await
        .unwrap();

    sqlx::query("INSERT INTO \"Member\" VALUES ('m1', 1, 1704067200000, 4.5, x'CAFE')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO \"Member\" VALUES ('m2', 'true', '2024-01-01', NULL, NULL)")
        .execute(&pool)
        .await
        .unwrap();

    SqliteSourceStore::new(pool)
}

#[tokio::test]
async fn test_list_tables_excludes_internal_tables() {
    let store = seeded_store().await;

    let tables = store.list_tables().await.unwrap();

    assert_eq!(
        tables.into_iter().collect::<Vec<_>>(),
        vec!["Member".to_string(), "Program".to_string()]
    );
}

#[tokio::test]
async fn test_fetch_all_decodes_storage_classes() {
    let store = seeded_store().await;

    let rows = store.fetch_all("Member").await.unwrap();

    assert_eq!(rows.len(), 2);
    let first = &rows[0];
    assert_eq!(first.get("id"), Some(&RawValue::Text("m1".to_string())));
    assert_eq!(first.get("active"), Some(&RawValue::Integer(1)));
    assert_eq!(first.get("joinedAt"), Some(&RawValue::Integer(1704067200000)));
    assert_eq!(first.get("score"), Some(&RawValue::Real(4.5)));
    assert_eq!(first.get("avatar"), Some(&RawValue::Blob(vec![0xCA, 0xFE])));

    // Same declared columns, different storage classes in the second row.
    let second = &rows[1];
    assert_eq!(second.get("active"), Some(&RawValue::Text("true".to_string())));
    assert_eq!(second.get("joinedAt"), Some(&RawValue::Text("2024-01-01".to_string())));
    assert_eq!(second.get("score"), Some(&RawValue::Null));
}

#[tokio::test]
async fn test_fetch_all_preserves_column_order() {
    let store = seeded_store().await;

    let rows = store.fetch_all("Member").await.unwrap();

    assert_eq!(
        rows[0].column_names().collect::<Vec<_>>(),
        vec!["id", "active", "joinedAt", "score", "avatar"]
    );
}

#[tokio::test]
async fn test_count_and_first_row() {
    let store = seeded_store().await;

    assert_eq!(store.count("Member").await.unwrap(), 2);
    assert_eq!(store.count("Program").await.unwrap(), 0);

    let first = store.first_row("Member").await.unwrap().unwrap();
    assert_eq!(first.get("id"), Some(&RawValue::Text("m1".to_string())));

    assert!(store.first_row("Program").await.unwrap().is_none());
}

#[tokio::test]
async fn test_missing_table_is_database_error() {
    let store = seeded_store().await;

    let result = store.fetch_all("Nope").await;

    assert!(matches!(result, Err(SourceStoreError::DatabaseError(_))));
}

#[tokio::test]
async fn test_invalid_identifier_is_rejected() {
    let store = seeded_store().await;

    let result = store.count("").await;

    assert!(matches!(result, Err(SourceStoreError::InvalidIdentifier(_))));
}

#[tokio::test]
async fn test_connect_missing_file_fails() {
    let result = SqliteSourceStore::connect("sqlite:///definitely/not/here.db").await;

    assert!(result.is_err());
}
