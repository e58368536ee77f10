//! Integration tests for the PostgreSQL target store.
//!
//! These tests require a real PostgreSQL database and use SQLx test macros
//! to ensure proper test isolation and cleanup. They are ignored by default.
//!
//! Run with: `DATABASE_URL=postgres://... cargo test --test postgres_target -- --ignored`

use chrono::{TimeZone, Utc};
use migrator_repository::{InsertOutcome, PostgresTargetStore, TargetStore};
use migrator_shared::types::{CanonicalValue, FieldType, TypedValue};
use sqlx::PgPool;

async fn store_with_schema(pool: &PgPool) -> PostgresTargetStore {
    sqlx::query(
        r#"CREATE TABLE "Program" (id SERIAL PRIMARY KEY, name TEXT NOT NULL)"#,
    )
    .execute(pool)
    .await
    .unwrap();
    sqlx::query(
        r#"CREATE TABLE "User" (
            id TEXT PRIMARY KEY,
            active BOOLEAN,
            "joinedAt" TIMESTAMP(3),
            "programId" INTEGER REFERENCES "Program"(id)
        )"#,
    )
    .execute(pool)
    .await
    .unwrap();

    let mut conn = pool.acquire().await.unwrap().detach();
    sqlx::query("SET TIME ZONE 'UTC'").execute(&mut conn).await.unwrap();
    PostgresTargetStore::new(conn)
}

fn user_values(id: &str, program_id: Option<i64>) -> Vec<TypedValue> {
    vec![
        TypedValue::new(FieldType::Text, Some(CanonicalValue::Text(id.to_string()))),
        TypedValue::new(FieldType::Boolean, Some(CanonicalValue::Boolean(true))),
        TypedValue::new(
            FieldType::Timestamp,
            Some(CanonicalValue::Timestamp(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())),
        ),
        TypedValue::new(FieldType::Integer, program_id.map(CanonicalValue::Integer)),
    ]
}

fn user_columns() -> Vec<String> {
    ["id", "active", "joinedAt", "programId"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_insert_then_conflict(pool: PgPool) {
    let mut store = store_with_schema(&pool).await;

    let first = store
        .insert_row("User", &user_columns(), &user_values("u1", None))
        .await
        .unwrap();
    let second = store
        .insert_row("User", &user_columns(), &user_values("u1", None))
        .await
        .unwrap();

    assert_eq!(first, InsertOutcome::Inserted);
    assert_eq!(second, InsertOutcome::Conflict);
    assert_eq!(store.count("User").await.unwrap(), 1);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_foreign_key_violation_is_an_error(pool: PgPool) {
    let mut store = store_with_schema(&pool).await;

    let result = store
        .insert_row("User", &user_columns(), &user_values("u1", Some(42)))
        .await;

    assert!(result.is_err());
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_text_reads(pool: PgPool) {
    let mut store = store_with_schema(&pool).await;
    store
        .insert_row("User", &user_columns(), &user_values("u1", None))
        .await
        .unwrap();

    let row = store
        .fetch_text_row("User", "id", "u1", &user_columns())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(row["active"].as_deref(), Some("true"));
    assert_eq!(row["joinedAt"].as_deref(), Some("2024-01-01 00:00:00"));
    assert_eq!(row["programId"], None);

    let booleans = store.distinct_text_values("User", "active", 10).await.unwrap();
    assert_eq!(booleans, vec!["true".to_string()]);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_reset_sequences_after_explicit_ids(pool: PgPool) {
    let mut store = store_with_schema(&pool).await;
    let columns = vec!["id".to_string(), "name".to_string()];
    for id in 1..=3 {
        store
            .insert_row(
                "Program",
                &columns,
                &[
                    TypedValue::new(FieldType::Integer, Some(CanonicalValue::Integer(id))),
                    TypedValue::new(FieldType::Text, Some(CanonicalValue::Text(format!("p{id}")))),
                ],
            )
            .await
            .unwrap();
    }

    let reset = store.reset_sequences().await.unwrap();
    assert_eq!(reset.len(), 1);

    let next: i32 = sqlx::query_scalar(r#"INSERT INTO "Program" (name) VALUES ('p4') RETURNING id"#)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(next, 4);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_truncate_cascade(pool: PgPool) {
    let mut store = store_with_schema(&pool).await;
    store
        .insert_row("User", &user_columns(), &user_values("u1", None))
        .await
        .unwrap();

    store.truncate_cascade("User").await.unwrap();

    assert_eq!(store.count("User").await.unwrap(), 0);
    assert!(store.list_tables().await.unwrap().contains("Program"));
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_disabling_integrity_skips_foreign_key_checks(pool: PgPool) {
    let mut store = store_with_schema(&pool).await;

    assert!(store.set_integrity_enforcement(false).await.unwrap());
    let orphan = store
        .insert_row("User", &user_columns(), &user_values("u1", Some(42)))
        .await
        .unwrap();
    assert_eq!(orphan, InsertOutcome::Inserted);

    assert!(store.set_integrity_enforcement(true).await.unwrap());
    let result = store
        .insert_row("User", &user_columns(), &user_values("u2", Some(42)))
        .await;
    assert!(result.is_err());
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_integrity_toggle_without_privilege_is_unavailable(pool: PgPool) {
    sqlx::query(
        r#"DO $$
        BEGIN
            CREATE ROLE migrator_unprivileged NOLOGIN;
        EXCEPTION WHEN duplicate_object THEN NULL;
        END $$"#,
    )
    .execute(&pool)
    .await
    .unwrap();

    let mut conn = pool.acquire().await.unwrap().detach();
    sqlx::query("SET ROLE migrator_unprivileged")
        .execute(&mut conn)
        .await
        .unwrap();
    let mut store = PostgresTargetStore::new(conn);

    assert!(!store.set_integrity_enforcement(false).await.unwrap());
}
