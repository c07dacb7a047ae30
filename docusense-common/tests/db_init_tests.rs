//! Integration tests for database initialization
//!
//! Covers automatic database creation, idempotent schema creation, and the
//! `tickets` table shape.

use docusense_common::db::{init_database, init_schema, BUSY_TIMEOUT_MS};
use tempfile::tempdir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("nested").join("docusense.db");
    assert!(!db_path.exists());

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("docusense.db");

    let pool1 = init_database(&db_path).await.unwrap();
    sqlx::query(
        "INSERT INTO tickets (subject, body, combined_text, predicted_category, created_at)
         VALUES ('a', 'b', 'a b', 'Account', '2024-01-01T00:00:00Z')",
    )
    .execute(&pool1)
    .await
    .unwrap();
    pool1.close().await;

    // Second open must keep existing rows
    let pool2 = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tickets")
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_schema_is_idempotent() {
    let dir = tempdir().unwrap();
    let pool = init_database(&dir.path().join("docusense.db")).await.unwrap();

    assert!(init_schema(&pool).await.is_ok());
    assert!(init_schema(&pool).await.is_ok());
}

#[tokio::test]
async fn test_tickets_table_columns() {
    let dir = tempdir().unwrap();
    let pool = init_database(&dir.path().join("docusense.db")).await.unwrap();

    let columns: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info('tickets')")
        .fetch_all(&pool)
        .await
        .unwrap();

    assert_eq!(
        columns,
        vec![
            "id",
            "subject",
            "body",
            "combined_text",
            "predicted_category",
            "created_at",
        ]
    );
}

#[tokio::test]
async fn test_ids_are_not_reused_after_delete() {
    let dir = tempdir().unwrap();
    let pool = init_database(&dir.path().join("docusense.db")).await.unwrap();

    let insert = "INSERT INTO tickets (subject, body, combined_text, predicted_category, created_at)
                  VALUES ('s', 'b', 's b', 'Billing', '2024-01-01T00:00:00Z')";
    let first = sqlx::query(insert).execute(&pool).await.unwrap().last_insert_rowid();
    sqlx::query("DELETE FROM tickets").execute(&pool).await.unwrap();
    let second = sqlx::query(insert).execute(&pool).await.unwrap().last_insert_rowid();

    assert!(second > first, "AUTOINCREMENT must not reuse id {}", first);
}

#[tokio::test]
async fn test_pragmas_apply_to_every_connection() {
    let dir = tempdir().unwrap();
    let pool = init_database(&dir.path().join("docusense.db")).await.unwrap();

    // Hold two connections at once so the second is not the one init used
    let mut first = pool.acquire().await.unwrap();
    let mut second = pool.acquire().await.unwrap();

    for conn in [&mut first, &mut second] {
        let timeout: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        assert_eq!(timeout, BUSY_TIMEOUT_MS as i64);

        let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }
}
