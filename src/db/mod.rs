//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for profiles and conferences.

mod allocator;
mod repository;

pub use allocator::*;
pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            user_id TEXT PRIMARY KEY,
            display_name TEXT NOT NULL,
            main_email TEXT NOT NULL,
            tee_shirt_size TEXT NOT NULL DEFAULT 'NOT_SPECIFIED',
            conference_keys_to_attend TEXT NOT NULL DEFAULT '[]'
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Conference id counter. Rows are deleted right after allocation;
    // AUTOINCREMENT still guarantees an id is never handed out twice.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS conference_ids (
            id INTEGER PRIMARY KEY AUTOINCREMENT
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS conferences (
            parent_user_id TEXT NOT NULL,
            id INTEGER NOT NULL,
            organizer_user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            topics TEXT NOT NULL DEFAULT '[]',
            city TEXT,
            start_date TEXT,
            end_date TEXT,
            month INTEGER NOT NULL DEFAULT 0,
            max_attendees INTEGER NOT NULL DEFAULT 0,
            seats_available INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (parent_user_id, id),
            CHECK (organizer_user_id = parent_user_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_conferences_name ON conferences(name);")
        .execute(pool)
        .await?;

    Ok(())
}
