//! Database initialization
//!
//! Creates the database file on first run and the survey schema idempotently.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Open (or create) the database at `db_path` and ensure all tables exist
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable WAL mode
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// In-memory database with the full schema
///
/// Limited to a single connection: every `:memory:` connection is its own
/// database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_tables(&pool).await?;

    Ok(pool)
}

async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_administrator_table(pool).await?;
    create_survey_table(pool).await?;
    create_question_table(pool).await?;
    create_closed_choice_table(pool).await?;
    create_survey_reply_table(pool).await?;
    create_open_answer_table(pool).await?;
    create_closed_answer_table(pool).await?;
    Ok(())
}

async fn create_administrator_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS administrator (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_survey_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS survey (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            admin_id INTEGER NOT NULL REFERENCES administrator(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_survey_admin ON survey(admin_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_question_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS question (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            survey_id INTEGER NOT NULL REFERENCES survey(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            type INTEGER NOT NULL CHECK (type IN (0, 1)),
            min INTEGER NOT NULL CHECK (min >= 0),
            max INTEGER NOT NULL CHECK (max >= 1 AND max >= min),
            ordering_position INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_question_survey ON question(survey_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_closed_choice_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS closed_choice (
            id INTEGER NOT NULL,
            question_id INTEGER NOT NULL REFERENCES question(id) ON DELETE CASCADE,
            content TEXT NOT NULL,
            PRIMARY KEY (question_id, id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_survey_reply_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS survey_reply (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            survey_id INTEGER NOT NULL REFERENCES survey(id) ON DELETE CASCADE,
            person_name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_survey_reply_survey ON survey_reply(survey_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_open_answer_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS open_answer (
            survey_reply_id INTEGER NOT NULL REFERENCES survey_reply(id) ON DELETE CASCADE,
            question_id INTEGER NOT NULL REFERENCES question(id) ON DELETE CASCADE,
            answer TEXT NOT NULL,
            PRIMARY KEY (survey_reply_id, question_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_closed_answer_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS closed_answer (
            survey_reply_id INTEGER NOT NULL REFERENCES survey_reply(id) ON DELETE CASCADE,
            question_id INTEGER NOT NULL,
            closed_choice_id INTEGER NOT NULL,
            answer INTEGER NOT NULL CHECK (answer IN (0, 1)),
            PRIMARY KEY (survey_reply_id, question_id, closed_choice_id),
            FOREIGN KEY (question_id, closed_choice_id)
                REFERENCES closed_choice(question_id, id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
