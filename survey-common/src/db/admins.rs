//! Administrator accounts

use crate::auth::{hash_password, verify_password, DEFAULT_HASH_COST};
use crate::model::{Admin, AdminId};
use crate::{Error, Result};
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Create an administrator with a bcrypt password hash
pub async fn create_admin(pool: &SqlitePool, username: &str, password: &str) -> Result<AdminId> {
    create_admin_with_cost(pool, username, password, DEFAULT_HASH_COST).await
}

/// Create an administrator, hashing the password at the given bcrypt cost
pub async fn create_admin_with_cost(
    pool: &SqlitePool,
    username: &str,
    password: &str,
    cost: u32,
) -> Result<AdminId> {
    let password = password.to_string();
    let hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| Error::PasswordHash(e.to_string()))??;

    let admin_id = sqlx::query("INSERT INTO administrator (username, password_hash) VALUES (?, ?)")
        .bind(username)
        .bind(&hash)
        .execute(pool)
        .await?
        .last_insert_rowid();

    info!("Created administrator '{}' (id {})", username, admin_id);

    Ok(admin_id)
}

pub async fn get_admin_by_id(pool: &SqlitePool, admin_id: AdminId) -> Result<Admin> {
    let row: Option<(i64, String)> =
        sqlx::query_as("SELECT id, username FROM administrator WHERE id = ?")
            .bind(admin_id)
            .fetch_optional(pool)
            .await?;

    let (id, username) = row.ok_or_else(|| Error::NotFound(format!("administrator {}", admin_id)))?;
    Ok(Admin { id, username })
}

/// Check credentials
///
/// Unknown usernames and wrong passwords both fail with [`Error::LoginFailed`].
/// The bcrypt comparison runs on the blocking pool.
pub async fn login_admin(pool: &SqlitePool, username: &str, password: &str) -> Result<Admin> {
    let row: Option<(i64, String, String)> = sqlx::query_as(
        "SELECT id, username, password_hash FROM administrator WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    if let Some((id, username, hash)) = row {
        let password = password.to_string();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| Error::PasswordHash(e.to_string()))?;
        if matches {
            return Ok(Admin { id, username });
        }
    }

    warn!("Failed login attempt for '{}'", username);
    Err(Error::LoginFailed)
}
