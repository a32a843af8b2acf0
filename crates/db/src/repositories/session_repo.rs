//! Repository for the `user_sessions` table.

use sqlx::PgPool;

use crate::models::session::{CreateSession, UserSession};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "session_hash, user_id, created_at, expires_at";

/// Provides CRUD operations for user sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert or overwrite a session, returning the stored row.
    pub async fn upsert(pool: &PgPool, input: &CreateSession) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (session_hash, user_id, created_at, expires_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (session_hash) DO UPDATE
                SET user_id = EXCLUDED.user_id,
                    created_at = EXCLUDED.created_at,
                    expires_at = EXCLUDED.expires_at
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(&input.session_hash)
            .bind(input.user_id)
            .bind(input.created_at)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a live session by its hash.
    ///
    /// Expired rows are treated as absent even before the sweep removes them.
    pub async fn find_active(
        pool: &PgPool,
        session_hash: &str,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_sessions
             WHERE session_hash = $1
               AND expires_at > NOW()"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(session_hash)
            .fetch_optional(pool)
            .await
    }

    /// Delete a single session. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, session_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE session_hash = $1")
            .bind(session_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Drop `previous_hash` and every session of `input.user_id`, then insert
    /// `input`, all in one transaction.
    pub async fn replace_for_user(
        pool: &PgPool,
        previous_hash: Option<&str>,
        input: &CreateSession,
    ) -> Result<UserSession, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if let Some(previous_hash) = previous_hash {
            sqlx::query("DELETE FROM user_sessions WHERE session_hash = $1")
                .bind(previous_hash)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
            .bind(input.user_id)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO user_sessions (session_hash, user_id, created_at, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserSession>(&query)
            .bind(&input.session_hash)
            .bind(input.user_id)
            .bind(input.created_at)
            .bind(input.expires_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Delete expired sessions. Returns the count of deleted rows.
    pub async fn cleanup_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
