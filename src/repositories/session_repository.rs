use crate::models::{SessionClient, UserSession};
use crate::repositories::user_repository::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

const SESSION_COLUMNS: &str = "id, user_id, session_token, ip_address, user_agent, is_active, created_at, expires_at, last_activity_at";

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait SessionRepository: Send + Sync {
    /// Persists a new session and flags the user active in one transaction.
    async fn create_session(
        &self,
        user_id: i64,
        session_token: &str,
        expires_at: DateTime<Utc>,
        client: SessionClient,
    ) -> RepositoryResult<UserSession>;
    async fn find_by_token(&self, session_token: &str) -> RepositoryResult<Option<UserSession>>;
    async fn touch(&self, id: i64, at: DateTime<Utc>) -> RepositoryResult<()>;
    /// Returns false when no active session carried the token.
    async fn deactivate(&self, session_token: &str) -> RepositoryResult<bool>;
    async fn delete_expired(&self, now: DateTime<Utc>) -> RepositoryResult<u64>;
}

pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn create_session(
        &self,
        user_id: i64,
        session_token: &str,
        expires_at: DateTime<Utc>,
        client: SessionClient,
    ) -> RepositoryResult<UserSession> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let session_id = sqlx::query(
            r#"
            INSERT INTO user_sessions
                (user_id, session_token, ip_address, user_agent, is_active, created_at, expires_at, last_activity_at)
            VALUES (?, ?, ?, ?, TRUE, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(session_token)
        .bind(&client.ip_address)
        .bind(&client.user_agent)
        .bind(now)
        .bind(expires_at)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(crate::repositories::user_repository::classify_write_error)?
        .last_insert_rowid();

        let updated = sqlx::query("UPDATE users SET is_active = TRUE, updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        let session = sqlx::query_as::<_, UserSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM user_sessions WHERE id = ?"
        ))
        .bind(session_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(session)
    }

    async fn find_by_token(&self, session_token: &str) -> RepositoryResult<Option<UserSession>> {
        let session = sqlx::query_as::<_, UserSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM user_sessions WHERE session_token = ?"
        ))
        .bind(session_token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn touch(&self, id: i64, at: DateTime<Utc>) -> RepositoryResult<()> {
        sqlx::query("UPDATE user_sessions SET last_activity_at = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn deactivate(&self, session_token: &str) -> RepositoryResult<bool> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_active = FALSE WHERE session_token = ? AND is_active = TRUE",
        )
        .bind(session_token)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> RepositoryResult<u64> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at < ? OR is_active = FALSE")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
