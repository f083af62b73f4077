use crate::models::EmailVerification;
use crate::repositories::user_repository::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait VerificationRepository: Send + Sync {
    async fn find_by_user_id(&self, user_id: i64) -> RepositoryResult<Option<EmailVerification>>;
    /// Drops the token and its expiry so the code can never be accepted again.
    async fn invalidate_token(&self, id: i64) -> RepositoryResult<()>;
    /// Stores the new attempt count, revoking the token when `revoke` is set.
    async fn record_failed_attempt(
        &self,
        id: i64,
        attempts: i64,
        revoke: bool,
    ) -> RepositoryResult<()>;
    /// Marks the user verified and the record used in one transaction.
    async fn complete_verification(
        &self,
        id: i64,
        user_id: i64,
        verified_at: DateTime<Utc>,
    ) -> RepositoryResult<()>;
}

pub struct SqliteVerificationRepository {
    pool: SqlitePool,
}

impl SqliteVerificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VerificationRepository for SqliteVerificationRepository {
    async fn find_by_user_id(&self, user_id: i64) -> RepositoryResult<Option<EmailVerification>> {
        let record = sqlx::query_as::<_, EmailVerification>(
            r#"
            SELECT id, user_id, token, is_used, attempts, created_at, expires_at, verified_at
            FROM email_verifications
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn invalidate_token(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE email_verifications SET token = NULL, expires_at = NULL WHERE id = ?",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn record_failed_attempt(
        &self,
        id: i64,
        attempts: i64,
        revoke: bool,
    ) -> RepositoryResult<()> {
        let sql = if revoke {
            "UPDATE email_verifications SET attempts = ?, token = NULL WHERE id = ?"
        } else {
            "UPDATE email_verifications SET attempts = ? WHERE id = ?"
        };

        let result = sqlx::query(sql)
            .bind(attempts)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn complete_verification(
        &self,
        id: i64,
        user_id: i64,
        verified_at: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        let user_update = sqlx::query(
            "UPDATE users SET is_verified = TRUE, updated_at = ? WHERE id = ?",
        )
        .bind(verified_at)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(crate::repositories::user_repository::classify_write_error)?;

        if user_update.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        let record_update = sqlx::query(
            r#"
            UPDATE email_verifications
            SET token = NULL, expires_at = NULL, is_used = TRUE, verified_at = ?
            WHERE id = ? AND is_used = FALSE
            "#,
        )
        .bind(verified_at)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if record_update.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}
