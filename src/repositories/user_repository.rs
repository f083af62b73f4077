use crate::models::user::User;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Record not found")]
    NotFound,
    #[error("Record already exists")]
    AlreadyExists,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Maps unique-constraint failures to `AlreadyExists`, everything else to `Database`.
pub(crate) fn classify_write_error(err: sqlx::Error) -> RepositoryError {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => RepositoryError::AlreadyExists,
        _ => RepositoryError::Database(err),
    }
}

const USER_COLUMNS: &str =
    "id, email, username, password_hash, is_active, is_verified, created_at, updated_at";

/// Everything needed to store a fresh signup and its pending email verification.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub otp: i64,
    pub otp_expires_at: DateTime<Utc>,
}

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    /// Replaces unverified signups sharing the email or username, then stores
    /// the user and its verification record in one transaction.
    async fn create_with_verification(&self, registration: NewRegistration)
        -> RepositoryResult<User>;
    async fn create_user(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
        is_verified: bool,
    ) -> RepositoryResult<User>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn find_verified_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn find_verified_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;
    async fn verify_email(&self, id: i64) -> RepositoryResult<()>;
    async fn delete_user(&self, id: i64) -> RepositoryResult<()>;
    async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> RepositoryResult<Vec<User>>;
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create_with_verification(
        &self,
        registration: NewRegistration,
    ) -> RepositoryResult<User> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let replaced = sqlx::query(
            "DELETE FROM users WHERE is_verified = FALSE AND (email = ? OR username = ?)",
        )
        .bind(&registration.email)
        .bind(&registration.username)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if replaced > 0 {
            tracing::debug!(
                email = %registration.email,
                replaced,
                "Replacing abandoned unverified signups"
            );
        }

        let user_id = sqlx::query(
            r#"
            INSERT INTO users (email, username, password_hash, is_active, is_verified, created_at, updated_at)
            VALUES (?, ?, ?, FALSE, FALSE, ?, ?)
            "#,
        )
        .bind(&registration.email)
        .bind(&registration.username)
        .bind(&registration.password_hash)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(classify_write_error)?
        .last_insert_rowid();

        sqlx::query(
            r#"
            INSERT INTO email_verifications (user_id, token, is_used, attempts, created_at, expires_at)
            VALUES (?, ?, FALSE, 0, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(registration.otp)
        .bind(now)
        .bind(registration.otp_expires_at)
        .execute(&mut *tx)
        .await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(user)
    }

    async fn create_user(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
        is_verified: bool,
    ) -> RepositoryResult<User> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, username, password_hash, is_active, is_verified, created_at, updated_at)
            VALUES (?, ?, ?, FALSE, ?, ?, ?)
            "#,
        )
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .bind(is_verified)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(classify_write_error)?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        // A verified account wins over any leftover unverified signup.
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE email = ?
            ORDER BY is_verified DESC, id DESC
            LIMIT 1
            "#
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_verified_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ? AND is_verified = TRUE"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_verified_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ? AND is_verified = TRUE"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn verify_email(&self, id: i64) -> RepositoryResult<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE users SET is_verified = TRUE, updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(classify_write_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            r#"
            UPDATE email_verifications
            SET token = NULL, expires_at = NULL, is_used = TRUE, verified_at = ?
            WHERE user_id = ?
            "#,
        )
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn delete_user(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> RepositoryResult<Vec<User>> {
        let limit = limit.unwrap_or(100);
        let offset = offset.unwrap_or(0);

        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
