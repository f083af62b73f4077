pub mod test_helpers {
    use crate::config::session::{key_from_secret_bytes, SessionCookieConfig};
    use crate::models::EmailVerification;
    use crate::services::email_service::{EmailError, EmailService};
    use crate::AppState;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use std::sync::{Arc, Mutex};
    use tempfile::NamedTempFile;

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for testing
    pub async fn create_test_db_file() -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;

        let pool = crate::db::create_pool(&format!("sqlite://{}", db_path)).await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok((pool, temp_file))
    }

    /// Insert a test user with hashed password
    pub async fn insert_test_user(
        pool: &SqlitePool,
        email: &str,
        username: &str,
        password: &str,
        verified: bool,
    ) -> Result<i64, sqlx::Error> {
        let password_hash = crate::services::user_service::hash_password(password)
            .map_err(|e| sqlx::Error::Configuration(e.to_string().into()))?;
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO users (email, username, password_hash, is_active, is_verified, created_at, updated_at) VALUES (?, ?, ?, FALSE, ?, ?, ?)",
        )
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .bind(verified)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn read_verification(
        pool: &SqlitePool,
        user_id: i64,
    ) -> Result<Option<EmailVerification>, sqlx::Error> {
        sqlx::query_as::<_, EmailVerification>(
            "SELECT id, user_id, token, is_used, attempts, created_at, expires_at, verified_at FROM email_verifications WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Move a pending code's expiry into the past
    pub async fn expire_verification(pool: &SqlitePool, user_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE email_verifications SET expires_at = ? WHERE user_id = ?")
            .bind(Utc::now() - Duration::minutes(1))
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn count_rows(pool: &SqlitePool, table: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Mailer that keeps every code it is asked to send, or fails on demand.
    #[derive(Default)]
    pub struct RecordingEmailService {
        sent: Mutex<Vec<(String, i64)>>,
        fail: bool,
    }

    impl RecordingEmailService {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub fn last_code_for(&self, email: &str) -> Option<i64> {
            self.sent
                .lock()
                .ok()?
                .iter()
                .rev()
                .find(|(to, _)| to == email)
                .map(|(_, otp)| *otp)
        }

        pub fn sent_count(&self) -> usize {
            self.sent.lock().map(|sent| sent.len()).unwrap_or(0)
        }
    }

    #[async_trait]
    impl EmailService for RecordingEmailService {
        async fn send_verification_code(
            &self,
            to_email: &str,
            otp: i64,
            _valid_minutes: i64,
        ) -> Result<(), EmailError> {
            if self.fail {
                return Err(EmailError::SendFailed("smtp unavailable".to_string()));
            }
            if let Ok(mut sent) = self.sent.lock() {
                sent.push((to_email.to_string(), otp));
            }
            Ok(())
        }
    }

    /// Application state over `pool` with a fixed cookie key and development cookies.
    pub fn create_test_state(pool: SqlitePool, email_service: Arc<dyn EmailService>) -> AppState {
        AppState::new(
            pool,
            email_service,
            Duration::minutes(60),
            key_from_secret_bytes(b"quizgame-test-signing-secret"),
            SessionCookieConfig::development(),
        )
    }
}
