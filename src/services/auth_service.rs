use crate::models::user::User;
use crate::models::SessionClient;
use crate::repositories::session_repository::SessionRepository;
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use crate::services::user_service::verify_password;
use crate::services::validation;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::sync::Arc;

pub const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("User not found")]
    UserNotFound,
    #[error("Password not match")]
    InvalidCredentials,
    #[error("Invalid session")]
    InvalidSession,
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
    session_repository: Arc<dyn SessionRepository>,
}

impl AuthService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        session_repository: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            user_repository,
            session_repository,
        }
    }

    /// Checks credentials against verified accounts and opens a session.
    pub async fn login(
        &self,
        request: LoginRequest,
        client: SessionClient,
    ) -> Result<LoginOutcome, AuthServiceError> {
        validation::check_length("Username", &request.username, 4, 50)
            .map_err(AuthServiceError::InvalidInput)?;
        validation::check_length("Password", &request.password, 8, 255)
            .map_err(AuthServiceError::InvalidInput)?;

        // Unverified signups are invisible to login
        let user = self
            .user_repository
            .find_verified_by_username(&request.username)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        if !verify_password(&request.password, &user.password_hash) {
            tracing::info!(user_id = user.id, "Login rejected: wrong password");
            return Err(AuthServiceError::InvalidCredentials);
        }

        let session_token = Self::generate_token();
        let expires_at = Utc::now() + Duration::hours(SESSION_TTL_HOURS);

        self.session_repository
            .create_session(user.id, &session_token, expires_at, client)
            .await?;

        tracing::info!(user_id = user.id, "User logged in");

        let mut user = user;
        user.is_active = true;

        Ok(LoginOutcome {
            user,
            session_token,
            expires_at,
        })
    }

    /// Resolves a session token to its user and records the activity.
    pub async fn resolve_session(&self, session_token: &str) -> Result<User, AuthServiceError> {
        let now = Utc::now();
        let session = self
            .session_repository
            .find_by_token(session_token)
            .await?
            .filter(|session| session.is_valid_at(now))
            .ok_or(AuthServiceError::InvalidSession)?;

        let user = self
            .user_repository
            .find_by_id(session.user_id)
            .await?
            .ok_or(AuthServiceError::InvalidSession)?;

        self.session_repository.touch(session.id, now).await?;

        Ok(user)
    }

    pub async fn logout(&self, session_token: &str) -> Result<(), AuthServiceError> {
        if self.session_repository.deactivate(session_token).await? {
            Ok(())
        } else {
            Err(AuthServiceError::InvalidSession)
        }
    }

    pub async fn cleanup_expired_sessions(&self) -> Result<u64, AuthServiceError> {
        let removed = self.session_repository.delete_expired(Utc::now()).await?;
        tracing::info!(removed, "Expired sessions removed");
        Ok(removed)
    }

    fn generate_token() -> String {
        let mut rng = rand::thread_rng();
        let bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
        hex::encode(bytes)
    }
}
