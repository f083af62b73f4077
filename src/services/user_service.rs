use crate::models::user::User;
use crate::repositories::user_repository::{NewRegistration, RepositoryError, UserRepository};
use crate::services::email_service::{EmailError, EmailService};
use crate::services::validation;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use chrono::{Duration, Utc};
use rand::Rng;
use std::sync::Arc;

pub const DEFAULT_OTP_TTL_MINUTES: i64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Username must be between 4 and 50 characters")]
    InvalidUsername,
    #[error("{0}")]
    WeakPassword(String),
    #[error("User not found")]
    UserNotFound,
    #[error("Email already exists")]
    EmailTaken,
    #[error("Username already exists")]
    UsernameTaken,
    #[error("Failed to send verification email: {0}")]
    EmailDelivery(#[from] EmailError),
    #[error("Password hashing failed: {0}")]
    HashingError(String),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Administrative account creation that skips the OTP round trip.
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub is_verified: bool,
}

pub struct UserService {
    repository: Arc<dyn UserRepository>,
    email_service: Arc<dyn EmailService>,
    otp_ttl: Duration,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, email_service: Arc<dyn EmailService>) -> Self {
        Self {
            repository,
            email_service,
            otp_ttl: Duration::minutes(DEFAULT_OTP_TTL_MINUTES),
        }
    }

    pub fn with_otp_ttl(mut self, otp_ttl: Duration) -> Self {
        self.otp_ttl = otp_ttl;
        self
    }

    /// Registers an unverified account and mails it a one-time code.
    ///
    /// A verified account holding the email (checked first) or the username
    /// blocks the signup. Unverified signups with either value are replaced.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, UserServiceError> {
        self.validate_email(&request.email)?;
        self.validate_username(&request.username)?;
        self.validate_password(&request.password)?;

        if self
            .repository
            .find_verified_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(UserServiceError::EmailTaken);
        }
        if self
            .repository
            .find_verified_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(UserServiceError::UsernameTaken);
        }

        let otp = generate_otp();
        let otp_expires_at = Utc::now() + self.otp_ttl;

        self.email_service
            .send_verification_code(&request.email, otp, self.otp_ttl.num_minutes())
            .await
            .map_err(|e| {
                tracing::error!(email = %request.email, "Failed to send verification code: {}", e);
                UserServiceError::EmailDelivery(e)
            })?;

        let password_hash = hash_password(&request.password)?;

        let registration = NewRegistration {
            email: request.email,
            username: request.username,
            password_hash,
            otp,
            otp_expires_at,
        };

        match self.repository.create_with_verification(registration).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "Registered new user");
                Ok(user)
            }
            Err(RepositoryError::AlreadyExists) => Err(UserServiceError::EmailTaken),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User, UserServiceError> {
        self.validate_email(&request.email)?;
        self.validate_username(&request.username)?;
        self.validate_password(&request.password)?;

        if self
            .repository
            .find_verified_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(UserServiceError::EmailTaken);
        }
        if self
            .repository
            .find_verified_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(UserServiceError::UsernameTaken);
        }

        let password_hash = hash_password(&request.password)?;

        match self
            .repository
            .create_user(
                &request.email,
                &request.username,
                &password_hash,
                request.is_verified,
            )
            .await
        {
            Ok(user) => Ok(user),
            Err(RepositoryError::AlreadyExists) => Err(UserServiceError::EmailTaken),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_email(email).await?)
    }

    pub async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<User>, UserServiceError> {
        Ok(self.repository.list_users(limit, offset).await?)
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), UserServiceError> {
        match self.repository.delete_user(id).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    /// Marks the account verified without a code, consuming any pending one.
    pub async fn verify_user_email(&self, id: i64) -> Result<(), UserServiceError> {
        match self.repository.verify_email(id).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(RepositoryError::AlreadyExists) => Err(UserServiceError::EmailTaken),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    fn validate_email(&self, email: &str) -> Result<(), UserServiceError> {
        if !validation::is_valid_email(email) {
            return Err(UserServiceError::InvalidEmail);
        }
        Ok(())
    }

    fn validate_username(&self, username: &str) -> Result<(), UserServiceError> {
        validation::check_length("Username", username, 4, 50)
            .map_err(|_| UserServiceError::InvalidUsername)
    }

    fn validate_password(&self, password: &str) -> Result<(), UserServiceError> {
        if password.chars().count() > 255 {
            return Err(UserServiceError::WeakPassword(
                "Password must be at most 255 characters".to_string(),
            ));
        }
        match validation::password_weakness(password) {
            Some(reason) => Err(UserServiceError::WeakPassword(reason.to_string())),
            None => Ok(()),
        }
    }
}

/// Six-digit numeric code, never with a leading zero.
pub fn generate_otp() -> i64 {
    rand::thread_rng().gen_range(100_000..=999_999)
}

pub fn hash_password(password: &str) -> Result<String, UserServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserServiceError::HashingError(e.to_string()))
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    if let Ok(parsed_hash) = PasswordHash::new(password_hash) {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::user_repository::MockUserRepository;
    use crate::services::email_service::MockEmailService;
    use mockall::predicate::*;

    fn sample_user(id: i64, email: &str, username: &str, verified: bool) -> User {
        User {
            id,
            email: email.to_string(),
            username: username.to_string(),
            password_hash: "hash".to_string(),
            is_active: false,
            is_verified: verified,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn register_request(email: &str, username: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: "Secret123!".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_success_sends_code_and_stores_it() {
        let mut mock_repo = MockUserRepository::new();
        let mut mock_email = MockEmailService::new();

        mock_repo
            .expect_find_verified_by_email()
            .with(eq("player@example.com"))
            .times(1)
            .returning(|_| Box::pin(async move { Ok(None) }));
        mock_repo
            .expect_find_verified_by_username()
            .with(eq("player1"))
            .times(1)
            .returning(|_| Box::pin(async move { Ok(None) }));

        mock_email
            .expect_send_verification_code()
            .withf(|to, otp, minutes| {
                to.to_string() == "player@example.com"
                    && (100_000..=999_999).contains(otp)
                    && *minutes == 60
            })
            .times(1)
            .returning(|_, _, _| Box::pin(async move { Ok(()) }));

        mock_repo
            .expect_create_with_verification()
            .withf(|registration| {
                registration.email == "player@example.com"
                    && registration.username == "player1"
                    && registration.password_hash.starts_with("$argon2")
                    && registration.otp_expires_at > Utc::now()
            })
            .times(1)
            .returning(|registration| {
                let user = sample_user(7, &registration.email, &registration.username, false);
                Box::pin(async move { Ok(user) })
            });

        let service = UserService::new(Arc::new(mock_repo), Arc::new(mock_email));
        let user = service
            .register(register_request("player@example.com", "player1"))
            .await
            .expect("registration to succeed");

        assert_eq!(user.id, 7);
        assert!(!user.is_verified);
    }

    #[tokio::test]
    async fn test_register_email_conflict_takes_priority() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_verified_by_email()
            .times(1)
            .returning(|_| {
                let user = sample_user(1, "player@example.com", "someone", true);
                Box::pin(async move { Ok(Some(user)) })
            });
        mock_repo.expect_find_verified_by_username().times(0);
        mock_repo.expect_create_with_verification().times(0);

        let service = UserService::new(Arc::new(mock_repo), Arc::new(MockEmailService::new()));
        let result = service
            .register(register_request("player@example.com", "player1"))
            .await;

        assert!(matches!(result, Err(UserServiceError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_register_username_conflict() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_verified_by_email()
            .returning(|_| Box::pin(async move { Ok(None) }));
        mock_repo
            .expect_find_verified_by_username()
            .returning(|_| {
                let user = sample_user(1, "other@example.com", "player1", true);
                Box::pin(async move { Ok(Some(user)) })
            });

        let service = UserService::new(Arc::new(mock_repo), Arc::new(MockEmailService::new()));
        let result = service
            .register(register_request("player@example.com", "player1"))
            .await;

        assert!(matches!(result, Err(UserServiceError::UsernameTaken)));
    }

    #[tokio::test]
    async fn test_register_email_failure_writes_nothing() {
        let mut mock_repo = MockUserRepository::new();
        let mut mock_email = MockEmailService::new();

        mock_repo
            .expect_find_verified_by_email()
            .returning(|_| Box::pin(async move { Ok(None) }));
        mock_repo
            .expect_find_verified_by_username()
            .returning(|_| Box::pin(async move { Ok(None) }));
        mock_email
            .expect_send_verification_code()
            .returning(|_, _, _| {
                Box::pin(async move { Err(EmailError::SendFailed("relay down".to_string())) })
            });
        mock_repo.expect_create_with_verification().times(0);

        let service = UserService::new(Arc::new(mock_repo), Arc::new(mock_email));
        let result = service
            .register(register_request("player@example.com", "player1"))
            .await;

        assert!(matches!(result, Err(UserServiceError::EmailDelivery(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password() {
        let mock_repo = MockUserRepository::new();
        let service = UserService::new(Arc::new(mock_repo), Arc::new(MockEmailService::new()));

        let request = RegisterRequest {
            email: "player@example.com".to_string(),
            username: "player1".to_string(),
            password: "password123".to_string(),
        };

        let result = service.register(request).await;
        match result {
            Err(UserServiceError::WeakPassword(reason)) => {
                assert_eq!(reason, "Password must contain at least one uppercase letter")
            }
            other => panic!("expected weak password, got {:?}", other.map(|u| u.id)),
        }
    }

    #[tokio::test]
    async fn test_register_rejects_short_username() {
        let mock_repo = MockUserRepository::new();
        let service = UserService::new(Arc::new(mock_repo), Arc::new(MockEmailService::new()));

        let result = service
            .register(register_request("player@example.com", "abc"))
            .await;
        assert!(matches!(result, Err(UserServiceError::InvalidUsername)));
    }

    #[test]
    fn test_generate_otp_is_six_digits() {
        for _ in 0..100 {
            let otp = generate_otp();
            assert!((100_000..=999_999).contains(&otp));
        }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("Secret123!").expect("hashing to succeed");
        assert!(verify_password("Secret123!", &hash));
        assert!(!verify_password("Secret123?", &hash));
        assert!(!verify_password("Secret123!", "not-a-hash"));
    }
}
