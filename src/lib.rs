pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use std::sync::Arc;

use config::session::SessionCookieConfig;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<services::UserService>,
    pub verification_service: Arc<services::VerificationService>,
    pub auth_service: Arc<services::AuthService>,
    pub quiz_service: Arc<services::QuizService>,
    pub cookie_key: Key,
    pub cookie_config: SessionCookieConfig,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

impl AppState {
    /// Wires the SQLite repositories and services over one pool.
    pub fn new(
        pool: sqlx::SqlitePool,
        email_service: Arc<dyn services::EmailService>,
        otp_ttl: chrono::Duration,
        cookie_key: Key,
        cookie_config: SessionCookieConfig,
    ) -> Self {
        let user_repository = Arc::new(repositories::SqliteUserRepository::new(pool.clone()));
        let verification_repository =
            Arc::new(repositories::SqliteVerificationRepository::new(pool.clone()));
        let session_repository = Arc::new(repositories::SqliteSessionRepository::new(pool.clone()));
        let category_repository =
            Arc::new(repositories::SqliteCategoryRepository::new(pool.clone()));
        let question_repository =
            Arc::new(repositories::SqliteQuestionRepository::new(pool.clone()));

        let user_service = Arc::new(
            services::UserService::new(user_repository.clone(), email_service).with_otp_ttl(otp_ttl),
        );
        let verification_service = Arc::new(services::VerificationService::new(
            user_repository.clone(),
            verification_repository,
        ));
        let auth_service = Arc::new(services::AuthService::new(
            user_repository,
            session_repository,
        ));
        let quiz_service = Arc::new(services::QuizService::new(
            category_repository,
            question_repository,
        ));

        AppState {
            user_service,
            verification_service,
            auth_service,
            quiz_service,
            cookie_key,
            cookie_config,
        }
    }
}
