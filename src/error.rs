use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::repositories::RepositoryError;
use crate::services::{AuthServiceError, QuizServiceError, UserServiceError, VerificationError};

// Type alias for Result with our AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    TooManyRequests(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadGateway(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            AppError::Database(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => AppError::NotFound("Not found".to_string()),
            RepositoryError::AlreadyExists => AppError::Conflict("Already exists".to_string()),
            RepositoryError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<UserServiceError> for AppError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::InvalidEmail
            | UserServiceError::InvalidUsername
            | UserServiceError::WeakPassword(_) => AppError::Validation(err.to_string()),
            UserServiceError::EmailTaken | UserServiceError::UsernameTaken => {
                AppError::Conflict(err.to_string())
            }
            UserServiceError::UserNotFound => AppError::NotFound(err.to_string()),
            UserServiceError::EmailDelivery(e) => {
                tracing::error!(error = %e, "Verification email not delivered");
                AppError::BadGateway("Failed to send verification email".to_string())
            }
            UserServiceError::HashingError(msg) => AppError::Internal(msg),
            UserServiceError::RepositoryError(e) => e.into(),
        }
    }
}

impl From<VerificationError> for AppError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::UserNotFound => AppError::NotFound(err.to_string()),
            VerificationError::RecordMissing
            | VerificationError::AlreadyUsed
            | VerificationError::Expired
            | VerificationError::InvalidCode { .. } => AppError::BadRequest(err.to_string()),
            VerificationError::TooManyAttempts => AppError::TooManyRequests(err.to_string()),
            VerificationError::RepositoryError(e) => e.into(),
        }
    }
}

impl From<AuthServiceError> for AppError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::InvalidInput(msg) => AppError::Validation(msg),
            AuthServiceError::UserNotFound => AppError::NotFound(err.to_string()),
            AuthServiceError::InvalidCredentials | AuthServiceError::InvalidSession => {
                AppError::Unauthorized(err.to_string())
            }
            AuthServiceError::RepositoryError(e) => e.into(),
        }
    }
}

impl From<QuizServiceError> for AppError {
    fn from(err: QuizServiceError) -> Self {
        match err {
            QuizServiceError::InvalidInput(msg) => AppError::Validation(msg),
            QuizServiceError::EmptyCategoryBatch
            | QuizServiceError::EmptyQuestionBatch
            | QuizServiceError::DuplicateInBatch => AppError::BadRequest(err.to_string()),
            QuizServiceError::CategoryExists | QuizServiceError::CategoriesExist(_) => {
                AppError::Conflict(err.to_string())
            }
            QuizServiceError::CategoryNotFound | QuizServiceError::QuestionNotFound => {
                AppError::NotFound(err.to_string())
            }
            QuizServiceError::RepositoryError(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lockout_maps_to_too_many_requests() {
        let err: AppError = VerificationError::TooManyAttempts.into();
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            err.to_string(),
            "Too many failed attempts. Please request a new otp"
        );
    }

    #[test]
    fn test_remaining_attempts_in_message() {
        let err: AppError = VerificationError::InvalidCode { remaining: 2 }.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid Otp, 2 attempts remaining");
    }

    #[test]
    fn test_missing_record_is_bad_request() {
        let err: AppError = VerificationError::RecordMissing.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "No verification record found");
    }

    #[test]
    fn test_mail_failure_is_bad_gateway() {
        let err: AppError = UserServiceError::EmailDelivery(
            crate::services::EmailError::SendFailed("connection refused".to_string()),
        )
        .into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "Failed to send verification email");
    }

    #[test]
    fn test_database_errors_hide_details() {
        let err = AppError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
