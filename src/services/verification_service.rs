use crate::models::email_verification::{EmailVerification, MAX_OTP_ATTEMPTS};
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use crate::repositories::verification_repository::VerificationRepository;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("User not found")]
    UserNotFound,
    #[error("No verification record found")]
    RecordMissing,
    #[error("Otp already used")]
    AlreadyUsed,
    #[error("Otp Expired")]
    Expired,
    #[error("Invalid Otp, {remaining} attempts remaining")]
    InvalidCode { remaining: i64 },
    #[error("Too many failed attempts. Please request a new otp")]
    TooManyAttempts,
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified,
    AlreadyVerified,
}

impl VerificationOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            VerificationOutcome::Verified => "Email verified successfully",
            VerificationOutcome::AlreadyVerified => "User already verified",
        }
    }
}

/// Drives the email one-time-code check for a pending signup.
///
/// Every failure path that revokes the code (expiry, attempt exhaustion)
/// clears the stored token, so a revoked code never verifies anything.
pub struct VerificationService {
    user_repository: Arc<dyn UserRepository>,
    verification_repository: Arc<dyn VerificationRepository>,
}

impl VerificationService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        verification_repository: Arc<dyn VerificationRepository>,
    ) -> Self {
        Self {
            user_repository,
            verification_repository,
        }
    }

    pub async fn verify_email(
        &self,
        email: &str,
        otp: i64,
    ) -> Result<VerificationOutcome, VerificationError> {
        self.verify_email_at(email, otp, Utc::now()).await
    }

    pub async fn verify_email_at(
        &self,
        email: &str,
        otp: i64,
        now: DateTime<Utc>,
    ) -> Result<VerificationOutcome, VerificationError> {
        let user = self
            .user_repository
            .find_by_email(email)
            .await?
            .ok_or(VerificationError::UserNotFound)?;

        if user.is_verified {
            return Ok(VerificationOutcome::AlreadyVerified);
        }

        let record = self
            .verification_repository
            .find_by_user_id(user.id)
            .await?
            .ok_or_else(|| {
                tracing::error!(user_id = user.id, "Unverified user has no verification record");
                VerificationError::RecordMissing
            })?;

        if record.is_used {
            return Err(VerificationError::AlreadyUsed);
        }

        if record.is_expired_at(now) {
            self.verification_repository
                .invalidate_token(record.id)
                .await?;
            tracing::info!(user_id = user.id, "Verification code expired");
            return Err(VerificationError::Expired);
        }

        let stored = match record.token {
            Some(token) => token,
            None => return Err(revoked_error(&record)),
        };

        if stored != otp {
            // Written back from the value read above; concurrent submissions may under-count.
            let mut record = record;
            record.attempts += 1;
            let attempts = record.attempts;
            let remaining = record.remaining_attempts();
            let revoke = remaining <= 0;

            self.verification_repository
                .record_failed_attempt(record.id, attempts, revoke)
                .await?;

            if revoke {
                tracing::warn!(user_id = user.id, attempts, "Verification locked out");
                return Err(VerificationError::TooManyAttempts);
            }

            tracing::debug!(user_id = user.id, remaining, "Wrong verification code");
            return Err(VerificationError::InvalidCode { remaining });
        }

        self.verification_repository
            .complete_verification(record.id, user.id, now)
            .await?;

        tracing::info!(user_id = user.id, "Email verified");

        Ok(VerificationOutcome::Verified)
    }
}

fn revoked_error(record: &EmailVerification) -> VerificationError {
    if record.attempts >= MAX_OTP_ATTEMPTS {
        VerificationError::TooManyAttempts
    } else {
        VerificationError::Expired
    }
}
