use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Number of wrong codes accepted before a verification token is revoked.
pub const MAX_OTP_ATTEMPTS: i64 = 5;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EmailVerification {
    pub id: i64,
    pub user_id: i64,
    pub token: Option<i64>,
    pub is_used: bool,
    pub attempts: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl EmailVerification {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if now > expires_at)
    }

    pub fn remaining_attempts(&self) -> i64 {
        MAX_OTP_ATTEMPTS - self.attempts
    }
}
