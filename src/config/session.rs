use std::env;

use axum_extra::extract::cookie::{Cookie, Key, SameSite};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha512};
use time::{Duration, OffsetDateTime};
use tracing::warn;

use crate::services::auth_service::SESSION_TTL_HOURS;

pub const SESSION_COOKIE_NAME: &str = "session_id";

/// Flags applied to the `session_id` cookie issued at login.
#[derive(Debug, Clone)]
pub struct SessionCookieConfig {
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub max_age: Duration,
    pub name: String,
}

impl SessionCookieConfig {
    pub fn from_env() -> Self {
        if current_environment() == "production" {
            SessionCookieConfig {
                secure: true,
                http_only: true,
                same_site: SameSite::Strict,
                max_age: Duration::hours(SESSION_TTL_HOURS),
                name: SESSION_COOKIE_NAME.to_string(),
            }
        } else {
            SessionCookieConfig::development()
        }
    }

    pub fn development() -> Self {
        SessionCookieConfig {
            secure: false,
            http_only: true,
            same_site: SameSite::Lax,
            max_age: Duration::hours(SESSION_TTL_HOURS),
            name: SESSION_COOKIE_NAME.to_string(),
        }
    }

    pub fn build_cookie(&self, session_token: String) -> Cookie<'static> {
        Cookie::build((self.name.clone(), session_token))
            .path("/")
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(self.max_age)
            .build()
    }

    /// Like [`build_cookie`](Self::build_cookie), with `Expires` pinned to the stored session's deadline.
    pub fn build_cookie_until(
        &self,
        session_token: String,
        expires_at: DateTime<Utc>,
    ) -> Cookie<'static> {
        let mut cookie = self.build_cookie(session_token);
        cookie.set_expires(OffsetDateTime::from_unix_timestamp(expires_at.timestamp()).ok());
        cookie
    }

    /// A cookie matching the issued one by name and path, for removal.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.name.clone(), "")).path("/").build()
    }
}

/// Refuses to run production with plain HTTP or a weak signing secret.
pub fn validate_production_config() {
    if current_environment() != "production" {
        return;
    }

    if !env_flag_enabled("FORCE_HTTPS") {
        panic!("FATAL: Production environment requires HTTPS. Set FORCE_HTTPS=true");
    }

    let secret = env::var("SECRET_KEY").expect("SECRET_KEY must be set in production");
    let decoded_secret = decode_secret_bytes(&secret);

    if decoded_secret.len() < 64 {
        panic!("FATAL: SECRET_KEY must be at least 64 bytes in production");
    }

    let lowered = secret.to_ascii_lowercase();
    if lowered.contains("example") || lowered.contains("changeme") || lowered.contains("default") {
        panic!("FATAL: SECRET_KEY appears to be a default value. Generate a secure secret!");
    }
}

pub fn current_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string())
}

fn env_flag_enabled(key: &str) -> bool {
    env::var(key)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "True"))
        .unwrap_or(false)
}

/// Derives the cookie signing key from `SECRET_KEY`, or an ephemeral one when unset.
pub fn load_cookie_key() -> Key {
    match env::var("SECRET_KEY") {
        Ok(secret) if !secret.is_empty() => key_from_secret_bytes(&decode_secret_bytes(&secret)),
        _ => {
            warn!("SECRET_KEY not set; generating ephemeral key (development only)");
            Key::generate()
        }
    }
}

fn decode_secret_bytes(secret: &str) -> Vec<u8> {
    STANDARD
        .decode(secret.as_bytes())
        .unwrap_or_else(|_| secret.as_bytes().to_vec())
}

pub fn key_from_secret_bytes(bytes: &[u8]) -> Key {
    if bytes.len() >= 64 {
        Key::from(&bytes[..64])
    } else {
        let digest = Sha512::digest(bytes);
        Key::from(digest.as_slice())
    }
}
