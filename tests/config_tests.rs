use std::{collections::HashMap, env};

use axum_extra::extract::cookie::SameSite;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use quizgame::config::{
    session::{validate_production_config, SessionCookieConfig, SESSION_COOKIE_NAME},
    AppConfig,
};
use serial_test::serial;

#[derive(Default)]
struct EnvGuard {
    original: HashMap<String, Option<String>>,
}

impl EnvGuard {
    fn set(&mut self, key: &str, value: impl Into<String>) {
        self.original
            .entry(key.to_string())
            .or_insert_with(|| env::var(key).ok());
        env::set_var(key, value.into());
    }

    fn remove(&mut self, key: &str) {
        self.original
            .entry(key.to_string())
            .or_insert_with(|| env::var(key).ok());
        env::remove_var(key);
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.original.drain() {
            match value {
                Some(v) => env::set_var(&key, v),
                None => env::remove_var(&key),
            }
        }
    }
}

#[test]
#[serial]
fn production_cookie_is_hardened() {
    let mut env_guard = EnvGuard::default();
    env_guard.set("ENVIRONMENT", "production");
    env_guard.set("FORCE_HTTPS", "true");
    env_guard.set("SECRET_KEY", STANDARD.encode([42u8; 64]));

    validate_production_config();

    let cookie = SessionCookieConfig::from_env().build_cookie("token".to_string());
    assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
    assert_eq!(cookie.http_only(), Some(true), "HttpOnly flag must be set");
    assert_eq!(cookie.secure(), Some(true), "Secure flag must be enabled");
    assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    assert_eq!(cookie.max_age(), Some(time::Duration::hours(24)));
}

#[test]
#[serial]
fn development_cookie_allows_plain_http() {
    let mut env_guard = EnvGuard::default();
    env_guard.remove("ENVIRONMENT");

    let cookie = SessionCookieConfig::from_env().build_cookie("token".to_string());
    assert_eq!(cookie.http_only(), Some(true));
    assert_ne!(cookie.secure(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.path(), Some("/"));
}

#[test]
#[serial]
fn production_requires_https_flag() {
    let mut env_guard = EnvGuard::default();
    env_guard.set("ENVIRONMENT", "production");
    env_guard.remove("FORCE_HTTPS");
    env_guard.set("SECRET_KEY", "a".repeat(64));

    let result = std::panic::catch_unwind(validate_production_config);
    assert!(result.is_err(), "FORCE_HTTPS must be enforced in production");
}

#[test]
#[serial]
fn production_rejects_weak_secrets() {
    let mut env_guard = EnvGuard::default();
    env_guard.set("ENVIRONMENT", "production");
    env_guard.set("FORCE_HTTPS", "true");

    env_guard.set("SECRET_KEY", "changeme");
    assert!(std::panic::catch_unwind(validate_production_config).is_err());

    env_guard.set("SECRET_KEY", format!("default{}", "x".repeat(64)));
    assert!(std::panic::catch_unwind(validate_production_config).is_err());
}

#[test]
#[serial]
fn app_config_defaults() {
    let mut env_guard = EnvGuard::default();
    env_guard.set("DATABASE_URL", "sqlite://data/quiz.db");
    env_guard.remove("HOST");
    env_guard.remove("PORT");
    env_guard.remove("OTP_EXPIRE");

    let config = AppConfig::from_env().expect("defaults to load");
    assert_eq!(config.bind_address(), "127.0.0.1:8000");
    assert_eq!(config.otp_expire_minutes, 60);
}

#[test]
#[serial]
fn app_config_rejects_bad_values() {
    let mut env_guard = EnvGuard::default();
    env_guard.set("DATABASE_URL", "sqlite://data/quiz.db");
    env_guard.set("PORT", "not-a-port");
    assert!(AppConfig::from_env().is_err());

    env_guard.set("PORT", "9000");
    env_guard.set("OTP_EXPIRE", "0");
    assert!(AppConfig::from_env().is_err());

    env_guard.set("OTP_EXPIRE", "15");
    let config = AppConfig::from_env().unwrap();
    assert_eq!(config.port, 9000);
    assert_eq!(config.otp_expire_minutes, 15);

    env_guard.remove("DATABASE_URL");
    assert!(AppConfig::from_env().is_err());
}
