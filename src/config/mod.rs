pub mod session;

use std::env;

use crate::services::user_service::DEFAULT_OTP_TTL_MINUTES;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Server settings read from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub otp_expire_minutes: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_var("PORT", 8000u16)?;
        let otp_expire_minutes = parse_var("OTP_EXPIRE", DEFAULT_OTP_TTL_MINUTES)?;

        if otp_expire_minutes <= 0 {
            return Err(ConfigError::Invalid {
                name: "OTP_EXPIRE",
                value: otp_expire_minutes.to_string(),
            });
        }

        Ok(Self {
            database_url,
            host,
            port,
            otp_expire_minutes,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
