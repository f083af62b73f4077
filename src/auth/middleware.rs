use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts},
};
use axum_extra::extract::cookie::SignedCookieJar;

use crate::error::AppError;
use crate::models::{SessionClient, User};
use crate::AppState;

const INVALID_SESSION: &str = "Invalid session";

/// The user behind a valid `session_id` cookie.
///
/// Rejects with 401 when the cookie is missing, fails its signature check,
/// or names a session that is unknown, inactive or expired.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub session_token: String,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_headers(&parts.headers, state.cookie_key.clone());

        let session_token = jar
            .get(&state.cookie_config.name)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Unauthorized(INVALID_SESSION.to_string()))?;

        let user = state.auth_service.resolve_session(&session_token).await?;

        Ok(CurrentUser {
            user,
            session_token,
        })
    }
}

/// Client address and user agent recorded on new sessions.
///
/// The address comes from `X-Forwarded-For` when a proxy sets it, otherwise
/// from the socket when the server was started with connect info.
pub struct ClientMetadata(pub SessionClient);

impl<S> FromRequestParts<S> for ClientMetadata
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let ip_address = forwarded.or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        });

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.chars().take(500).collect());

        Ok(ClientMetadata(SessionClient {
            ip_address,
            user_agent,
        }))
    }
}
