use crate::auth::middleware::{ClientMetadata, CurrentUser};
use crate::error::Result;
use crate::models::UserResponse;
use crate::services::{LoginRequest, RegisterRequest};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
pub struct RegisterBody {
    email: String,
    username: String,
    password: String,
}

#[derive(Deserialize)]
pub struct VerifyEmailQuery {
    email: String,
    otp: i64,
}

#[derive(Deserialize)]
pub struct LoginBody {
    username: String,
    password: String,
}

/// POST /api/v1/authentication/register
///
/// Creates an unverified account and mails it a six-digit code.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse> {
    let user = state
        .user_service
        .register(RegisterRequest {
            email: body.email,
            username: body.username,
            password: body.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// POST /api/v1/authentication/verify-email?email=..&otp=..
pub async fn verify_email_handler(
    State(state): State<AppState>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<impl IntoResponse> {
    let outcome = state
        .verification_service
        .verify_email(&query.email, query.otp)
        .await?;

    Ok(Json(json!({ "message": outcome.message() })))
}

/// POST /api/v1/authentication/login
///
/// Sets the signed `session_id` cookie on success.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    ClientMetadata(client): ClientMetadata,
    Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse> {
    let outcome = state
        .auth_service
        .login(
            LoginRequest {
                username: body.username,
                password: body.password,
            },
            client,
        )
        .await?;

    let jar = jar.add(
        state
            .cookie_config
            .build_cookie_until(outcome.session_token, outcome.expires_at),
    );

    Ok((
        jar,
        Json(json!({
            "message": "Login successful",
            "user": UserResponse::from(outcome.user),
        })),
    ))
}

/// POST /api/v1/authentication/logout
pub async fn logout_handler(
    State(state): State<AppState>,
    current: CurrentUser,
    jar: SignedCookieJar,
) -> Result<impl IntoResponse> {
    state.auth_service.logout(&current.session_token).await?;

    tracing::info!(user_id = current.user.id, "User logged out");

    let jar = jar.remove(state.cookie_config.removal_cookie());

    Ok((jar, Json(json!({ "message": "Logged out" }))))
}

/// GET /api/v1/authentication/me
pub async fn me_handler(current: CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(current.user))
}
