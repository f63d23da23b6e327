//! Account routes: register, login, refresh, me.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::auth::{current_user, generate_jwt, hash_password, verify_password};
use crate::api::server::AppState;
use crate::error::{Result, VaultError};
use crate::store::User;

// ============================================================================
// Request / Response types
// ============================================================================

/// Body for `POST /auth/register` and `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Token pair issued by login and refresh.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

/// Public account view (never exposes the password hash).
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: u64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

fn token_pair(state: &AppState, email: &str) -> Result<TokenResponse> {
    Ok(TokenResponse {
        access_token: generate_jwt(email, &state.jwt_secret, state.access_ttl_secs)?,
        refresh_token: generate_jwt(email, &state.jwt_secret, state.refresh_ttl_secs)?,
        token_type: "bearer",
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// `POST /auth/register` — create an account.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Credentials>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let email = body.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(VaultError::InvalidInput("a valid email is required".into()));
    }
    if body.password.is_empty() {
        return Err(VaultError::InvalidInput("a password is required".into()));
    }

    let hash = hash_password(&body.password)?;
    let user = state.users.create(email, &hash).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `POST /auth/login` — exchange credentials for a token pair.
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Credentials>,
) -> Result<Json<TokenResponse>> {
    let invalid = || VaultError::InvalidInput("invalid email or password".into());

    let user = state
        .users
        .get_by_email(body.email.trim())
        .await
        .ok_or_else(invalid)?;
    if !verify_password(&body.password, &user.password_hash)? {
        return Err(invalid());
    }

    Ok(Json(token_pair(&state, &user.email)?))
}

/// `POST /auth/refresh` — issue a fresh token pair for a valid bearer.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>> {
    let user = current_user(&state, &headers).await?;
    Ok(Json(token_pair(&state, &user.email)?))
}

/// `GET /auth/me` — account info for the authenticated user.
pub async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>> {
    let user = current_user(&state, &headers).await?;
    Ok(Json(user.into()))
}

// ============================================================================
// Tests
// ============================================================================
