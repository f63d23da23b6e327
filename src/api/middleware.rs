//! API authentication middleware.
//!
//! Checks for `Authorization: Bearer <token>` on every request, skipping
//! auth for the public surface: liveness, registration/login, the Pokédex
//! read endpoints, and the unauthenticated AI endpoints (compare, fun
//! facts). Handlers that need the caller's identity resolve it again via
//! [`super::auth::current_user`]; this layer only rejects unauthenticated
//! requests early.

use axum::{
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::auth::validate_jwt;
use super::server::AppState;

/// Exact public paths.
const PUBLIC_PATHS: &[&str] = &["/", "/health", "/auth/register", "/auth/login", "/ai/compare"];

/// Public path prefixes.
const PUBLIC_PREFIXES: &[&str] = &["/pokedex/", "/ai/fun-facts/"];

fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path) || PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// Middleware that requires a valid JWT on every non-public request.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    if is_public(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(header) if header.starts_with("Bearer ") => {
            let token = &header[7..];
            if validate_jwt(token, &state.jwt_secret).is_ok() {
                Ok(next.run(request).await)
            } else {
                Err(StatusCode::UNAUTHORIZED)
            }
        }
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

// ============================================================================
// Tests
// ============================================================================
