//! Authentication helpers for the PokeVault API.
//!
//! Provides bcrypt password hashing, HS256 JWT issuance/validation for the
//! access/refresh token pair, and resolution of the current user from an
//! `Authorization: Bearer` header.

use axum::http::HeaderMap;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};
use crate::store::User;

use super::server::AppState;

// ============================================================================
// Password hashing (bcrypt)
// ============================================================================

/// Hashes `password` with bcrypt at cost factor 12.
///
/// # Errors
///
/// Returns [`VaultError::Config`] if bcrypt fails internally (extremely
/// rare; only occurs on invalid cost or internal entropy failure).
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, 12).map_err(|e| VaultError::Config(format!("bcrypt hash: {e}")))
}

/// Verifies `password` against a bcrypt `hash`.
///
/// Returns `true` if the password matches, `false` otherwise.
///
/// # Errors
///
/// Returns [`VaultError::Config`] if the hash string is malformed and
/// bcrypt cannot parse it.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).map_err(|e| VaultError::Config(format!("bcrypt verify: {e}")))
}

// ============================================================================
// JWT (HS256)
// ============================================================================

/// Claims embedded in a PokeVault JWT.
///
/// Only the minimal RFC 7519 registered claims are used:
/// - `sub` — subject (user email)
/// - `exp` — expiry (Unix timestamp, seconds)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject — the authenticated user's email.
    pub sub: String,
    /// Expiry — Unix timestamp in seconds after which the token is invalid.
    pub exp: usize,
}

/// Issues an HS256-signed JWT for `subject`.
///
/// `expires_in_secs` is added to the current Unix timestamp to set `exp`.
///
/// # Errors
///
/// Returns [`VaultError::Unauthorized`] if JWT encoding fails.
pub fn generate_jwt(subject: &str, secret: &str, expires_in_secs: u64) -> Result<String> {
    let exp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        .saturating_add(expires_in_secs) as usize;

    let claims = Claims {
        sub: subject.to_string(),
        exp,
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| VaultError::Unauthorized(format!("JWT encode: {e}")))
}

/// Validates an HS256 JWT and returns its [`Claims`].
///
/// The `jsonwebtoken` library automatically checks signature integrity and
/// the `exp` claim.
///
/// # Errors
///
/// Returns [`VaultError::Unauthorized`] for any validation failure:
/// bad signature, expired token, malformed header/payload, wrong algorithm.
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(), // validates exp, requires HS256
    )
    .map_err(|e| VaultError::Unauthorized(format!("JWT validation: {e}")))?;

    Ok(token_data.claims)
}

// ============================================================================
// Current user resolution
// ============================================================================

/// Resolve the authenticated user from the `Authorization` header.
///
/// # Errors
///
/// [`VaultError::Unauthorized`] when the header is missing/malformed, the
/// token is invalid, or the token's subject no longer exists.
pub async fn current_user(state: &AppState, headers: &HeaderMap) -> Result<User> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| VaultError::Unauthorized("missing Authorization header".into()))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| VaultError::Unauthorized("missing Bearer prefix".into()))?;

    let claims = validate_jwt(token, &state.jwt_secret)?;
    state
        .users
        .get_by_email(&claims.sub)
        .await
        .ok_or_else(|| VaultError::Unauthorized("user not found".into()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------
    // hash_password / verify_password
    // ------------------------------------------------------------------

    #[test]
    fn test_hash_and_verify_password() {
        let password = "hunter2";
        let hash = hash_password(password).expect("hash must succeed");
        assert!(!hash.is_empty(), "hash must not be empty");

        let ok = verify_password(password, &hash).expect("verify must succeed");
        assert!(ok, "correct password must verify as true");
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("correct_password").expect("hash must succeed");
        let ok = verify_password("wrong_password", &hash).expect("verify must succeed");
        assert!(!ok, "wrong password must verify as false");
    }

    // ------------------------------------------------------------------
    // generate_jwt / validate_jwt
    // ------------------------------------------------------------------

    #[test]
    fn test_generate_jwt_and_validate() {
        let secret = "super_secret_key_for_testing";
        let email = "ash@example.com";

        let token = generate_jwt(email, secret, 3600).expect("JWT generation must succeed");
        assert!(!token.is_empty(), "JWT must not be empty");

        let claims = validate_jwt(&token, secret).expect("JWT validation must succeed");
        assert_eq!(claims.sub, email, "sub claim must match the email");
    }

    #[test]
    fn test_validate_expired_jwt() {
        let secret = "super_secret_key_for_testing";

        let past_exp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
            .saturating_sub(3600) as usize; // 1 hour in the past

        let claims = Claims {
            sub: "ash@example.com".to_string(),
            exp: past_exp,
        };

        let expired_token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encoding expired token must succeed");

        let result = validate_jwt(&expired_token, secret);
        assert!(
            matches!(result, Err(VaultError::Unauthorized(_))),
            "expired JWT must return Unauthorized, got: {result:?}"
        );
    }

    #[test]
    fn test_validate_jwt_wrong_secret() {
        let token =
            generate_jwt("ash@example.com", "correct_secret", 3600).expect("generation must succeed");

        let result = validate_jwt(&token, "wrong_secret");
        assert!(
            matches!(result, Err(VaultError::Unauthorized(_))),
            "wrong secret must return Unauthorized"
        );
    }

    #[test]
    fn test_validate_jwt_malformed() {
        let result = validate_jwt("not.a.jwt", "secret");
        assert!(
            matches!(result, Err(VaultError::Unauthorized(_))),
            "malformed JWT must return Unauthorized"
        );
    }

    // ------------------------------------------------------------------
    // current_user
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_current_user_resolves_registered_account() {
        let state = crate::api::server::testing::test_state();
        let token = crate::api::server::testing::register_and_login(&state, "ash@example.com").await;

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        let user = current_user(&state, &headers).await.unwrap();
        assert_eq!(user.email, "ash@example.com");
    }

    #[tokio::test]
    async fn test_current_user_missing_header() {
        let state = crate::api::server::testing::test_state();
        let result = current_user(&state, &HeaderMap::new()).await;
        assert!(matches!(result, Err(VaultError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_current_user_unknown_subject() {
        let state = crate::api::server::testing::test_state();
        // Valid signature, but the subject was never registered.
        let token = generate_jwt("ghost@example.com", &state.jwt_secret, 3600).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        let result = current_user(&state, &headers).await;
        assert!(matches!(result, Err(VaultError::Unauthorized(_))));
    }
}
