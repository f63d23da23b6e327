//! HTTP API for PokeVault (axum).

pub mod auth;
pub mod middleware;
pub mod routes;
pub mod server;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::VaultError;

/// Every handler returns `Result<_, VaultError>`; this single mapping turns
/// the error taxonomy into status codes with a JSON `detail` body.
impl IntoResponse for VaultError {
    fn into_response(self) -> Response {
        let status = match &self {
            VaultError::NotFound(_) => StatusCode::NOT_FOUND,
            VaultError::Upstream(_) => StatusCode::BAD_GATEWAY,
            VaultError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            VaultError::Conflict(_) => StatusCode::CONFLICT,
            VaultError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            VaultError::Config(_)
            | VaultError::Provider(_)
            | VaultError::Io(_)
            | VaultError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
