//! Liveness routes.

use axum::Json;
use serde_json::{json, Value};

/// `GET /` — banner for humans poking at the base URL.
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "API running!" }))
}

/// `GET /health` — liveness probe, no auth required.
pub async fn get_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_root_banner() {
        let Json(body) = root().await;
        assert_eq!(body["message"], "API running!");
    }

    #[tokio::test]
    async fn test_health_ok() {
        let Json(body) = get_health().await;
        assert_eq!(body["status"], "ok");
    }
}
