//! Collection routes — the authenticated user's personal Pokémon set.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::auth::current_user;
use crate::api::server::AppState;
use crate::error::{Result, VaultError};

/// `GET /collection` — the caller's Pokémon IDs, newest first.
pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    let user = current_user(&state, &headers).await?;
    let ids = state.collection.list_ids(user.id).await;
    Ok(Json(json!({ "items": ids })))
}

/// `POST /collection/add/{pokemon_id}` — 409 on duplicates.
pub async fn add(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(pokemon_id): Path<u32>,
) -> Result<Json<Value>> {
    let user = current_user(&state, &headers).await?;
    if pokemon_id == 0 {
        return Err(VaultError::InvalidInput("pokemon_id must be >= 1".into()));
    }
    state.collection.add(user.id, pokemon_id).await?;
    Ok(Json(json!({ "added": true, "pokemon_id": pokemon_id })))
}

/// `DELETE /collection/remove/{pokemon_id}` — 404 when absent.
pub async fn remove(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(pokemon_id): Path<u32>,
) -> Result<Json<Value>> {
    let user = current_user(&state, &headers).await?;
    state.collection.remove(user.id, pokemon_id).await?;
    Ok(Json(json!({ "removed": true, "pokemon_id": pokemon_id })))
}
