//! AI routes — vision identify, compare, recommendations, auto-team, fun
//! facts.
//!
//! All handlers are thin: resolve the caller where required, gather inputs,
//! and delegate to the service functions in [`crate::ai`].

use axum::extract::{Multipart, Path, State};
use axum::http::HeaderMap;
use axum::Json;
use std::sync::Arc;

use crate::ai::auto_team::AutoTeamResponse;
use crate::ai::compare::{CompareRequest, CompareResponse};
use crate::ai::fun_facts::FunFactsResponse;
use crate::ai::recommend::RecommendResponse;
use crate::ai::vision::IdentifyResponse;
use crate::ai::ChatModel;
use crate::api::auth::current_user;
use crate::api::server::AppState;
use crate::error::{Result, VaultError};

/// The chat model is optional at startup; AI endpoints need it.
fn require_model(state: &AppState) -> Result<Arc<dyn ChatModel>> {
    state
        .model
        .clone()
        .ok_or_else(|| VaultError::Config("OPENAI_API_KEY not configured".into()))
}

/// `POST /ai/identify` — multipart image upload, authenticated.
pub async fn identify(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<IdentifyResponse>> {
    current_user(&state, &headers).await?;
    let model = require_model(&state)?;

    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| VaultError::InvalidInput(format!("bad multipart body: {e}")))?
    {
        if field.name() == Some("image") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| VaultError::InvalidInput(format!("unreadable image field: {e}")))?;
            image = Some(bytes);
            break;
        }
    }
    let image = image
        .filter(|b| !b.is_empty())
        .ok_or_else(|| VaultError::InvalidInput("an 'image' file field is required".into()))?;

    let response = crate::ai::vision::identify(model.as_ref(), &state.dex, &image).await?;
    Ok(Json(response))
}

/// `POST /ai/compare` — public.
pub async fn compare(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CompareRequest>,
) -> Result<Json<CompareResponse>> {
    let model = require_model(&state)?;
    let response = crate::ai::compare::compare(model.as_ref(), &state.dex, &request).await?;
    Ok(Json(response))
}

/// `POST /ai/recommendations` — authenticated; analyzes the caller's
/// collection.
pub async fn recommendations(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<RecommendResponse>> {
    let user = current_user(&state, &headers).await?;
    let model = require_model(&state)?;

    let owned = state.collection.list_ids(user.id).await;
    let response = crate::ai::recommend::recommend(model.as_ref(), &state.dex, &owned).await?;
    Ok(Json(response))
}

/// `POST /ai/auto-team` — authenticated; builds the best team from the
/// caller's collection.
pub async fn auto_team(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<AutoTeamResponse>> {
    let user = current_user(&state, &headers).await?;
    let model = require_model(&state)?;

    let owned = state.collection.list_ids(user.id).await;
    let response = crate::ai::auto_team::auto_team(model.as_ref(), &state.dex, &owned).await?;
    Ok(Json(response))
}

/// `GET /ai/fun-facts/{name}` — public; 404 for unknown species.
pub async fn fun_facts(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<FunFactsResponse>> {
    let model = require_model(&state)?;
    let response = crate::ai::fun_facts::fun_facts(model.as_ref(), &state.dex, &name).await?;
    Ok(Json(response))
}

// ============================================================================
// Tests
// ============================================================================
