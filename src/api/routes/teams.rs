//! Team routes — CRUD over the authenticated user's teams.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::auth::current_user;
use crate::api::server::AppState;
use crate::error::{Result, VaultError};
use crate::store::Team;

// ============================================================================
// Request / Response types
// ============================================================================

/// Body for `POST /teams`.
#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
}

/// Body for `PATCH /teams/{id}/rename`.
#[derive(Debug, Deserialize)]
pub struct RenameTeamRequest {
    pub new_name: String,
}

/// Member view inside a team detail, enriched from the Pokédex.
#[derive(Debug, Serialize)]
pub struct TeamMemberView {
    pub id: u32,
    pub name: String,
    pub sprite: Option<String>,
    pub types: Vec<String>,
}

/// Full team view.
#[derive(Debug, Serialize)]
pub struct TeamDetail {
    pub id: u64,
    pub name: String,
    pub count: usize,
    pub members: Vec<TeamMemberView>,
}

/// Compact view for listings.
#[derive(Debug, Serialize)]
pub struct TeamSummary {
    pub id: u64,
    pub name: String,
    pub count: usize,
    pub created_at: String,
}

/// Enrich a stored team into its detail view. A member whose record cannot
/// be fetched degrades to a placeholder instead of failing the request.
async fn team_detail(state: &AppState, team: &Team) -> TeamDetail {
    let mut members = Vec::with_capacity(team.members.len());
    for member in &team.members {
        let view = match state.dex.get(&member.pokemon_id.to_string()).await {
            Ok(p) => TeamMemberView {
                id: p.id,
                name: p.name,
                sprite: p.sprite,
                types: p.types,
            },
            Err(_) => TeamMemberView {
                id: member.pokemon_id,
                name: format!("pokemon-{}", member.pokemon_id),
                sprite: None,
                types: Vec::new(),
            },
        };
        members.push(view);
    }
    TeamDetail {
        id: team.id,
        name: team.name.clone(),
        count: members.len(),
        members,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// `POST /teams` — create an empty team.
pub async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<TeamDetail>)> {
    let user = current_user(&state, &headers).await?;
    let team = state.teams.create(user.id, &body.name).await?;
    Ok((StatusCode::CREATED, Json(team_detail(&state, &team).await)))
}

/// `GET /teams` — the caller's teams, newest first.
pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<TeamSummary>>> {
    let user = current_user(&state, &headers).await?;
    let teams = state.teams.list_by_user(user.id).await;
    Ok(Json(
        teams
            .into_iter()
            .map(|t| TeamSummary {
                id: t.id,
                name: t.name,
                count: t.members.len(),
                created_at: t.created_at.to_rfc3339(),
            })
            .collect(),
    ))
}

/// `GET /teams/{team_id}` — detail with enriched members.
pub async fn detail(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(team_id): Path<u64>,
) -> Result<Json<TeamDetail>> {
    let user = current_user(&state, &headers).await?;
    let team = state.teams.get_owned(team_id, user.id).await?;
    Ok(Json(team_detail(&state, &team).await))
}

/// `PATCH /teams/{team_id}/rename`.
pub async fn rename(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(team_id): Path<u64>,
    Json(body): Json<RenameTeamRequest>,
) -> Result<Json<TeamDetail>> {
    let user = current_user(&state, &headers).await?;
    let team = state.teams.rename(team_id, user.id, &body.new_name).await?;
    Ok(Json(team_detail(&state, &team).await))
}

/// `POST /teams/{team_id}/add/{pokemon_id}` — member must already be in the
/// caller's collection.
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((team_id, pokemon_id)): Path<(u64, u32)>,
) -> Result<Json<TeamDetail>> {
    let user = current_user(&state, &headers).await?;

    // Surface a missing/foreign team as 404 before the collection check.
    state.teams.get_owned(team_id, user.id).await?;
    if !state.collection.contains(user.id, pokemon_id).await {
        return Err(VaultError::InvalidInput(
            "you must have this Pokémon in your collection first".into(),
        ));
    }

    let team = state.teams.add_member(team_id, user.id, pokemon_id).await?;
    Ok(Json(team_detail(&state, &team).await))
}

/// `DELETE /teams/{team_id}/remove/{pokemon_id}`.
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((team_id, pokemon_id)): Path<(u64, u32)>,
) -> Result<Json<TeamDetail>> {
    let user = current_user(&state, &headers).await?;
    let team = state
        .teams
        .remove_member(team_id, user.id, pokemon_id)
        .await?;
    Ok(Json(team_detail(&state, &team).await))
}

/// `DELETE /teams/{team_id}`.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(team_id): Path<u64>,
) -> Result<Json<Value>> {
    let user = current_user(&state, &headers).await?;
    state.teams.delete(team_id, user.id).await?;
    Ok(Json(json!({ "deleted": true })))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::server::testing::{register_and_login, test_state};

    async fn auth_headers(state: &AppState, email: &str) -> HeaderMap {
        let token = register_and_login(state, email).await;
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let state = test_state();
        let headers = auth_headers(&state, "ash@example.com").await;

        let (status, Json(team)) = create(
            State(Arc::clone(&state)),
            headers.clone(),
            Json(CreateTeamRequest {
                name: "Kanto".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(team.name, "Kanto");
        assert_eq!(team.count, 0);

        let Json(teams) = list(State(state), headers).await.unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].name, "Kanto");
    }

    #[tokio::test]
    async fn test_add_member_requires_collection() {
        let state = test_state();
        let headers = auth_headers(&state, "ash@example.com").await;

        let (_, Json(team)) = create(
            State(Arc::clone(&state)),
            headers.clone(),
            Json(CreateTeamRequest { name: "T".into() }),
        )
        .await
        .unwrap();

        let err = add_member(
            State(Arc::clone(&state)),
            headers.clone(),
            Path((team.id, 25)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, VaultError::InvalidInput(_)));

        // After collecting it, the add succeeds and the member is enriched.
        let user = state.users.get_by_email("ash@example.com").await.unwrap();
        state.collection.add(user.id, 25).await.unwrap();
        let Json(team) = add_member(State(state), headers, Path((team.id, 25)))
            .await
            .unwrap();
        assert_eq!(team.count, 1);
        assert_eq!(team.members[0].name, "pikachu");
        assert!(team.members[0].sprite.is_some());
    }

    #[tokio::test]
    async fn test_member_outside_catalog_degrades_to_placeholder() {
        let state = test_state();
        let headers = auth_headers(&state, "ash@example.com").await;
        let user = state.users.get_by_email("ash@example.com").await.unwrap();

        let (_, Json(team)) = create(
            State(Arc::clone(&state)),
            headers.clone(),
            Json(CreateTeamRequest { name: "T".into() }),
        )
        .await
        .unwrap();

        // 9999 is collectible but unknown to the (stub) upstream.
        state.collection.add(user.id, 9999).await.unwrap();
        let Json(team) = add_member(State(state), headers, Path((team.id, 9999)))
            .await
            .unwrap();
        assert_eq!(team.members[0].name, "pokemon-9999");
        assert!(team.members[0].types.is_empty());
    }

    #[tokio::test]
    async fn test_rename_and_delete() {
        let state = test_state();
        let headers = auth_headers(&state, "ash@example.com").await;

        let (_, Json(team)) = create(
            State(Arc::clone(&state)),
            headers.clone(),
            Json(CreateTeamRequest { name: "Old".into() }),
        )
        .await
        .unwrap();

        let Json(renamed) = rename(
            State(Arc::clone(&state)),
            headers.clone(),
            Path(team.id),
            Json(RenameTeamRequest {
                new_name: "New".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(renamed.name, "New");

        let Json(body) = delete(State(Arc::clone(&state)), headers.clone(), Path(team.id))
            .await
            .unwrap();
        assert_eq!(body["deleted"], true);

        let err = detail(State(state), headers, Path(team.id))
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_foreign_team_is_invisible() {
        let state = test_state();
        let ash = auth_headers(&state, "ash@example.com").await;
        let gary = auth_headers(&state, "gary@example.com").await;

        let (_, Json(team)) = create(
            State(Arc::clone(&state)),
            ash,
            Json(CreateTeamRequest { name: "Mine".into() }),
        )
        .await
        .unwrap();

        let err = detail(State(state), gary, Path(team.id)).await.unwrap_err();
        assert!(matches!(err, VaultError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_member_not_on_team_is_not_found() {
        let state = test_state();
        let headers = auth_headers(&state, "ash@example.com").await;

        let (_, Json(team)) = create(
            State(Arc::clone(&state)),
            headers.clone(),
            Json(CreateTeamRequest { name: "T".into() }),
        )
        .await
        .unwrap();

        let err = remove_member(State(state), headers, Path((team.id, 25)))
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::NotFound(_)));
    }
}
