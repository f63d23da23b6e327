//! Pokédex routes — public read surface over the cached upstream.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::server::AppState;
use crate::dex::Pokemon;
use crate::error::Result;

/// Query parameters for `GET /pokedex/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    20
}

/// `GET /pokedex/look/{id_or_name}` — full record by numeric ID or name
/// (case-insensitive). 404 for unknown identifiers, 502 when the upstream
/// keeps failing.
pub async fn look(
    State(state): State<Arc<AppState>>,
    Path(id_or_name): Path<String>,
) -> Result<Json<Pokemon>> {
    Ok(Json(state.dex.get(&id_or_name).await?))
}

/// `GET /pokedex/random` — a random record; by contract never an error.
pub async fn random(State(state): State<Arc<AppState>>) -> Json<Pokemon> {
    Json(state.dex.random().await)
}

/// `GET /pokedex/search?query=&limit=` — name-substring autocomplete.
///
/// The limit is clamped to 1–50; an empty query yields an empty item list.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<Value> {
    let limit = params.limit.clamp(1, 50);
    let items = state.dex.search(&params.query, limit).await;
    Json(json!({ "items": items }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::server::testing::test_state;
    use crate::error::VaultError;

    #[tokio::test]
    async fn test_look_by_name_and_id() {
        let state = test_state();
        let Json(by_name) = look(State(Arc::clone(&state)), Path("pikachu".into()))
            .await
            .unwrap();
        assert_eq!(by_name.id, 25);

        let Json(by_id) = look(State(state), Path("25".into())).await.unwrap();
        assert_eq!(by_id.name, "pikachu");
    }

    #[tokio::test]
    async fn test_look_unknown_is_not_found() {
        let state = test_state();
        let err = look(State(state), Path("missingno".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_search_items_shape() {
        let state = test_state();
        let Json(body) = search(
            State(state),
            Query(SearchParams {
                query: "chariz".into(),
                limit: 10,
            }),
        )
        .await;
        assert_eq!(body["items"][0]["id"], 6);
        assert_eq!(body["items"][0]["name"], "charizard");
    }

    #[tokio::test]
    async fn test_search_empty_query_yields_empty_items() {
        let state = test_state();
        let Json(body) = search(
            State(state),
            Query(SearchParams {
                query: "  ".into(),
                limit: 10,
            }),
        )
        .await;
        assert_eq!(body["items"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_search_limit_is_clamped() {
        let state = test_state();
        // limit 0 would be nonsense; the handler clamps it up to 1.
        let Json(body) = search(
            State(state),
            Query(SearchParams {
                query: "a".into(),
                limit: 0,
            }),
        )
        .await;
        assert!(body["items"].as_array().unwrap().len() <= 1);
    }

    #[tokio::test]
    async fn test_random_returns_a_record() {
        let state = test_state();
        let Json(pokemon) = random(State(state)).await;
        assert!(pokemon.id > 0);
        assert!(!pokemon.name.is_empty());
    }
}
