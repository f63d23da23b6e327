//! Axum API server for PokeVault.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_mw;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::ai::ChatModel;
use crate::config::AppConfig;
use crate::dex::Pokedex;
use crate::store::{CollectionStore, TeamStore, UserStore};

/// Shared state for all API handlers.
///
/// Constructed once at process start from loaded stores and the injected
/// Pokédex/chat-model components, then shared behind an `Arc`.
pub struct AppState {
    /// Secret used to sign and verify HS256 JWTs.
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    pub access_ttl_secs: u64,
    /// Refresh token lifetime in seconds.
    pub refresh_ttl_secs: u64,
    /// Registered accounts.
    pub users: UserStore,
    /// Per-user Pokémon collections.
    pub collection: CollectionStore,
    /// Per-user teams.
    pub teams: TeamStore,
    /// Cached Pokédex over the upstream API.
    pub dex: Arc<Pokedex>,
    /// Chat-model provider. `None` when no API key is configured; the AI
    /// endpoints then report a configuration error.
    pub model: Option<Arc<dyn ChatModel>>,
}

impl AppState {
    /// Assemble the state from config and pre-built components.
    pub fn new(
        config: &AppConfig,
        users: UserStore,
        collection: CollectionStore,
        teams: TeamStore,
        dex: Arc<Pokedex>,
        model: Option<Arc<dyn ChatModel>>,
    ) -> Self {
        Self {
            jwt_secret: config.auth.jwt_secret.clone(),
            access_ttl_secs: config.auth.access_token_expire_minutes * 60,
            refresh_ttl_secs: config.auth.refresh_token_expire_minutes * 60,
            users,
            collection,
            teams,
            dex,
            model,
        }
    }
}

/// Build the axum router with all API routes.
pub fn build_router(state: AppState) -> Router {
    // Wrap state in Arc once so it is shared by the middleware layer and
    // the route handlers without a double-Arc.
    let shared_state = Arc::new(state);

    // The API serves browser frontends on arbitrary origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Liveness
        .route("/", get(super::routes::health::root))
        .route("/health", get(super::routes::health::get_health))
        // Auth
        .route("/auth/register", post(super::routes::auth::register))
        .route("/auth/login", post(super::routes::auth::login))
        .route("/auth/refresh", post(super::routes::auth::refresh))
        .route("/auth/me", get(super::routes::auth::me))
        // Pokédex
        .route(
            "/pokedex/look/{id_or_name}",
            get(super::routes::pokedex::look),
        )
        .route("/pokedex/random", get(super::routes::pokedex::random))
        .route("/pokedex/search", get(super::routes::pokedex::search))
        // Collection
        .route("/collection", get(super::routes::collection::list))
        .route(
            "/collection/add/{pokemon_id}",
            post(super::routes::collection::add),
        )
        .route(
            "/collection/remove/{pokemon_id}",
            delete(super::routes::collection::remove),
        )
        // Teams
        .route(
            "/teams",
            get(super::routes::teams::list).post(super::routes::teams::create),
        )
        .route(
            "/teams/{team_id}",
            get(super::routes::teams::detail).delete(super::routes::teams::delete),
        )
        .route(
            "/teams/{team_id}/rename",
            patch(super::routes::teams::rename),
        )
        .route(
            "/teams/{team_id}/add/{pokemon_id}",
            post(super::routes::teams::add_member),
        )
        .route(
            "/teams/{team_id}/remove/{pokemon_id}",
            delete(super::routes::teams::remove_member),
        )
        // AI
        .route("/ai/identify", post(super::routes::ai::identify))
        .route("/ai/compare", post(super::routes::ai::compare))
        .route(
            "/ai/recommendations",
            post(super::routes::ai::recommendations),
        )
        .route("/ai/auto-team", post(super::routes::ai::auto_team))
        .route("/ai/fun-facts/{name}", get(super::routes::ai::fun_facts))
        // Body size limit: 5 MiB, enough for an uploaded image. Applied
        // before the auth middleware so oversized payloads are rejected
        // cheaply before any token validation.
        .layer(DefaultBodyLimit::max(5 * 1024 * 1024))
        .layer(cors)
        .layer(axum_mw::from_fn_with_state(
            Arc::clone(&shared_state),
            super::middleware::auth_middleware,
        ))
        .with_state(shared_state)
}

/// Start the API server.
pub async fn start_server(
    config: &AppConfig,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = build_router(state);
    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("PokeVault API listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
