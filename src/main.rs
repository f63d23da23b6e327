//! PokeVault binary — `serve` runs the HTTP API, `mcp` runs the stdio
//! tool-server against a running backend.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use pokevault::ai::{ChatModel, OpenAiProvider};
use pokevault::api::server::{start_server, AppState};
use pokevault::cache::TtlCache;
use pokevault::config::AppConfig;
use pokevault::dex::{PokeApiClient, Pokedex};
use pokevault::mcp::{BackendClient, McpServer};
use pokevault::store::{CollectionStore, TeamStore, UserStore};

#[derive(Parser)]
#[command(name = "pokevault", version, about = "Pokémon collection backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server (default).
    Serve,
    /// Run the MCP stdio tool-server against a running backend.
    Mcp,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pokevault=info".into()),
        )
        .init();

    let config = AppConfig::from_env();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Mcp => {
            let server = McpServer::new(BackendClient::new(&config.mcp));
            server.run().await?;
            Ok(())
        }
    }
}

async fn serve(mut config: AppConfig) -> anyhow::Result<()> {
    if config.auth.jwt_secret.is_empty() {
        // Rotates on every restart, invalidating previously issued tokens.
        config.auth.jwt_secret = format!(
            "{}{}",
            uuid::Uuid::new_v4().simple(),
            uuid::Uuid::new_v4().simple()
        );
        tracing::warn!("JWT_SECRET not set; using an ephemeral secret for this process");
    }

    let users = UserStore::new(config.data_dir.join("users.json"));
    let collection = CollectionStore::new(config.data_dir.join("collection.json"));
    let teams = TeamStore::new(config.data_dir.join("teams.json"));
    users.load().await?;
    collection.load().await?;
    teams.load().await?;

    let cache = Arc::new(TtlCache::new());
    let upstream = Arc::new(PokeApiClient::new(&config.dex));
    let dex = Arc::new(Pokedex::new(
        upstream,
        cache,
        Duration::from_secs(config.dex.cache_ttl_seconds),
    ));

    let model =
        OpenAiProvider::from_config(&config.model).map(|p| Arc::new(p) as Arc<dyn ChatModel>);
    if model.is_none() {
        tracing::warn!("OPENAI_API_KEY not set; AI endpoints will return a configuration error");
    }

    let state = AppState::new(&config, users, collection, teams, dex, model);
    start_server(&config, state)
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
