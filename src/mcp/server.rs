//! MCP server loop and backend tool dispatch.

use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use crate::config::McpConfig;
use crate::error::Result;

use super::protocol::{
    McpRequest, McpResponse, ToolDef, INVALID_PARAMS, METHOD_NOT_FOUND, PARSE_ERROR,
};

/// MCP protocol revision advertised in the initialize handshake.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// Authenticated HTTP client for the PokeVault backend.
///
/// Tool calls never fail the server loop: any HTTP or network error is
/// folded into a JSON value with an `error` field, mirroring what the
/// calling agent should see.
pub struct BackendClient {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

impl BackendClient {
    /// Build a client from the MCP configuration.
    pub fn new(config: &McpConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.access_token.clone(),
            http,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Value {
        let builder = builder.header("Authorization", format!("Bearer {}", self.token));
        match builder.send().await {
            Ok(response) => {
                let status = response.status();
                let body = response
                    .json::<Value>()
                    .await
                    .unwrap_or_else(|e| json!({ "error": format!("unparseable body: {e}") }));
                if status.is_success() {
                    body
                } else {
                    json!({ "error": format!("HTTP {status}"), "detail": body })
                }
            }
            Err(e) => json!({ "error": e.to_string() }),
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Value {
        let url = format!("{}{path}", self.base_url);
        self.send(self.http.get(url).query(query)).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Value {
        let url = format!("{}{path}", self.base_url);
        let mut builder = self.http.post(url);
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        self.send(builder).await
    }

    async fn patch(&self, path: &str, body: Value) -> Value {
        let url = format!("{}{path}", self.base_url);
        self.send(self.http.patch(url).json(&body)).await
    }

    async fn delete(&self, path: &str) -> Value {
        let url = format!("{}{path}", self.base_url);
        self.send(self.http.delete(url)).await
    }
}

/// Stdio MCP server exposing the backend HTTP surface as tools.
pub struct McpServer {
    backend: BackendClient,
}

impl McpServer {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// Read newline-delimited JSON-RPC requests from stdin until EOF,
    /// writing one response line per request (notifications excluded).
    pub async fn run(&self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let response = match serde_json::from_str::<McpRequest>(line) {
                Ok(request) => self.handle(request).await,
                Err(e) => Some(McpResponse::failure(
                    Value::Null,
                    PARSE_ERROR,
                    format!("invalid JSON-RPC: {e}"),
                )),
            };
            if let Some(response) = response {
                let mut out = serde_json::to_string(&response)?;
                out.push('\n');
                stdout.write_all(out.as_bytes()).await?;
                stdout.flush().await?;
            }
        }
        Ok(())
    }

    /// Dispatch one request. Returns `None` for notifications.
    pub async fn handle(&self, request: McpRequest) -> Option<McpResponse> {
        let Some(id) = request.id.clone() else {
            // Notification — nothing to answer.
            debug!(method = %request.method, "ignoring notification");
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => McpResponse::success(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": {
                        "name": "pokevault-mcp",
                        "version": env!("CARGO_PKG_VERSION"),
                    }
                }),
            ),
            "ping" => McpResponse::success(id, json!({})),
            "tools/list" => McpResponse::success(id, json!({ "tools": tool_defs() })),
            "tools/call" => {
                let name = request.params["name"].as_str().unwrap_or_default().to_string();
                let args = request.params["arguments"].clone();
                match self.call_tool(&name, &args).await {
                    Ok(value) => McpResponse::success(
                        id,
                        json!({
                            "content": [{ "type": "text", "text": value.to_string() }]
                        }),
                    ),
                    Err(message) => {
                        warn!(tool = %name, error = %message, "tool call rejected");
                        McpResponse::failure(id, INVALID_PARAMS, message)
                    }
                }
            }
            other => McpResponse::failure(
                id,
                METHOD_NOT_FOUND,
                format!("unknown method: {other}"),
            ),
        };
        Some(response)
    }

    /// Execute one tool against the backend. `Err` means the request itself
    /// was malformed; backend-side failures come back as `Ok` values with an
    /// `error` field.
    async fn call_tool(&self, name: &str, args: &Value) -> std::result::Result<Value, String> {
        let str_arg = |key: &str| -> std::result::Result<String, String> {
            args[key]
                .as_str()
                .map(String::from)
                .ok_or_else(|| format!("missing required argument: {key}"))
        };
        let int_arg = |key: &str| -> std::result::Result<u64, String> {
            args[key]
                .as_u64()
                .ok_or_else(|| format!("missing required argument: {key}"))
        };

        let value = match name {
            // ── Pokédex ──────────────────────────────────────────────────
            "lookup_pokemon" => {
                let ident = str_arg("name_or_id")?;
                self.backend.get(&format!("/pokedex/look/{ident}"), &[]).await
            }
            "search_pokemon" => {
                let query = str_arg("query")?;
                self.backend
                    .get("/pokedex/search", &[("query", query), ("limit", "20".into())])
                    .await
            }
            "random_pokemon" => self.backend.get("/pokedex/random", &[]).await,
            // ── Collection ───────────────────────────────────────────────
            "list_collection" => self.backend.get("/collection", &[]).await,
            "add_to_collection" => {
                let id = int_arg("pokemon_id")?;
                self.backend.post(&format!("/collection/add/{id}"), None).await
            }
            "remove_from_collection" => {
                let id = int_arg("pokemon_id")?;
                self.backend.delete(&format!("/collection/remove/{id}")).await
            }
            // ── Teams ────────────────────────────────────────────────────
            "list_teams" => self.backend.get("/teams", &[]).await,
            "create_team" => {
                let team_name = str_arg("name")?;
                self.backend
                    .post("/teams", Some(json!({ "name": team_name })))
                    .await
            }
            "get_team" => {
                let id = int_arg("team_id")?;
                self.backend.get(&format!("/teams/{id}"), &[]).await
            }
            "rename_team" => {
                let id = int_arg("team_id")?;
                let new_name = str_arg("new_name")?;
                self.backend
                    .patch(
                        &format!("/teams/{id}/rename"),
                        json!({ "new_name": new_name }),
                    )
                    .await
            }
            "add_to_team" => {
                let team = int_arg("team_id")?;
                let pokemon = int_arg("pokemon_id")?;
                self.backend
                    .post(&format!("/teams/{team}/add/{pokemon}"), None)
                    .await
            }
            "remove_from_team" => {
                let team = int_arg("team_id")?;
                let pokemon = int_arg("pokemon_id")?;
                self.backend
                    .delete(&format!("/teams/{team}/remove/{pokemon}"))
                    .await
            }
            "delete_team" => {
                let id = int_arg("team_id")?;
                self.backend.delete(&format!("/teams/{id}")).await
            }
            // ── AI ───────────────────────────────────────────────────────
            "compare_pokemon" => {
                let a = str_arg("pokemon_a")?;
                let b = str_arg("pokemon_b")?;
                self.backend
                    .post(
                        "/ai/compare",
                        Some(json!({ "pokemon_a": a, "pokemon_b": b })),
                    )
                    .await
            }
            "recommend_pokemon" => self.backend.post("/ai/recommendations", None).await,
            "build_auto_team" => self.backend.post("/ai/auto-team", None).await,
            "pokemon_fun_facts" => {
                let pokemon = str_arg("name")?;
                self.backend.get(&format!("/ai/fun-facts/{pokemon}"), &[]).await
            }
            // ── Utility ──────────────────────────────────────────────────
            "healthcheck" => self.backend.get("/health", &[]).await,
            other => return Err(format!("unknown tool: {other}")),
        };
        Ok(value)
    }
}

/// Schema helper: an object with string properties.
fn string_args(fields: &[(&str, &str)]) -> Value {
    let mut properties = serde_json::Map::new();
    for (field, description) in fields {
        properties.insert(
            field.to_string(),
            json!({ "type": "string", "description": description }),
        );
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": fields.iter().map(|(f, _)| *f).collect::<Vec<_>>(),
    })
}

/// Schema helper: an object with integer properties.
fn int_args(fields: &[(&str, &str)]) -> Value {
    let mut properties = serde_json::Map::new();
    for (field, description) in fields {
        properties.insert(
            field.to_string(),
            json!({ "type": "integer", "description": description }),
        );
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": fields.iter().map(|(f, _)| *f).collect::<Vec<_>>(),
    })
}

/// The advertised tool catalog, mirroring the HTTP surface.
fn tool_defs() -> Vec<ToolDef> {
    let tool = |name: &str, description: &str, schema: Value| ToolDef {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: schema,
    };

    vec![
        tool(
            "lookup_pokemon",
            "Get full Pokémon detail by name or numeric ID.",
            string_args(&[("name_or_id", "Pokémon name or Pokédex ID")]),
        ),
        tool(
            "search_pokemon",
            "Search Pokémon by name substring.",
            string_args(&[("query", "Search text, case-insensitive")]),
        ),
        tool("random_pokemon", "Get a random Pokémon.", json!({ "type": "object", "properties": {} })),
        tool("list_collection", "List collection items.", json!({ "type": "object", "properties": {} })),
        tool(
            "add_to_collection",
            "Add a Pokémon to the collection.",
            int_args(&[("pokemon_id", "Pokédex ID")]),
        ),
        tool(
            "remove_from_collection",
            "Remove a Pokémon from the collection.",
            int_args(&[("pokemon_id", "Pokédex ID")]),
        ),
        tool("list_teams", "List all teams.", json!({ "type": "object", "properties": {} })),
        tool(
            "create_team",
            "Create a team with a name.",
            string_args(&[("name", "Team name")]),
        ),
        tool("get_team", "Get team detail.", int_args(&[("team_id", "Team ID")])),
        tool(
            "rename_team",
            "Rename a team.",
            json!({
                "type": "object",
                "properties": {
                    "team_id": { "type": "integer", "description": "Team ID" },
                    "new_name": { "type": "string", "description": "New team name" }
                },
                "required": ["team_id", "new_name"]
            }),
        ),
        tool(
            "add_to_team",
            "Add a Pokémon to a team.",
            int_args(&[("team_id", "Team ID"), ("pokemon_id", "Pokédex ID")]),
        ),
        tool(
            "remove_from_team",
            "Remove a Pokémon from a team.",
            int_args(&[("team_id", "Team ID"), ("pokemon_id", "Pokédex ID")]),
        ),
        tool("delete_team", "Delete a team.", int_args(&[("team_id", "Team ID")])),
        tool(
            "compare_pokemon",
            "Compare two Pokémon and predict a winner.",
            string_args(&[
                ("pokemon_a", "First Pokémon name or ID"),
                ("pokemon_b", "Second Pokémon name or ID"),
            ]),
        ),
        tool(
            "recommend_pokemon",
            "AI recommendations based on the collection.",
            json!({ "type": "object", "properties": {} }),
        ),
        tool(
            "build_auto_team",
            "AI auto team builder over the collection.",
            json!({ "type": "object", "properties": {} }),
        ),
        tool(
            "pokemon_fun_facts",
            "Get AI-generated fun facts about a Pokémon.",
            string_args(&[("name", "Pokémon name")]),
        ),
        tool(
            "healthcheck",
            "Check that the backend is reachable.",
            json!({ "type": "object", "properties": {} }),
        ),
    ]
}

// ============================================================================
// Tests
// ============================================================================
