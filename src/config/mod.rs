//! Application configuration.
//!
//! All values are read once at startup from the environment (a `.env` file is
//! honored via dotenvy) and treated as constants for the process lifetime.
//! Every field has a serde default so partial config files and sparse
//! environments both work.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// HTTP server binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (default: 127.0.0.1).
    pub bind: String,
    /// API port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// JWT issuance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret shared by access and refresh tokens.
    pub jwt_secret: String,
    /// Access token lifetime in minutes.
    pub access_token_expire_minutes: u64,
    /// Refresh token lifetime in minutes.
    pub refresh_token_expire_minutes: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_expire_minutes: 60,
            // 14 days
            refresh_token_expire_minutes: 60 * 24 * 14,
        }
    }
}

/// Upstream PokeAPI and cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DexConfig {
    /// Upstream REST base URL.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Fetch attempts per call (first try + retries).
    pub retries: u32,
    /// Fixed delay between attempts in milliseconds (no backoff).
    pub retry_delay_ms: u64,
    /// TTL applied to every cached record, in seconds.
    pub cache_ttl_seconds: u64,
}

impl Default for DexConfig {
    fn default() -> Self {
        Self {
            base_url: "https://pokeapi.co/api/v2".to_string(),
            timeout_seconds: 5,
            retries: 2,
            retry_delay_ms: 400,
            // 12h
            cache_ttl_seconds: 60 * 60 * 12,
        }
    }
}

/// Chat-model provider settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// API key. AI endpoints return a config error when absent.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
}

/// Settings for the MCP tool-server (`pokevault mcp`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct McpConfig {
    /// Base URL of the running backend the tools call into.
    pub api_url: String,
    /// Bearer token attached to every backend request.
    pub access_token: String,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000".to_string(),
            access_token: String::new(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub dex: DexConfig,
    pub model: ModelConfig,
    pub mcp: McpConfig,
    /// Directory holding the JSON store files (users, collection, teams).
    pub data_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            dex: DexConfig::default(),
            model: ModelConfig::default(),
            mcp: McpConfig::default(),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl AppConfig {
    /// Build the configuration from the process environment.
    ///
    /// Unset variables fall back to defaults; values that fail to parse are
    /// also ignored in favor of the default rather than aborting startup.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(v) = env_var("POKEVAULT_DATA_DIR") {
            cfg.data_dir = PathBuf::from(v);
        }

        if let Some(v) = env_var("BIND_ADDR") {
            cfg.server.bind = v;
        }
        if let Some(v) = env_parse("PORT") {
            cfg.server.port = v;
        }

        if let Some(v) = env_var("JWT_SECRET") {
            cfg.auth.jwt_secret = v;
        }
        if let Some(v) = env_parse("ACCESS_TOKEN_EXPIRE_MINUTES") {
            cfg.auth.access_token_expire_minutes = v;
        }
        if let Some(v) = env_parse("REFRESH_TOKEN_EXPIRE_MINUTES") {
            cfg.auth.refresh_token_expire_minutes = v;
        }

        if let Some(v) = env_var("POKEAPI_BASE_URL") {
            cfg.dex.base_url = v;
        }
        if let Some(v) = env_parse("POKEAPI_TIMEOUT_SECONDS") {
            cfg.dex.timeout_seconds = v;
        }
        if let Some(v) = env_parse("POKEAPI_RETRIES") {
            cfg.dex.retries = v;
        }
        if let Some(v) = env_parse("POKEAPI_RETRY_DELAY_MS") {
            cfg.dex.retry_delay_ms = v;
        }
        if let Some(v) = env_parse("CACHE_TTL_SECONDS") {
            cfg.dex.cache_ttl_seconds = v;
        }

        cfg.model.api_key = env_var("OPENAI_API_KEY");
        cfg.model.model = env_var("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());

        if let Some(v) = env_var("API_URL") {
            cfg.mcp.api_url = v;
        }
        if let Some(v) = env_var("ACCESS_TOKEN") {
            cfg.mcp.access_token = v;
        }

        cfg
    }
}

/// Read a non-empty environment variable.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Read and parse an environment variable, discarding unparseable values.
fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_var(key).and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.bind, "127.0.0.1");
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.auth.access_token_expire_minutes, 60);
        assert_eq!(cfg.auth.refresh_token_expire_minutes, 60 * 24 * 14);
        assert_eq!(cfg.dex.base_url, "https://pokeapi.co/api/v2");
        assert_eq!(cfg.dex.timeout_seconds, 5);
        assert_eq!(cfg.dex.retries, 2);
        assert_eq!(cfg.dex.retry_delay_ms, 400);
        assert_eq!(cfg.dex.cache_ttl_seconds, 43_200);
        assert!(cfg.model.api_key.is_none());
        assert_eq!(cfg.mcp.api_url, "http://127.0.0.1:8000");
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_deserialize_partial() {
        let json = r#"{"server": {"port": 9000}, "dex": {"retries": 5}}"#;
        let cfg: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.bind, "127.0.0.1"); // default
        assert_eq!(cfg.dex.retries, 5);
        assert_eq!(cfg.dex.timeout_seconds, 5); // default
    }
}
