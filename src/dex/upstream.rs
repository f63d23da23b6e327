//! Upstream PokeAPI client.
//!
//! The [`Upstream`] trait is the seam between the Pokédex service and the
//! network; tests substitute counting or failing stubs. [`PokeApiClient`] is
//! the production implementation: reqwest with a bounded per-request timeout
//! and a fixed small number of attempts separated by a fixed delay (no
//! exponential backoff, no jitter).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::warn;

use crate::config::DexConfig;
use crate::error::{Result, VaultError};

/// Read-only capability over the upstream Pokémon data API.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// `GET {base}/pokemon/{id_or_name}` — raw detail payload.
    async fn fetch_pokemon(&self, id_or_name: &str) -> Result<Value>;

    /// `GET {base}/pokemon?limit=&offset=` — raw name/URL listing page.
    async fn fetch_index(&self, limit: u32, offset: u32) -> Result<Value>;
}

/// Production PokeAPI client.
pub struct PokeApiClient {
    base_url: String,
    client: Client,
    attempts: u32,
    retry_delay: Duration,
}

impl PokeApiClient {
    /// Build a client from the dex configuration.
    pub fn new(config: &DexConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("failed to build HTTP client");
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            attempts: config.retries.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// One GET attempt. 404 maps to [`VaultError::NotFound`]; any other
    /// failure (network, timeout, non-2xx, bad JSON) to [`VaultError::Upstream`].
    async fn try_get(&self, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| VaultError::Upstream(format!("request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(VaultError::NotFound(format!("upstream 404 for {url}")));
        }
        if !status.is_success() {
            return Err(VaultError::Upstream(format!("upstream HTTP {status} for {url}")));
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| VaultError::Upstream(format!("invalid upstream JSON: {e}")))
    }

    /// GET with the configured attempt budget and fixed inter-attempt delay.
    ///
    /// Every failure is retried, a definitive 404 included (the attempt
    /// budget is small and the upstream occasionally 404s transiently during
    /// deploys). The error of the final attempt is what the caller sees.
    async fn get_with_retry(&self, url: &str) -> Result<Value> {
        let mut last_err = VaultError::Upstream("no attempts made".into());
        for attempt in 1..=self.attempts {
            if attempt > 1 {
                tokio::time::sleep(self.retry_delay).await;
            }
            match self.try_get(url).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(url, attempt, attempts = self.attempts, error = %e, "upstream fetch failed");
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }
}

#[async_trait]
impl Upstream for PokeApiClient {
    async fn fetch_pokemon(&self, id_or_name: &str) -> Result<Value> {
        let url = format!("{}/pokemon/{}", self.base_url, id_or_name);
        self.get_with_retry(&url).await
    }

    async fn fetch_index(&self, limit: u32, offset: u32) -> Result<Value> {
        let url = format!("{}/pokemon?limit={limit}&offset={offset}", self.base_url);
        self.get_with_retry(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with(base_url: &str, retries: u32) -> PokeApiClient {
        PokeApiClient::new(&DexConfig {
            base_url: base_url.to_string(),
            timeout_seconds: 1,
            retries,
            retry_delay_ms: 1,
            cache_ttl_seconds: 60,
        })
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = client_with("https://pokeapi.example/api/v2/", 2);
        assert_eq!(client.base_url, "https://pokeapi.example/api/v2");
    }

    #[test]
    fn test_attempts_clamped_to_at_least_one() {
        let client = client_with("https://pokeapi.example", 0);
        assert_eq!(client.attempts, 1);
    }

    #[tokio::test]
    async fn test_unreachable_host_surfaces_upstream_error() {
        // Closed local port — connection refused, no long timeout.
        let client = client_with("http://127.0.0.1:9", 1);
        let err = client.fetch_pokemon("pikachu").await.unwrap_err();
        assert!(matches!(err, VaultError::Upstream(_)), "got: {err:?}");
    }
}
