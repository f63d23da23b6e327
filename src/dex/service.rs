//! Cached fetch-and-normalize service.
//!
//! [`Pokedex`] resolves identifiers and search queries into canonical
//! records, write-through memoized in the shared [`TtlCache`]. Constructed
//! once at process start and injected into the API state — there is no
//! module-level singleton.

use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

use rand::Rng;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::TtlCache;
use crate::error::Result;

use super::upstream::Upstream;
use super::{normalize, Pokemon, SearchHit, Stats};

/// Single listing page scanned by `search` (no pagination beyond this).
const SEARCH_PAGE_LIMIT: u32 = 2000;

/// Upper bound of the random ID range.
const RANDOM_MAX_ID: u32 = 1025;

/// Random picks before falling back to the fixed species.
const RANDOM_ATTEMPTS: u32 = 5;

/// Known-good species used when random picks keep failing.
const FALLBACK_NAME: &str = "pikachu";

/// Matches the numeric ID in a listing entry URL, e.g.
/// `https://pokeapi.co/api/v2/pokemon/143/`.
fn id_pattern() -> &'static Regex {
    static ID_RE: OnceLock<Regex> = OnceLock::new();
    ID_RE.get_or_init(|| Regex::new(r"/pokemon/(\d+)/?$").expect("valid regex"))
}

/// Cached Pokédex over an upstream source.
pub struct Pokedex {
    upstream: Arc<dyn Upstream>,
    cache: Arc<TtlCache>,
    ttl: Duration,
}

impl Pokedex {
    /// Build a service over `upstream`, memoizing into `cache` with a fixed
    /// per-entry `ttl`.
    pub fn new(upstream: Arc<dyn Upstream>, cache: Arc<TtlCache>, ttl: Duration) -> Self {
        Self {
            upstream,
            cache,
            ttl,
        }
    }

    /// Resolve a numeric ID or case-insensitive name into a canonical record.
    ///
    /// Cache hit returns immediately; a miss fetches, normalizes, caches and
    /// returns. Failures (`NotFound`, `Upstream`) are never cached. Two
    /// concurrent misses for the same cold key may both fetch — the last
    /// write wins, which is harmless since both normalize to the same value.
    pub async fn get(&self, id_or_name: &str) -> Result<Pokemon> {
        let ident = id_or_name.trim().to_lowercase();
        let key = format!("pokemon:{ident}");
        if let Some(cached) = self.cache.get(&key) {
            return Ok(serde_json::from_value(cached)?);
        }

        let raw = self.upstream.fetch_pokemon(&ident).await?;
        let record = normalize(&raw)?;
        self.cache.set(&key, serde_json::to_value(&record)?, self.ttl);
        Ok(record)
    }

    /// Case-insensitive substring search over the upstream name listing,
    /// capped at `limit` hits.
    ///
    /// An empty or whitespace-only query returns an empty list without
    /// touching cache or network. Upstream failure degrades to an empty
    /// list (logged) rather than an error, and nothing is cached for it.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return Vec::new();
        }

        let key = format!("search:{q}:{limit}");
        if let Some(cached) = self.cache.get(&key) {
            if let Ok(hits) = serde_json::from_value(cached) {
                return hits;
            }
        }

        let raw = match self.upstream.fetch_index(SEARCH_PAGE_LIMIT, 0).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(query = %q, error = %e, "search listing fetch failed");
                return Vec::new();
            }
        };

        let hits = filter_hits(&raw, &q, limit);
        if let Ok(value) = serde_json::to_value(&hits) {
            self.cache.set(&key, value, self.ttl);
        }
        hits
    }

    /// Return a random Pokémon. Never fails visibly: failed picks are
    /// retried with fresh IDs, then the fixed fallback species is fetched,
    /// and if even that fails a baked-in record is returned.
    pub async fn random(&self) -> Pokemon {
        for _ in 0..RANDOM_ATTEMPTS {
            let id = rand::thread_rng().gen_range(1..=RANDOM_MAX_ID);
            match self.get(&id.to_string()).await {
                Ok(record) => return record,
                Err(e) => debug!(id, error = %e, "random pick failed"),
            }
        }
        match self.get(FALLBACK_NAME).await {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "fallback fetch failed, serving baked-in record");
                fallback_record()
            }
        }
    }
}

/// Filter the raw listing page down to at most `limit` hits whose *name*
/// contains `query` (already lowercased). IDs are pulled from each entry's
/// URL; a URL the pattern does not match yields `id: None` rather than an
/// error.
fn filter_hits(raw: &Value, query: &str, limit: usize) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    let Some(results) = raw["results"].as_array() else {
        return hits;
    };
    for entry in results {
        let Some(name) = entry["name"].as_str() else {
            continue;
        };
        if !name.contains(query) {
            continue;
        }
        let id = entry["url"]
            .as_str()
            .and_then(|url| id_pattern().captures(url))
            .and_then(|caps| caps[1].parse().ok());
        hits.push(SearchHit {
            id,
            name: name.to_string(),
        });
        if hits.len() >= limit {
            break;
        }
    }
    hits
}

/// Record served when every upstream avenue has failed.
fn fallback_record() -> Pokemon {
    Pokemon {
        id: 25,
        name: FALLBACK_NAME.to_string(),
        sprite: None,
        types: vec!["electric".to_string()],
        stats: Stats {
            hp: 35,
            attack: 55,
            defense: 40,
            special_attack: 50,
            special_defense: 50,
            speed: 90,
        },
    }
}
