//! Pokédex core: canonical record types, upstream payload normalization,
//! and the cached fetch service.
//!
//! The canonical [`Pokemon`] shape is what every caller (collection, teams,
//! AI features) consumes. It is produced once per identifier per TTL window
//! and treated as a value type afterwards.

pub mod service;
pub mod upstream;

pub use service::Pokedex;
pub use upstream::{PokeApiClient, Upstream};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, VaultError};

/// Fixed six-field base-stat block. Every field defaults to 0 when the
/// upstream payload omits the corresponding stat entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
}

/// Canonical normalized Pokémon record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    /// Numeric Pokédex identifier.
    pub id: u32,
    /// Lowercase-with-dashes name, verbatim from upstream.
    pub name: String,
    /// Default front-facing sprite URL, when upstream has one.
    pub sprite: Option<String>,
    /// 1–2 type names in battle slot order (primary first).
    pub types: Vec<String>,
    pub stats: Stats,
}

/// Lightweight search result used for autocomplete, never for detail display.
///
/// `id` is `None` when the listing URL carried no extractable numeric ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: Option<u32>,
    pub name: String,
}

/// Convert a raw upstream `/pokemon/{id}` payload into the canonical record.
///
/// Stats start at zero and are overwritten by matching entries; unrecognized
/// stat names are ignored. Types are ordered by the upstream `slot` field
/// ascending — that ordering decides primary vs. secondary type and is
/// preserved exactly.
pub fn normalize(raw: &Value) -> Result<Pokemon> {
    let id = raw["id"]
        .as_u64()
        .ok_or_else(|| VaultError::Upstream("malformed upstream payload: missing id".into()))?
        as u32;
    let name = raw["name"]
        .as_str()
        .ok_or_else(|| VaultError::Upstream("malformed upstream payload: missing name".into()))?
        .to_string();

    let mut stats = Stats::default();
    if let Some(entries) = raw["stats"].as_array() {
        for entry in entries {
            let base = entry["base_stat"].as_u64().unwrap_or(0) as u32;
            match entry["stat"]["name"].as_str().unwrap_or_default() {
                "hp" => stats.hp = base,
                "attack" => stats.attack = base,
                "defense" => stats.defense = base,
                "special-attack" => stats.special_attack = base,
                "special-defense" => stats.special_defense = base,
                "speed" => stats.speed = base,
                _ => {}
            }
        }
    }

    let mut slotted: Vec<(u64, String)> = raw["types"]
        .as_array()
        .map(|types| {
            types
                .iter()
                .filter_map(|t| {
                    let name = t["type"]["name"].as_str()?;
                    Some((t["slot"].as_u64().unwrap_or(0), name.to_string()))
                })
                .collect()
        })
        .unwrap_or_default();
    slotted.sort_by_key(|(slot, _)| *slot);

    let sprite = raw["sprites"]["front_default"].as_str().map(String::from);

    Ok(Pokemon {
        id,
        name,
        sprite,
        types: slotted.into_iter().map(|(_, name)| name).collect(),
        stats,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    //! Stub upstream shared by service and AI tests.

    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use crate::cache::TtlCache;
    use crate::error::{Result, VaultError};

    use super::upstream::Upstream;
    use super::Pokedex;

    /// Upstream stub serving a fixed (id, name) catalog.
    pub(crate) struct CatalogUpstream {
        entries: Vec<(u32, String)>,
    }

    impl CatalogUpstream {
        pub(crate) fn new(entries: &[(u32, &str)]) -> Self {
            Self {
                entries: entries
                    .iter()
                    .map(|(id, name)| (*id, name.to_string()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl Upstream for CatalogUpstream {
        async fn fetch_pokemon(&self, id_or_name: &str) -> Result<Value> {
            let found = self
                .entries
                .iter()
                .find(|(id, name)| name.as_str() == id_or_name || id.to_string() == id_or_name);
            match found {
                Some((id, name)) => Ok(json!({
                    "id": id,
                    "name": name,
                    "sprites": { "front_default": format!("https://sprites.example/{id}.png") },
                    "types": [ { "slot": 1, "type": { "name": "normal" } } ],
                    "stats": [ { "base_stat": 50, "stat": { "name": "hp" } } ]
                })),
                None => Err(VaultError::NotFound(format!("unknown pokemon {id_or_name}"))),
            }
        }

        async fn fetch_index(&self, _limit: u32, _offset: u32) -> Result<Value> {
            let results: Vec<Value> = self
                .entries
                .iter()
                .map(|(id, name)| {
                    json!({
                        "name": name,
                        "url": format!("https://pokeapi.example/api/v2/pokemon/{id}/")
                    })
                })
                .collect();
            Ok(json!({ "results": results }))
        }
    }

    /// A Pokedex over the catalog with a fresh cache and a long TTL.
    pub(crate) fn catalog_dex(entries: &[(u32, &str)]) -> Pokedex {
        Pokedex::new(
            Arc::new(CatalogUpstream::new(entries)),
            Arc::new(TtlCache::new()),
            Duration::from_secs(3600),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_charizard() -> Value {
        json!({
            "id": 6,
            "name": "charizard",
            "sprites": { "front_default": "https://sprites.example/6.png" },
            "types": [
                { "slot": 2, "type": { "name": "flying" } },
                { "slot": 1, "type": { "name": "fire" } }
            ],
            "stats": [
                { "base_stat": 78, "stat": { "name": "hp" } },
                { "base_stat": 84, "stat": { "name": "attack" } },
                { "base_stat": 78, "stat": { "name": "defense" } },
                { "base_stat": 109, "stat": { "name": "special-attack" } },
                { "base_stat": 85, "stat": { "name": "special-defense" } },
                { "base_stat": 100, "stat": { "name": "speed" } }
            ]
        })
    }

    #[test]
    fn test_normalize_full_payload() {
        let p = normalize(&raw_charizard()).unwrap();
        assert_eq!(p.id, 6);
        assert_eq!(p.name, "charizard");
        assert_eq!(p.sprite.as_deref(), Some("https://sprites.example/6.png"));
        assert_eq!(p.stats.special_attack, 109);
        assert_eq!(p.stats.speed, 100);
    }

    #[test]
    fn test_normalize_orders_types_by_slot_not_input_order() {
        // Input lists flying (slot 2) before fire (slot 1); slot order wins.
        let p = normalize(&raw_charizard()).unwrap();
        assert_eq!(p.types, vec!["fire", "flying"]);
    }

    #[test]
    fn test_normalize_missing_stat_defaults_to_zero() {
        let mut raw = raw_charizard();
        let stats = raw["stats"].as_array_mut().unwrap();
        stats.retain(|s| s["stat"]["name"] != "speed");
        let p = normalize(&raw).unwrap();
        assert_eq!(p.stats.speed, 0);
        assert_eq!(p.stats.hp, 78);
    }

    #[test]
    fn test_normalize_ignores_unknown_stat_names() {
        let mut raw = raw_charizard();
        raw["stats"]
            .as_array_mut()
            .unwrap()
            .push(json!({ "base_stat": 999, "stat": { "name": "evasion" } }));
        let p = normalize(&raw).unwrap();
        // No field absorbed the unknown stat.
        assert_eq!(p.stats.hp, 78);
        assert_eq!(p.stats.speed, 100);
    }

    #[test]
    fn test_normalize_missing_sprite_is_none() {
        let mut raw = raw_charizard();
        raw["sprites"] = json!({ "front_default": null });
        let p = normalize(&raw).unwrap();
        assert!(p.sprite.is_none());
    }

    #[test]
    fn test_normalize_missing_id_is_upstream_error() {
        let mut raw = raw_charizard();
        raw.as_object_mut().unwrap().remove("id");
        let err = normalize(&raw).unwrap_err();
        assert!(matches!(err, VaultError::Upstream(_)));
    }

    #[test]
    fn test_record_serde_roundtrip_keeps_field_names() {
        let p = normalize(&raw_charizard()).unwrap();
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["stats"]["special_defense"], 85);
        assert_eq!(v["types"][0], "fire");
    }
}
