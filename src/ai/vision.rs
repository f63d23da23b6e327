//! Vision identification: image bytes → AI guess → Pokédex match.

use serde::{Deserialize, Serialize};

use crate::dex::{Pokedex, Pokemon};
use crate::error::{Result, VaultError};

use super::{extract_json, ChatModel};

const SYSTEM_PROMPT: &str = "You are a Pokémon identifier. Return the name of the Pokémon \
in English, a confidence score, and a short rationale. \
If unsure, return up to 3 candidates ordered by confidence. \
Respond with strict JSON only, following this structure: \
{\"primary_name\": \"...\", \"candidates\": [{\"name\": \"...\", \"confidence\": 0.0}], \
\"rationale\": \"...\"}";

/// One alternative guess.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub confidence: f64,
}

/// The model's structured identification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionIdentify {
    pub primary_name: String,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub rationale: String,
}

/// Full identify response: the AI block plus the resolved Pokédex match, if
/// any guess mapped to a real entry.
#[derive(Debug, Clone, Serialize)]
pub struct IdentifyResponse {
    pub ai: VisionIdentify,
    #[serde(rename = "match")]
    pub matched: Option<Pokemon>,
}

/// Identify a Pokémon in `image` and resolve the guess against the Pokédex.
///
/// The primary name is tried first, then each candidate in confidence
/// order. A guess that resolves to nothing is an explicit miss (`matched:
/// None`), not an error.
pub async fn identify(
    model: &dyn ChatModel,
    dex: &Pokedex,
    image: &[u8],
) -> Result<IdentifyResponse> {
    let output = model
        .complete_vision(SYSTEM_PROMPT, "Identify the Pokémon.", image)
        .await?;
    let ai: VisionIdentify = serde_json::from_value(extract_json(&output)?)
        .map_err(|e| VaultError::Provider(format!("unexpected identify shape: {e}")))?;

    let mut matched = resolve_name(dex, &ai.primary_name).await;
    if matched.is_none() {
        for candidate in &ai.candidates {
            matched = resolve_name(dex, &candidate.name).await;
            if matched.is_some() {
                break;
            }
        }
    }

    Ok(IdentifyResponse { ai, matched })
}

/// Map an AI-guessed display name ("Pikachu") to a catalog record via
/// search-then-get.
async fn resolve_name(dex: &Pokedex, name: &str) -> Option<Pokemon> {
    let hits = dex.search(name, 1).await;
    let hit = hits.first()?;
    dex.get(&hit.name).await.ok()
}
