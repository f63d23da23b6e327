//! Collection-based Pokémon recommendations.

use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::dex::Pokedex;
use crate::error::{Result, VaultError};

use super::{extract_json, ChatModel};

const SYSTEM_PROMPT: &str = "You are a Pokémon expert. You will receive a list of Pokémon owned by a user.

Your tasks:
1. Analyze type distribution.
2. Identify weaknesses and missing synergies.
3. Recommend 3-5 Pokémon that would improve the user's team.

For each recommended Pokémon include:
- name (English)
- reason (short explanation)

Return as a structured JSON object:
{
  \"summary\": \"...\",
  \"recommendations\": [
    {\"name\": \"Example\", \"reason\": \"...\"}
  ]
}";

/// How many owned Pokémon are summarized for the model.
const OWNED_SAMPLE: usize = 20;

/// One recommendation, enriched from the Pokédex when the AI-given name
/// resolves. Unresolvable names keep the name and reason with an absent ID.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub id: Option<u32>,
    pub name: String,
    pub sprite: Option<String>,
    pub types: Vec<String>,
    pub reason: String,
}

/// Full recommendations response.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendResponse {
    pub summary: String,
    pub recommendations: Vec<Recommendation>,
}

/// Recommend additions for a user's collection.
///
/// # Errors
///
/// [`VaultError::InvalidInput`] when the collection is empty.
pub async fn recommend(
    model: &dyn ChatModel,
    dex: &Pokedex,
    owned: &[u32],
) -> Result<RecommendResponse> {
    if owned.is_empty() {
        return Err(VaultError::InvalidInput(
            "you must have at least 1 Pokémon in your collection".into(),
        ));
    }

    // Summarize a bounded sample of the collection for the model; records
    // that fail to resolve are simply skipped.
    let mut summaries = Vec::new();
    for id in owned.iter().take(OWNED_SAMPLE) {
        match dex.get(&id.to_string()).await {
            Ok(p) => summaries.push(json!({
                "id": p.id,
                "name": p.name,
                "types": p.types,
                "stats": p.stats,
            })),
            Err(e) => debug!(id, error = %e, "skipping unresolvable collection entry"),
        }
    }

    let content = json!({ "owned": summaries }).to_string();
    let output = model.complete(SYSTEM_PROMPT, &content).await?;
    let parsed = extract_json(&output)?;

    let mut recommendations = Vec::new();
    for rec in parsed["recommendations"].as_array().unwrap_or(&Vec::new()) {
        let Some(name) = rec["name"].as_str() else {
            continue;
        };
        let reason = rec["reason"].as_str().unwrap_or_default().to_string();
        match dex.get(name).await {
            Ok(p) => recommendations.push(Recommendation {
                id: Some(p.id),
                name: p.name,
                sprite: p.sprite,
                types: p.types,
                reason,
            }),
            // The model may suggest forms outside the catalog; keep the
            // name-only entry instead of dropping the suggestion.
            Err(_) => recommendations.push(Recommendation {
                id: None,
                name: name.to_string(),
                sprite: None,
                types: Vec::new(),
                reason,
            }),
        }
    }

    Ok(RecommendResponse {
        summary: parsed["summary"].as_str().unwrap_or_default().to_string(),
        recommendations,
    })
}
