//! AI-generated fun facts for a Pokémon.

use serde::{Deserialize, Serialize};

use crate::dex::Pokedex;
use crate::error::{Result, VaultError};

use super::{extract_json, ChatModel};

const SYSTEM_PROMPT: &str = "You are a Pokédex enhancement AI.

You will receive a Pokémon name and you will return:
1. A short flavor-style summary (not more than 3 sentences)
2. 4-6 fun facts
3. Each fun fact must include:
   - fact (short)
   - relevance (why this is interesting or important)

Return a JSON object following this structure:
{
  \"pokemon\": \"name\",
  \"summary\": \"...\",
  \"fun_facts\": [
      {\"fact\": \"...\", \"relevance\": \"...\"}
  ]
}";

/// One fact with its relevance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunFact {
    pub fact: String,
    #[serde(default)]
    pub relevance: String,
}

/// Full fun-facts response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunFactsResponse {
    pub pokemon: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub fun_facts: Vec<FunFact>,
}

/// Generate fun facts for `name`.
///
/// The name is validated against the Pokédex first, so an unknown species
/// is a NotFound before any model call is made.
pub async fn fun_facts(
    model: &dyn ChatModel,
    dex: &Pokedex,
    name: &str,
) -> Result<FunFactsResponse> {
    let pokemon = dex.get(name).await?;

    let output = model
        .complete(SYSTEM_PROMPT, &format!("Pokemon: {}", pokemon.name))
        .await?;
    serde_json::from_value(extract_json(&output)?)
        .map_err(|e| VaultError::Provider(format!("unexpected fun-facts shape: {e}")))
}
