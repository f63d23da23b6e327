//! AI battle comparison of two Pokémon.

use serde::{Deserialize, Serialize};

use crate::dex::{Pokedex, Pokemon};
use crate::error::{Result, VaultError};

use super::ChatModel;

const SYSTEM_PROMPT: &str = "You are a Pokémon analyst. You compare two Pokémon and explain:
- strengths
- weaknesses
- stat differences
- type matchups
- strategic advantage
- which one would likely win a fair battle

Return the winner's NAME only (not ID), or \"tie\" if no clear winner.
The main response should be a detailed summary, ending with a line of the
form \"WINNER: <name>\".";

/// Request body for a comparison.
#[derive(Debug, Clone, Deserialize)]
pub struct CompareRequest {
    pub pokemon_a: String,
    pub pokemon_b: String,
}

/// Comparison result with both resolved records embedded.
#[derive(Debug, Clone, Serialize)]
pub struct CompareResponse {
    pub summary: String,
    pub winner: String,
    pub a: Pokemon,
    pub b: Pokemon,
}

/// Compare two Pokémon and predict a winner.
///
/// Either identifier failing to resolve is a single NotFound toward the
/// caller. A model response without a recognizable winner line falls back
/// to Pokémon A.
pub async fn compare(
    model: &dyn ChatModel,
    dex: &Pokedex,
    request: &CompareRequest,
) -> Result<CompareResponse> {
    let (a, b) = tokio::try_join!(dex.get(&request.pokemon_a), dex.get(&request.pokemon_b))
        .map_err(|_| VaultError::NotFound("one of the Pokémon could not be found".into()))?;

    let content = format!(
        "Compare Pokémon A and B.\n\n\
         ### Pokémon A\nName: {}\nTypes: {:?}\nStats: {}\n\n\
         ### Pokémon B\nName: {}\nTypes: {:?}\nStats: {}\n\n\
         Provide:\n- A detailed comparison summary\n\
         - The predicted winner by NAME only (or \"tie\")",
        a.name,
        a.types,
        serde_json::to_string(&a.stats)?,
        b.name,
        b.types,
        serde_json::to_string(&b.stats)?,
    );

    let output = model.complete(SYSTEM_PROMPT, &content).await?;
    let winner = parse_winner(&output).unwrap_or_else(|| a.name.clone());

    Ok(CompareResponse {
        summary: output,
        winner,
        a,
        b,
    })
}

/// Pull the winner out of a "WINNER: <name>" line, case-insensitive.
fn parse_winner(output: &str) -> Option<String> {
    output
        .lines()
        .find(|line| line.trim().to_lowercase().starts_with("winner"))
        .and_then(|line| line.rsplit(':').next())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::CannedModel;
    use crate::dex::testing::catalog_dex;

    fn request() -> CompareRequest {
        CompareRequest {
            pokemon_a: "pikachu".into(),
            pokemon_b: "charizard".into(),
        }
    }

    #[tokio::test]
    async fn test_compare_embeds_both_records_and_winner() {
        let model = CannedModel::new("Charizard hits harder.\nWINNER: charizard");
        let dex = catalog_dex(&[(25, "pikachu"), (6, "charizard")]);

        let response = compare(&model, &dex, &request()).await.unwrap();
        assert_eq!(response.winner, "charizard");
        assert_eq!(response.a.id, 25);
        assert_eq!(response.b.id, 6);
        assert!(response.summary.contains("Charizard hits harder"));
    }

    #[tokio::test]
    async fn test_compare_missing_pokemon_is_not_found() {
        let model = CannedModel::new("irrelevant");
        let dex = catalog_dex(&[(25, "pikachu")]);

        let err = compare(&model, &dex, &request()).await.unwrap_err();
        assert!(matches!(err, VaultError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_compare_without_winner_line_falls_back_to_a() {
        let model = CannedModel::new("They are evenly matched in every respect.");
        let dex = catalog_dex(&[(25, "pikachu"), (6, "charizard")]);

        let response = compare(&model, &dex, &request()).await.unwrap();
        assert_eq!(response.winner, "pikachu");
    }

    #[test]
    fn test_parse_winner_variants() {
        assert_eq!(parse_winner("blah\nWINNER: tie").as_deref(), Some("tie"));
        assert_eq!(parse_winner("Winner : Gengar").as_deref(), Some("Gengar"));
        assert_eq!(parse_winner("no verdict"), None);
        assert_eq!(parse_winner("WINNER:"), None);
    }
}
