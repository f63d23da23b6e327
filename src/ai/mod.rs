//! AI features over an opaque chat-model provider.
//!
//! The [`ChatModel`] trait is the seam between the feature services and the
//! provider API; tests substitute canned-response stubs. Every service keeps
//! its prompt as a file-local const and parses the model output with
//! [`extract_json`], which tolerates markdown code fences.

pub mod auto_team;
pub mod compare;
pub mod fun_facts;
pub mod openai;
pub mod recommend;
pub mod vision;

pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, VaultError};

/// An opaque chat-model capability.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// One-shot completion: system prompt + user text → model text.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Completion with an attached image (JPEG/PNG bytes).
    async fn complete_vision(&self, system: &str, user: &str, image: &[u8]) -> Result<String>;

    /// Provider identifier for logging.
    fn name(&self) -> &str;
}

/// Parse model output as JSON.
///
/// Models asked for strict JSON still occasionally wrap it in a markdown
/// fence; strip ```json fences before giving up.
pub(crate) fn extract_json(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }
    let cleaned = trimmed
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    serde_json::from_str(cleaned)
        .map_err(|e| VaultError::Provider(format!("model returned unparseable JSON: {e}")))
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_json_plain() {
        let value = extract_json(r#"{"summary": "ok"}"#).unwrap();
        assert_eq!(value["summary"], "ok");
    }

    #[test]
    fn test_extract_json_fenced() {
        let text = "```json\n{\"summary\": \"fenced\"}\n```";
        let value = extract_json(text).unwrap();
        assert_eq!(value, json!({"summary": "fenced"}));
    }

    #[test]
    fn test_extract_json_bare_fence() {
        let text = "```\n{\"n\": 1}\n```";
        assert_eq!(extract_json(text).unwrap(), json!({"n": 1}));
    }

    #[test]
    fn test_extract_json_garbage_is_provider_error() {
        let err = extract_json("sorry, I cannot help with that").unwrap_err();
        assert!(matches!(err, VaultError::Provider(_)));
    }
}
