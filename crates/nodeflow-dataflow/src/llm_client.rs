use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use nodeflow_core::error::BoxError;
use nodeflow_core::types::ValueMap;

/// Text completion backend used by the `llm_response` node.
pub trait LlmClient: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn complete(&self, prompt: &str) -> Result<String, BoxError>;
}

/// Deterministic client answering from a canned response catalog.
///
/// Deserializes from `{"price_per_1k_tokens": 0.4, "response_catalog": {...}}`,
/// so a mock can be passed to an execution as a plain input value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MockLlmClient {
    #[serde(default)]
    pub price_per_1k_tokens: f64,
    /// Prompt fragment -> response, checked in insertion order.
    #[serde(default)]
    pub response_catalog: ValueMap,
}

impl MockLlmClient {
    pub fn new(price_per_1k_tokens: f64) -> Self {
        Self {
            price_per_1k_tokens,
            response_catalog: ValueMap::new(),
        }
    }

    pub fn with_response(mut self, fragment: impl Into<String>, response: impl Into<String>) -> Self {
        self.response_catalog
            .insert(fragment.into(), Value::String(response.into()));
        self
    }

    /// Price of `tokens` at this client's rate.
    pub fn quote(&self, tokens: u64) -> f64 {
        tokens as f64 / 1000.0 * self.price_per_1k_tokens
    }

    fn fallback(prompt: &str) -> String {
        format!(
            "No canned response matched a {}-word prompt; start with a guarded prototype.",
            prompt.split_whitespace().count()
        )
    }
}

impl LlmClient for MockLlmClient {
    fn name(&self) -> &str {
        "mock"
    }

    fn complete(&self, prompt: &str) -> Result<String, BoxError> {
        let hit = self
            .response_catalog
            .iter()
            .find(|(fragment, _)| prompt.contains(fragment.as_str()));

        let response = match hit {
            Some((fragment, Value::String(text))) => {
                debug!(fragment = %fragment, "Mock LLM catalog hit");
                text.clone()
            }
            Some((fragment, other)) => {
                debug!(fragment = %fragment, "Mock LLM catalog hit");
                other.to_string()
            }
            None => Self::fallback(prompt),
        };
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_matching_fragment_wins() {
        let client = MockLlmClient::new(0.4)
            .with_response("LLM", "first")
            .with_response("Prompt", "second");
        assert_eq!(client.complete("Data → Prompt → LLM").unwrap(), "first");
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let client = MockLlmClient::new(0.5);
        let a = client.complete("three word prompt").unwrap();
        let b = client.complete("three word prompt").unwrap();
        assert_eq!(a, b);
        assert!(a.contains("3-word prompt"));
    }

    #[test]
    fn test_deserialize_from_value() {
        let client: MockLlmClient = serde_json::from_value(json!({
            "price_per_1k_tokens": 0.4,
            "response_catalog": {"guard": "Use guardrails."}
        }))
        .unwrap();

        assert_eq!(client.complete("on guard").unwrap(), "Use guardrails.");
        assert!((client.quote(1000) - 0.4).abs() < 1e-12);
        assert_eq!(client.name(), "mock");
    }
}
