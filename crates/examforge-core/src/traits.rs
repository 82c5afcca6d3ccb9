//! The LLM provider trait.
//!
//! Implemented by the `examforge-providers` crate for each backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::schema::ResponseSchema;

/// Trait for LLM backends that answer a prompt with structured output.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "mistral").
    fn name(&self) -> &str;

    /// Send one prompt and return the raw reply.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;

    /// List known models for this provider.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// Request sent to an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "mistral-large-latest").
    pub model: String,
    /// The main prompt.
    pub prompt: String,
    /// Optional system prompt override.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Output contract the reply must satisfy, if any.
    #[serde(default)]
    pub response_schema: Option<ResponseSchema>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Response from an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The raw response content.
    pub content: String,
    /// Model that actually generated the response.
    pub model: String,
    /// Token usage.
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Provider name.
    pub provider: String,
    /// Maximum context window size in tokens.
    pub max_context: u32,
    /// Whether the backend enforces a JSON schema natively, rather than
    /// being asked to follow one in the prompt.
    pub native_structured_output: bool,
}

/// System prompt used when the engine does not override it.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an assistant for exam authoring and grading. Respond ONLY with a single JSON object that matches the requested schema. Do not wrap it in prose.";

/// Render a schema as an instruction appended to the system prompt, for
/// backends that cannot enforce one natively.
pub fn schema_instruction(schema: &ResponseSchema) -> String {
    format!(
        "Your reply must be a JSON object named `{}` conforming to this JSON schema:\n{}",
        schema.name,
        serde_json::to_string_pretty(&schema.schema).unwrap_or_default()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_instruction_embeds_name_and_schema() {
        let schema = ResponseSchema {
            name: "Questions".into(),
            schema: serde_json::json!({"type": "object", "required": ["questions"]}),
        };
        let text = schema_instruction(&schema);
        assert!(text.contains("`Questions`"));
        assert!(text.contains("\"required\""));
    }
}
