//! OpenAI-compatible chat completions provider.
//!
//! Serves both OpenAI and Mistral: the two APIs share the
//! `/v1/chat/completions` shape, Bearer auth, and the `json_schema`
//! response format.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use examforge_core::schema::ResponseSchema;
use examforge_core::traits::{
    GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage, DEFAULT_SYSTEM_PROMPT,
};

use crate::http::{build_client, check_status, parse_error, send_error};

const OPENAI_BASE_URL: &str = "https://api.openai.com";
const MISTRAL_BASE_URL: &str = "https://api.mistral.ai";

/// Which service sits behind the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    OpenAi,
    Mistral,
}

/// OpenAI-compatible API provider.
pub struct OpenAiProvider {
    flavor: Flavor,
    api_key: String,
    base_url: String,
    org_id: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(
        api_key: &str,
        base_url: Option<String>,
        org_id: Option<String>,
        timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            flavor: Flavor::OpenAi,
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            org_id,
            timeout_secs,
            client: build_client(timeout_secs)?,
        })
    }

    /// A provider talking to Mistral's La Plateforme API.
    pub fn mistral(
        api_key: &str,
        base_url: Option<String>,
        timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            flavor: Flavor::Mistral,
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| MISTRAL_BASE_URL.to_string()),
            org_id: None,
            timeout_secs,
            client: build_client(timeout_secs)?,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseFormat {
    JsonSchema { json_schema: JsonSchemaFormat },
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: String,
    schema: serde_json::Value,
    strict: bool,
}

impl From<&ResponseSchema> for ResponseFormat {
    fn from(schema: &ResponseSchema) -> Self {
        ResponseFormat::JsonSchema {
            json_schema: JsonSchemaFormat {
                name: schema.name.clone(),
                schema: schema.schema.clone(),
                // schemars output does not pin additionalProperties, which
                // strict mode requires.
                strict: false,
            },
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: ChatUsage,
    model: String,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

#[derive(Deserialize)]
struct ChatError {
    error: ChatErrorBody,
}

#[derive(Deserialize)]
struct ChatErrorBody {
    message: String,
}

fn error_message(body: String) -> String {
    serde_json::from_str::<ChatError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        match self.flavor {
            Flavor::OpenAi => "openai",
            Flavor::Mistral => "mistral",
        }
    }

    #[instrument(skip(self, request), fields(provider = self.name(), model = %request.model))]
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let start = Instant::now();

        let system_prompt = request
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        let body = ChatRequest {
            model: request.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.prompt.clone(),
                },
            ],
            response_format: request.response_schema.as_ref().map(ResponseFormat::from),
        };

        let mut req = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json");

        if let Some(org) = &self.org_id {
            req = req.header("OpenAI-Organization", org);
        }

        let response = req
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout_secs))?;
        let response = check_status(response, error_message).await?;

        let api_response: ChatResponse = response.json().await.map_err(parse_error)?;

        let latency_ms = start.elapsed().as_millis() as u64;
        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(GenerateResponse {
            content,
            model: api_response.model,
            token_usage: TokenUsage {
                prompt_tokens: api_response.usage.prompt_tokens,
                completion_tokens: api_response.usage.completion_tokens,
                total_tokens: api_response.usage.total_tokens,
            },
            latency_ms,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        let provider = self.name();
        let model = |id: &str, name: &str, max_context: u32| ModelInfo {
            id: id.into(),
            name: name.into(),
            provider: provider.into(),
            max_context,
            native_structured_output: true,
        };
        match self.flavor {
            Flavor::OpenAi => vec![
                model("gpt-4.1", "GPT-4.1", 1_000_000),
                model("gpt-4.1-mini", "GPT-4.1 Mini", 1_000_000),
                model("gpt-4o", "GPT-4o", 128_000),
            ],
            Flavor::Mistral => vec![
                model("mistral-large-latest", "Mistral Large", 128_000),
                model("mistral-medium-latest", "Mistral Medium", 128_000),
                model("mistral-small-latest", "Mistral Small", 128_000),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(model: &str, schema: Option<ResponseSchema>) -> GenerateRequest {
        GenerateRequest {
            model: model.into(),
            prompt: "Create 1 unique exam questions".into(),
            system_prompt: None,
            response_schema: schema,
            max_tokens: 1024,
            temperature: 0.0,
        }
    }

    fn questions_schema() -> ResponseSchema {
        ResponseSchema {
            name: "Questions".into(),
            schema: serde_json::json!({"type": "object", "required": ["questions"]}),
        }
    }

    #[tokio::test]
    async fn successful_generation() {
        let server = MockServer::start().await;

        let content = r#"{"questions":[{"question_text":"What is a vector?","marks":5}]}"#;
        let response_body = serde_json::json!({
            "choices": [{"message": {"content": content, "role": "assistant"}, "index": 0}],
            "model": "gpt-4.1",
            "usage": {"prompt_tokens": 40, "completion_tokens": 15, "total_tokens": 55}
        });

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new("test-key", Some(server.uri()), None, 30).unwrap();
        let response = provider.generate(&request("gpt-4.1", None)).await.unwrap();
        assert_eq!(response.content, content);
        assert_eq!(response.token_usage.total_tokens, 55);
    }

    #[tokio::test]
    async fn schema_is_sent_as_json_schema_response_format() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "choices": [{"message": {"content": "{}", "role": "assistant"}, "index": 0}],
            "model": "mistral-large-latest"
        });

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "mistral-large-latest",
                "response_format": {
                    "type": "json_schema",
                    "json_schema": {"name": "Questions", "strict": false}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAiProvider::mistral("key", Some(server.uri()), 30).unwrap();
        assert_eq!(provider.name(), "mistral");
        provider
            .generate(&request("mistral-large-latest", Some(questions_schema())))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_content_is_empty_string() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "choices": [{"message": {"content": null, "role": "assistant"}, "index": 0}],
            "model": "gpt-4.1"
        });

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new("key", Some(server.uri()), None, 30).unwrap();
        let response = provider.generate(&request("gpt-4.1", None)).await.unwrap();
        assert_eq!(response.content, "");
        assert_eq!(response.token_usage.total_tokens, 0);
    }

    #[tokio::test]
    async fn error_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({"error": {"message": "upstream overloaded"}})),
            )
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new("key", Some(server.uri()), None, 30).unwrap();
        let err = provider.generate(&request("gpt-4.1", None)).await.unwrap_err();
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("upstream overloaded"));
    }

    #[tokio::test]
    async fn rate_limiting() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::mistral("key", Some(server.uri()), 30).unwrap();
        let err = provider
            .generate(&request("mistral-large-latest", None))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<examforge_core::ProviderError>(),
            Some(examforge_core::ProviderError::RateLimited {
                retry_after_ms: 7000
            })
        ));
    }

    #[tokio::test]
    async fn client_timeout_follows_configuration() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(3)))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::mistral("key", Some(server.uri()), 1).unwrap();
        let err = provider
            .generate(&request("mistral-large-latest", None))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<examforge_core::ProviderError>(),
            Some(examforge_core::ProviderError::Timeout(1))
        ));
    }

    #[test]
    fn model_lists_follow_flavor() {
        let openai = OpenAiProvider::new("k", None, None, 30).unwrap();
        let mistral = OpenAiProvider::mistral("k", None, 30).unwrap();
        assert!(openai.available_models().iter().any(|m| m.id == "gpt-4.1"));
        assert!(mistral
            .available_models()
            .iter()
            .all(|m| m.provider == "mistral"));
        assert_eq!(mistral.available_models()[0].id, "mistral-large-latest");
    }
}
