//! Client for OpenAI-compatible chat completion endpoints (Cerebras, OpenAI, vLLM, ...)

use crate::config::LlmConfig;
use crate::error::{JobMatcherError, Result};
use crate::llm::generator::{parse_structured_reply, GenerationRequest, TextGenerator};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseFormat<'a> {
    JsonSchema { json_schema: JsonSchemaDefinition<'a> },
}

#[derive(Debug, Serialize)]
struct JsonSchemaDefinition<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Live `TextGenerator` backed by `POST {base_url}/chat/completions`.
/// Every call is made exactly once; failures are returned to the caller.
pub struct OpenAiCompatibleClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: Option<u32>,
    structured_output: bool,
}

impl OpenAiCompatibleClient {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder.build().map_err(|e| {
            JobMatcherError::Configuration(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            endpoint: chat_completions_url(&config.base_url),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            structured_output: config.structured_output,
        })
    }

    fn build_body<'a>(&'a self, request: &'a GenerationRequest) -> ChatRequest<'a> {
        let response_format = self.structured_output.then(|| ResponseFormat::JsonSchema {
            json_schema: JsonSchemaDefinition {
                name: request.schema_name,
                strict: false,
                schema: &request.schema,
            },
        });

        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: self.max_tokens,
            response_format,
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatibleClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value> {
        debug!(
            "Calling {} ({}) for {} with a {}-character prompt",
            self.endpoint,
            self.model,
            request.schema_name,
            request.prompt.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    JobMatcherError::UpstreamService(format!("request timed out: {}", e))
                } else {
                    JobMatcherError::UpstreamService(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            JobMatcherError::UpstreamService(format!("failed to read response body: {}", e))
        })?;

        if !status.is_success() {
            return Err(JobMatcherError::UpstreamService(format!(
                "API error (status {}): {}",
                status.as_u16(),
                api_error_message(&body)
            )));
        }

        let content = extract_content(&body)?;
        parse_structured_reply(&content, request.schema_name)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn chat_completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

/// Pull the assistant message text out of a completion response body.
fn extract_content(body: &str) -> Result<String> {
    let completion: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        JobMatcherError::UpstreamService(format!("malformed completion response: {}", e))
    })?;

    if let Some(usage) = &completion.usage {
        debug!(
            "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
            usage.prompt_tokens, usage.completion_tokens
        );
    }

    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| JobMatcherError::UpstreamService("LLM returned empty content".to_string()))
}
