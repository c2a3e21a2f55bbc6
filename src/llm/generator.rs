//! The capability every pipeline stage uses to talk to a language model

use crate::error::{JobMatcherError, Result};
use async_trait::async_trait;
use serde_json::Value;

/// One structured-generation call: prompt in, JSON value out.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Schema identifier, also used in validation errors
    pub schema_name: &'static str,
    pub system: String,
    pub prompt: String,
    /// JSON schema the reply is expected to satisfy
    pub schema: Value,
    pub temperature: f32,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the reply parsed as JSON. Shape validation is left to the caller.
    async fn generate(&self, request: &GenerationRequest) -> Result<Value>;

    fn model_name(&self) -> &str;
}

/// Parse a model reply into JSON, tolerating code fences and surrounding prose.
pub fn parse_structured_reply(text: &str, schema_name: &'static str) -> Result<Value> {
    let text = strip_json_fences(text);

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Ok(value);
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&text[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(JobMatcherError::schema(
        schema_name,
        format!("reply is not valid JSON: {}", preview(text, 120)),
    ))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));

    match inner {
        Some(stripped) => {
            let stripped = stripped.trim_start();
            stripped
                .strip_suffix("```")
                .map(str::trim)
                .unwrap_or(stripped)
        }
        None => text,
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    }
}
