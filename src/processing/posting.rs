//! Posting structurer: raw posting text to a `JobPosting`

use crate::error::{JobMatcherError, Result};
use crate::llm::prompts::{self, JSON_ONLY_SYSTEM, POSTING_TEMPLATE};
use crate::llm::{GenerationRequest, TextGenerator};
use crate::processing::validation::{Fields, Key};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const SCHEMA_NAME: &str = "JobPosting";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    /// May be empty when the posting has no body text
    pub description: String,
}

impl JobPosting {
    pub fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": {"type": "string", "description": "Job title"},
                "company": {"type": "string", "description": "Company name"},
                "location": {"type": "string", "description": "Job location"},
                "description": {"type": "string", "description": "Job description"}
            },
            "required": ["title", "company", "location", "description"]
        })
    }

    pub fn from_reply(value: &Value) -> Result<Self> {
        let fields = Fields::of(SCHEMA_NAME, value)?;

        Ok(Self {
            title: fields.required_string(Key::with_aliases("title", &["job_title"]))?,
            company: fields.required_string(Key::with_aliases("company", &["company_name"]))?,
            location: fields.required_string("location")?,
            description: fields.optional_string("description")?,
        })
    }
}

pub struct PostingStructurer {
    temperature: f32,
}

impl PostingStructurer {
    pub fn new(temperature: f32) -> Self {
        Self { temperature }
    }

    pub fn build_request(&self, posting_text: &str) -> GenerationRequest {
        let schema = JobPosting::json_schema();
        let format_instructions = prompts::format_instructions(&schema);
        let prompt = prompts::render(
            POSTING_TEMPLATE,
            &[
                ("job_text", posting_text.trim()),
                ("format_instructions", format_instructions.as_str()),
            ],
        );

        GenerationRequest {
            schema_name: SCHEMA_NAME,
            system: JSON_ONLY_SYSTEM.to_string(),
            prompt,
            schema,
            temperature: self.temperature,
        }
    }

    pub async fn structure(
        &self,
        generator: &dyn TextGenerator,
        posting_text: &str,
    ) -> Result<JobPosting> {
        if posting_text.trim().is_empty() {
            return Err(JobMatcherError::InvalidInput(
                "job posting text is empty".to_string(),
            ));
        }

        let request = self.build_request(posting_text);
        debug!("Posting prompt is {} characters", request.prompt.len());

        let reply = generator.generate(&request).await?;
        let posting = JobPosting::from_reply(&reply)?;

        info!("Structured posting: {} at {}", posting.title, posting.company);
        Ok(posting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedGenerator;

    const POSTING: &str = "Title: Backend Engineer\nCompany: Acme\nLocation: Remote";

    #[test]
    fn test_from_reply_full() {
        let posting = JobPosting::from_reply(&json!({
            "title": "Backend Engineer",
            "company": "Acme",
            "location": "Remote",
            "description": "Build APIs in Go."
        }))
        .unwrap();

        assert_eq!(posting.title, "Backend Engineer");
        assert_eq!(posting.description, "Build APIs in Go.");
    }

    #[test]
    fn test_from_reply_allows_missing_description() {
        let posting = JobPosting::from_reply(&json!({
            "title": "Backend Engineer",
            "company": "Acme",
            "location": "Remote",
            "description": null
        }))
        .unwrap();
        assert_eq!(posting.description, "");
    }

    #[test]
    fn test_from_reply_requires_company() {
        let err = JobPosting::from_reply(&json!({
            "title": "Backend Engineer",
            "location": "Remote",
            "description": ""
        }))
        .unwrap_err();

        assert!(matches!(
            err,
            JobMatcherError::SchemaValidation { schema: SCHEMA_NAME, .. }
        ));
        assert!(err.to_string().contains("company"));
    }

    #[test]
    fn test_from_reply_rejects_non_string_title() {
        assert!(JobPosting::from_reply(&json!({
            "title": 42,
            "company": "Acme",
            "location": "Remote"
        }))
        .is_err());
    }

    #[test]
    fn test_build_request_embeds_text_and_schema() {
        let request = PostingStructurer::new(0.0).build_request(POSTING);

        assert_eq!(request.schema_name, "JobPosting");
        assert!(request.prompt.contains("Company: Acme"));
        assert!(request.prompt.contains("\"location\""));
        assert_eq!(request.temperature, 0.0);
    }

    #[test]
    fn test_build_request_preserves_braces_in_posting() {
        let request = PostingStructurer::new(0.0).build_request("Salary: {format_instructions}");

        assert!(request.prompt.contains("Salary: {format_instructions}"));
        assert_eq!(request.prompt.matches("conforms to the JSON schema").count(), 1);
    }

    #[tokio::test]
    async fn test_structure_rejects_empty_text_without_calling_service() {
        let generator = ScriptedGenerator::new();
        let err = PostingStructurer::new(0.0)
            .structure(&generator, "  \n ")
            .await
            .unwrap_err();

        assert!(matches!(err, JobMatcherError::InvalidInput(_)));
        assert!(generator.requests().is_empty());
    }

    #[tokio::test]
    async fn test_structure_surfaces_upstream_failure() {
        let generator = ScriptedGenerator::new().with_failure("502 Bad Gateway");
        let err = PostingStructurer::new(0.0)
            .structure(&generator, POSTING)
            .await
            .unwrap_err();

        assert!(matches!(err, JobMatcherError::UpstreamService(_)));
        assert_eq!(generator.requests().len(), 1);
    }
}
