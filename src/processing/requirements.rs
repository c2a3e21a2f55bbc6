//! Requirement extractor: `JobPosting` to categorized `Requirements`

use crate::error::Result;
use crate::llm::prompts::{self, JSON_ONLY_SYSTEM, REQUIREMENTS_TEMPLATE};
use crate::llm::{GenerationRequest, TextGenerator};
use crate::processing::posting::JobPosting;
use crate::processing::validation::{to_skill_set, Fields, Key};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;

pub const SCHEMA_NAME: &str = "Requirements";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    pub technical_skills: BTreeSet<String>,
    pub soft_skills: BTreeSet<String>,
    pub years_experience: u32,
    pub education: String,
    pub nice_to_have: BTreeSet<String>,
}

impl Requirements {
    pub fn json_schema() -> Value {
        let skill_list = |description: &str| {
            json!({"type": "array", "items": {"type": "string"}, "description": description})
        };

        json!({
            "type": "object",
            "properties": {
                "technical_skills": skill_list("Required technical skills"),
                "soft_skills": skill_list("Required soft skills"),
                "years_experience": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Years of experience required"
                },
                "education": {"type": "string", "description": "Education requirements"},
                "nice_to_have": skill_list("Nice-to-have skills or qualifications")
            },
            "required": ["technical_skills", "soft_skills", "years_experience", "education", "nice_to_have"]
        })
    }

    pub fn from_reply(value: &Value) -> Result<Self> {
        let fields = Fields::of(SCHEMA_NAME, value)?;

        let years_key = Key::with_aliases("years_experience", &["experience_years"]);
        let years_experience = match fields.number(years_key)? {
            None => 0,
            Some(years) if years < 0.0 => {
                return Err(fields.error(format!(
                    "field `years_experience` must be non-negative, got {}",
                    years
                )))
            }
            Some(years) => years.trunc().min(u32::MAX as f64) as u32,
        };

        Ok(Self {
            technical_skills: to_skill_set(fields.string_list("technical_skills")?),
            soft_skills: to_skill_set(fields.string_list("soft_skills")?),
            years_experience,
            education: fields.optional_string("education")?,
            nice_to_have: to_skill_set(fields.string_list("nice_to_have")?),
        })
    }
}

pub struct RequirementExtractor {
    temperature: f32,
}

impl RequirementExtractor {
    pub fn new(temperature: f32) -> Self {
        Self { temperature }
    }

    pub fn build_request(&self, posting: &JobPosting) -> GenerationRequest {
        let schema = Requirements::json_schema();
        let format_instructions = prompts::format_instructions(&schema);
        let description = if posting.description.is_empty() {
            "Not provided"
        } else {
            posting.description.as_str()
        };

        let prompt = prompts::render(
            REQUIREMENTS_TEMPLATE,
            &[
                ("title", posting.title.as_str()),
                ("company", posting.company.as_str()),
                ("location", posting.location.as_str()),
                ("description", description),
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

    pub async fn extract(
        &self,
        generator: &dyn TextGenerator,
        posting: &JobPosting,
    ) -> Result<Requirements> {
        let request = self.build_request(posting);
        debug!("Requirements prompt is {} characters", request.prompt.len());

        let reply = generator.generate(&request).await?;
        let requirements = Requirements::from_reply(&reply)?;

        info!(
            "Extracted {} technical and {} soft skills, {} years experience",
            requirements.technical_skills.len(),
            requirements.soft_skills.len(),
            requirements.years_experience
        );
        Ok(requirements)
    }
}
