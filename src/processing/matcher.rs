//! Resume matcher: resume text plus `Requirements` to a scored `MatchResult`

use crate::error::{JobMatcherError, Result};
use crate::llm::prompts::{self, JSON_ONLY_SYSTEM, MATCH_TEMPLATE};
use crate::llm::{GenerationRequest, TextGenerator};
use crate::processing::requirements::Requirements;
use crate::processing::validation::{dedupe_ordered, Fields, Key};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const SCHEMA_NAME: &str = "MatchResult";
pub const MAX_SCORE: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Always within 0..=100
    pub score: u8,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub recommendations: Vec<String>,
    pub strengths: Vec<String>,
}

impl MatchResult {
    pub fn json_schema() -> Value {
        let list = |description: &str| {
            json!({"type": "array", "items": {"type": "string"}, "description": description})
        };

        json!({
            "type": "object",
            "properties": {
                "score": {
                    "type": "integer",
                    "minimum": 0,
                    "maximum": 100,
                    "description": "Overall match score out of 100"
                },
                "matched_skills": list("Skills from resume matching requirements"),
                "missing_skills": list("Required skills not found in resume"),
                "recommendations": list("Specific recommendations for tailoring resume"),
                "strengths": list("Key strengths to emphasize")
            },
            "required": ["score", "matched_skills", "missing_skills", "recommendations", "strengths"]
        })
    }

    /// Validate a reply. An out-of-range score is clamped; an absent one is
    /// derived from the matched and missing skill counts.
    pub fn from_reply(value: &Value) -> Result<Self> {
        let fields = Fields::of(SCHEMA_NAME, value)?;

        let matched_skills = dedupe_ordered(fields.string_list("matched_skills")?);
        let missing_skills = dedupe_ordered(fields.string_list("missing_skills")?);

        let score = match fields.number(Key::with_aliases("score", &["overall_score"]))? {
            Some(raw) => {
                let clamped = clamp_score(raw);
                if raw.round() != clamped as f64 {
                    warn!("Score {} out of range, clamped to {}", raw, clamped);
                }
                clamped
            }
            None => {
                let derived = derive_score(matched_skills.len(), missing_skills.len());
                warn!("Reply carried no score, derived {} from skill coverage", derived);
                derived
            }
        };

        Ok(Self {
            score,
            matched_skills,
            missing_skills,
            recommendations: dedupe_ordered(fields.string_list("recommendations")?),
            strengths: dedupe_ordered(fields.string_list("strengths")?),
        })
    }
}

pub fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, MAX_SCORE as f64) as u8
}

/// Percentage of required skills matched, rounded half up; 0 with nothing to match.
pub fn derive_score(matched: usize, missing: usize) -> u8 {
    let total = matched + missing;
    if total == 0 {
        return 0;
    }
    ((200 * matched + total) / (2 * total)) as u8
}

pub struct ResumeMatcher {
    temperature: f32,
}

impl ResumeMatcher {
    pub fn new(temperature: f32) -> Self {
        Self { temperature }
    }

    pub fn build_request(&self, resume_text: &str, requirements: &Requirements) -> GenerationRequest {
        let schema = MatchResult::json_schema();
        let format_instructions = prompts::format_instructions(&schema);
        let technical_skills = prompts::join_or_none(&requirements.technical_skills);
        let soft_skills = prompts::join_or_none(&requirements.soft_skills);
        let nice_to_have = prompts::join_or_none(&requirements.nice_to_have);
        let years_experience = requirements.years_experience.to_string();
        let education = if requirements.education.is_empty() {
            "None specified"
        } else {
            requirements.education.as_str()
        };

        let prompt = prompts::render(
            MATCH_TEMPLATE,
            &[
                ("resume_text", resume_text.trim()),
                ("technical_skills", technical_skills.as_str()),
                ("soft_skills", soft_skills.as_str()),
                ("years_experience", years_experience.as_str()),
                ("education", education),
                ("nice_to_have", nice_to_have.as_str()),
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

    pub async fn match_resume(
        &self,
        generator: &dyn TextGenerator,
        resume_text: &str,
        requirements: &Requirements,
    ) -> Result<MatchResult> {
        if resume_text.trim().is_empty() {
            return Err(JobMatcherError::InvalidInput("resume text is empty".to_string()));
        }

        let request = self.build_request(resume_text, requirements);
        debug!("Match prompt is {} characters", request.prompt.len());

        let reply = generator.generate(&request).await?;
        let result = MatchResult::from_reply(&reply)?;

        info!(
            "Match score {}/100: {} matched, {} missing",
            result.score,
            result.matched_skills.len(),
            result.missing_skills.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedGenerator;

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(140.0), 100);
        assert_eq!(clamp_score(-12.0), 0);
        assert_eq!(clamp_score(66.6), 67);
        assert_eq!(clamp_score(f64::NAN), 0);
    }

    #[test]
    fn test_derive_score() {
        assert_eq!(derive_score(2, 1), 67);
        assert_eq!(derive_score(1, 1), 50);
        assert_eq!(derive_score(0, 4), 0);
        assert_eq!(derive_score(3, 0), 100);
        assert_eq!(derive_score(0, 0), 0);
    }

    #[test]
    fn test_from_reply_clamps_out_of_range_score() {
        let result = MatchResult::from_reply(&json!({
            "score": 250,
            "matched_skills": ["Python"],
            "missing_skills": [],
            "recommendations": [],
            "strengths": []
        }))
        .unwrap();
        assert_eq!(result.score, 100);

        let result = MatchResult::from_reply(&json!({"overall_score": -5})).unwrap();
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_from_reply_derives_missing_score() {
        let result = MatchResult::from_reply(&json!({
            "matched_skills": ["Python", "Go"],
            "missing_skills": ["Kubernetes"],
            "recommendations": ["Mention container orchestration work"],
            "strengths": []
        }))
        .unwrap();

        assert_eq!(result.score, 67);
        assert_eq!(result.missing_skills, vec!["Kubernetes"]);
    }

    #[test]
    fn test_from_reply_rejects_malformed_score() {
        let err = MatchResult::from_reply(&json!({"score": {"value": 80}})).unwrap_err();
        assert!(matches!(
            err,
            JobMatcherError::SchemaValidation { schema: SCHEMA_NAME, .. }
        ));
    }

    #[test]
    fn test_from_reply_keeps_order_and_drops_duplicates() {
        let result = MatchResult::from_reply(&json!({
            "score": 80,
            "matched_skills": ["Python", "Go", "python"],
            "recommendations": ["Lead with Go", "Quantify impact", "Lead with Go"]
        }))
        .unwrap();

        assert_eq!(result.matched_skills, vec!["Python", "Go"]);
        assert_eq!(result.recommendations, vec!["Lead with Go", "Quantify impact"]);
        assert!(result.strengths.is_empty());
    }

    #[test]
    fn test_build_request_lists_requirements() {
        let requirements = Requirements {
            technical_skills: ["Go", "Python"].iter().map(|s| s.to_string()).collect(),
            years_experience: 4,
            ..Requirements::default()
        };

        let request = ResumeMatcher::new(0.3).build_request("Python, Go, Docker", &requirements);
        assert!(request.prompt.contains("Technical Skills: Go, Python"));
        assert!(request.prompt.contains("Soft Skills: None"));
        assert!(request.prompt.contains("Experience: 4 years"));
        assert!(request.prompt.contains("Education: None specified"));
        assert_eq!(request.temperature, 0.3);
    }

    #[tokio::test]
    async fn test_match_rejects_empty_resume() {
        let generator = ScriptedGenerator::new();
        let err = ResumeMatcher::new(0.3)
            .match_resume(&generator, "", &Requirements::default())
            .await
            .unwrap_err();

        assert!(matches!(err, JobMatcherError::InvalidInput(_)));
        assert!(generator.requests().is_empty());
    }
}
