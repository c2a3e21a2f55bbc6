//! Prompt templates for the three pipeline stages

use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

pub const POSTING_TEMPLATE: &str = r#"You are a job posting parser. Extract structured information from the job posting.

Job Posting:
{job_text}

{format_instructions}

Extract the title, company, location, and description accurately. Use an empty string for the description if the posting has none."#;

pub const REQUIREMENTS_TEMPLATE: &str = r#"You are an expert job requirements analyzer. Extract and categorize all requirements from the job description.

Job Title: {title}
Company: {company}
Location: {location}
Description: {description}

{format_instructions}

Be thorough in extracting:
- Technical skills (programming languages, frameworks, tools)
- Soft skills (communication, leadership, etc.)
- Years of experience (estimate if not explicitly stated, 0 if unknown)
- Education requirements (empty string if none)
- Nice-to-have qualifications"#;

pub const MATCH_TEMPLATE: &str = r#"You are an expert resume consultant. Analyze how well the resume matches the job requirements and provide actionable recommendations.

RESUME:
{resume_text}

JOB REQUIREMENTS:
Technical Skills: {technical_skills}
Soft Skills: {soft_skills}
Experience: {years_experience} years
Education: {education}
Nice-to-have: {nice_to_have}

{format_instructions}

Provide:
1. An honest overall match score (0-100)
2. Which required skills are present in the resume
3. Which required skills are missing
4. Specific, actionable recommendations for tailoring this resume
5. Key strengths from the resume relevant to this role

Be specific and helpful."#;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{(\w+)\}").unwrap());

/// Substitute `{name}` placeholders in a template. Only the template is
/// scanned; inserted values are never rewritten. Unknown names are kept.
pub fn render(template: &str, params: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            params
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Instruction block describing the expected reply shape.
pub fn format_instructions(schema: &Value) -> String {
    let schema_text =
        serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());
    format!(
        "The output should be formatted as a JSON object that conforms to the JSON schema below.\n\n```\n{}\n```",
        schema_text
    )
}

/// Comma-separated list, or "None" when empty.
pub fn join_or_none<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    let joined = items
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        "None".to_string()
    } else {
        joined
    }
}
