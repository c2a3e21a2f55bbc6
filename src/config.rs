//! Configuration management for the job matcher

use crate::error::{JobMatcherError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible chat completions API
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub parser_temperature: f32,
    pub analyzer_temperature: f32,
    pub matcher_temperature: f32,
    pub max_tokens: Option<u32>,
    /// Ask the service to enforce the JSON schema via `response_format`
    pub structured_output: bool,
    /// No timeout when unset
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub job_posting: PathBuf,
    pub resume: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub results_dir: PathBuf,
    pub file_stem: String,
    pub color_output: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.cerebras.ai/v1".to_string(),
            model: "gpt-oss-120b".to_string(),
            api_key_env: "CEREBRAS_API_KEY".to_string(),
            parser_temperature: 0.0,
            analyzer_temperature: 0.0,
            matcher_temperature: 0.3,
            max_tokens: None,
            structured_output: true,
            request_timeout_secs: None,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            job_posting: PathBuf::from("docs/jobposting.txt"),
            resume: PathBuf::from("docs/resume.pdf"),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("output"),
            file_stem: "match_results".to_string(),
            color_output: true,
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults there on first use.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content).map_err(|e| {
                JobMatcherError::Configuration(format!("Failed to parse config: {}", e))
            })?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            JobMatcherError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("job-matcher")
            .join("config.toml")
    }

    /// Read the service credential from the environment, loading `.env` first.
    pub fn api_key(&self) -> Result<String> {
        dotenvy::dotenv().ok();

        match std::env::var(&self.llm.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(JobMatcherError::Configuration(format!(
                "Required environment variable '{}' is not set",
                self.llm.api_key_env
            ))),
        }
    }

    pub fn json_output_path(&self) -> PathBuf {
        self.output_path("json")
    }

    pub fn markdown_output_path(&self) -> PathBuf {
        self.output_path("md")
    }

    pub fn trace_log_path(&self) -> PathBuf {
        self.output_path("trace.log")
    }

    fn output_path(&self, extension: &str) -> PathBuf {
        self.output
            .results_dir
            .join(format!("{}.{}", self.output.file_stem, extension))
    }
}
