//! The combined result document produced by a successful run

use crate::config::Config;
use crate::pipeline::TraceEntry;
use crate::processing::{JobPosting, MatchResult, Requirements};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub job_posting: JobPosting,
    pub requirements: Requirements,
    pub match_analysis: MatchResult,
    pub workflow_traces: Vec<TraceEntry>,
    /// Model that produced the three replies
    pub model: String,
    pub generated_at: DateTime<Utc>,
}

impl MatchReport {
    /// One-line verdict for the score band.
    pub fn verdict(&self) -> &'static str {
        match self.match_analysis.score {
            80..=100 => "Strong match",
            60..=79 => "Good match",
            40..=59 => "Partial match",
            _ => "Weak match",
        }
    }
}

/// Where the structured and human-readable documents are written.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub json: PathBuf,
    pub markdown: PathBuf,
}

impl OutputPaths {
    pub fn from_config(config: &Config) -> Self {
        Self {
            json: config.json_output_path(),
            markdown: config.markdown_output_path(),
        }
    }
}
