//! Error handling for the job matcher

use crate::pipeline::PipelineStage;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobMatcherError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Unreadable document '{}': {reason}", path.display())]
    UnreadableDocument { path: PathBuf, reason: String },

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Schema validation error ({schema}): {message}")]
    SchemaValidation { schema: &'static str, message: String },

    #[error("Upstream service error: {0}")]
    UpstreamService(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{stage} failed: {source}")]
    StageFailed {
        stage: PipelineStage,
        #[source]
        source: Box<JobMatcherError>,
    },
}

impl JobMatcherError {
    pub fn schema(schema: &'static str, message: impl Into<String>) -> Self {
        JobMatcherError::SchemaValidation {
            schema,
            message: message.into(),
        }
    }

    /// The stage a run aborted at, if this error came out of the pipeline.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            JobMatcherError::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Innermost error, skipping any stage wrapper.
    pub fn root(&self) -> &JobMatcherError {
        match self {
            JobMatcherError::StageFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, JobMatcherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_wrapper_exposes_root_and_stage() {
        let err = JobMatcherError::StageFailed {
            stage: PipelineStage::MatchingResume,
            source: Box::new(JobMatcherError::UpstreamService("timed out".to_string())),
        };

        assert_eq!(err.stage(), Some(PipelineStage::MatchingResume));
        assert!(matches!(err.root(), JobMatcherError::UpstreamService(_)));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_schema_helper_message() {
        let err = JobMatcherError::schema("JobPosting", "missing field `title`");
        assert_eq!(
            err.to_string(),
            "Schema validation error (JobPosting): missing field `title`"
        );
        assert_eq!(err.stage(), None);
    }
}
