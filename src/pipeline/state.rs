//! Pipeline states and the stages a run can fail in

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    ParsingPosting,
    AnalyzingRequirements,
    MatchingResume,
}

impl PipelineStage {
    /// Agent name used in trace entries for this stage.
    pub fn agent(&self) -> &'static str {
        match self {
            PipelineStage::ParsingPosting => "JobParser",
            PipelineStage::AnalyzingRequirements => "RequirementAnalyzer",
            PipelineStage::MatchingResume => "ResumeMatcher",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PipelineStage::ParsingPosting => write!(f, "Posting parsing"),
            PipelineStage::AnalyzingRequirements => write!(f, "Requirement analysis"),
            PipelineStage::MatchingResume => write!(f, "Resume matching"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    ParsingPosting,
    AnalyzingRequirements,
    MatchingResume,
    Done,
    Failed { stage: PipelineStage, reason: String },
}

impl PipelineState {
    /// Forward transitions only; a terminal state never changes.
    pub fn can_advance_to(&self, next: &PipelineState) -> bool {
        use PipelineState::*;

        match (self, next) {
            (Idle, ParsingPosting)
            | (ParsingPosting, AnalyzingRequirements)
            | (AnalyzingRequirements, MatchingResume)
            | (MatchingResume, Done) => true,
            (ParsingPosting | AnalyzingRequirements | MatchingResume, Failed { .. }) => true,
            _ => false,
        }
    }
}

impl From<PipelineStage> for PipelineState {
    fn from(stage: PipelineStage) -> Self {
        match stage {
            PipelineStage::ParsingPosting => PipelineState::ParsingPosting,
            PipelineStage::AnalyzingRequirements => PipelineState::AnalyzingRequirements,
            PipelineStage::MatchingResume => PipelineState::MatchingResume,
        }
    }
}
