//! The three model-backed stages and their reply validation

pub mod matcher;
pub mod posting;
pub mod requirements;
pub mod validation;

pub use matcher::{MatchResult, ResumeMatcher};
pub use posting::{JobPosting, PostingStructurer};
pub use requirements::{RequirementExtractor, Requirements};
