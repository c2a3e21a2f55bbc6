//! Job matcher library: posting → requirements → resume match report

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod processing;

pub use config::Config;
pub use error::{JobMatcherError, Result};
pub use pipeline::Orchestrator;
