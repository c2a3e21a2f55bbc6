//! Sequential workflow: posting → requirements → match → report

pub mod context;
pub mod orchestrator;
pub mod state;
pub mod trace;

pub use context::{GenerationSettings, RunContext};
pub use orchestrator::Orchestrator;
pub use state::{PipelineStage, PipelineState};
pub use trace::{TraceEntry, TraceLog};
