//! Text-generation service integration

pub mod generator;
pub mod openai;
pub mod prompts;
pub mod scripted;

pub use generator::{GenerationRequest, TextGenerator};
pub use openai::OpenAiCompatibleClient;
pub use scripted::ScriptedGenerator;
