//! Explicit per-run context handed to every stage

use crate::config::{Config, LlmConfig};
use crate::input::DocumentReader;
use crate::llm::TextGenerator;
use crate::pipeline::trace::TraceLog;
use std::sync::Arc;

/// Sampling temperature for each stage's generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub parser_temperature: f32,
    pub analyzer_temperature: f32,
    pub matcher_temperature: f32,
}

impl From<&LlmConfig> for GenerationSettings {
    fn from(config: &LlmConfig) -> Self {
        Self {
            parser_temperature: config.parser_temperature,
            analyzer_temperature: config.analyzer_temperature,
            matcher_temperature: config.matcher_temperature,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

pub struct RunContext {
    pub generator: Arc<dyn TextGenerator>,
    pub settings: GenerationSettings,
    pub reader: DocumentReader,
    pub trace: TraceLog,
}

impl RunContext {
    pub fn new(generator: Arc<dyn TextGenerator>, settings: GenerationSettings, trace: TraceLog) -> Self {
        Self {
            generator,
            settings,
            reader: DocumentReader::new(),
            trace,
        }
    }

    /// Context whose trace is appended to the configured trace log file.
    pub fn from_config(config: &Config, generator: Arc<dyn TextGenerator>) -> Self {
        Self::new(
            generator,
            GenerationSettings::from(&config.llm),
            TraceLog::with_file(config.trace_log_path()),
        )
    }
}
