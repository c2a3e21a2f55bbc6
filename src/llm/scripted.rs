//! Canned-reply `TextGenerator` used in tests and offline runs

use crate::error::{JobMatcherError, Result};
use crate::llm::generator::{parse_structured_reply, GenerationRequest, TextGenerator};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone)]
enum ScriptedReply {
    Json(Value),
    Text(String),
    Failure(String),
}

/// Replays queued replies in order and records every request it receives.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, reply: Value) -> Self {
        self.push(ScriptedReply::Json(reply))
    }

    /// Raw reply text, parsed the same way a live reply would be.
    pub fn with_text_reply(self, reply: impl Into<String>) -> Self {
        self.push(ScriptedReply::Text(reply.into()))
    }

    /// Simulates a failed or timed-out service call.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(ScriptedReply::Failure(message.into()))
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        lock(&self.requests).clone()
    }

    pub fn remaining(&self) -> usize {
        lock(&self.replies).len()
    }

    fn push(self, reply: ScriptedReply) -> Self {
        lock(&self.replies).push_back(reply);
        self
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value> {
        lock(&self.requests).push(request.clone());

        let reply = lock(&self.replies).pop_front();
        match reply {
            Some(ScriptedReply::Json(value)) => Ok(value),
            Some(ScriptedReply::Text(text)) => parse_structured_reply(&text, request.schema_name),
            Some(ScriptedReply::Failure(message)) => Err(JobMatcherError::UpstreamService(message)),
            None => Err(JobMatcherError::UpstreamService(format!(
                "no scripted reply left for {}",
                request.schema_name
            ))),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
