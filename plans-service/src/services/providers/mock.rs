//! Scripted provider for tests and offline development.

use super::{GenerationParams, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A prompt the provider received, with whether it asked for structured output.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub structured: bool,
}

/// Replies with queued responses in order and records every call.
///
/// Once the script runs out each call fails with an API error, so tests
/// notice an unexpected extra model call.
#[derive(Default)]
pub struct ScriptedTextProvider {
    script: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTextProvider {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queues a failing call after the replies already scripted.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Err(message.into()));
        }
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|guard| guard.len()).unwrap_or(0)
    }
}

#[async_trait]
impl TextProvider for ScriptedTextProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                prompt: prompt.to_string(),
                structured: params.output_schema.is_some(),
            });
        }

        let next = self
            .script
            .lock()
            .map_err(|_| ProviderError::ApiError("script poisoned".to_string()))?
            .pop_front();

        match next {
            Some(Ok(text)) => Ok(ProviderResponse {
                input_tokens: prompt.len() as i32 / 4,
                output_tokens: text.len() as i32 / 4,
                text,
            }),
            Some(Err(message)) => Err(ProviderError::ApiError(message)),
            None => Err(ProviderError::ApiError(
                "no scripted response left".to_string(),
            )),
        }
    }
}
