//! Test doubles for the engine traits.

use async_trait::async_trait;
use podgen_core::SamplingConfig;
use podgen_engine::{ChatTemplate, Completion, InferenceEngine, PromptTokenizer};
use podgen_error::{EngineError, EngineErrorKind, PodgenResult, TokenizerError};
use std::sync::Mutex;

/// What the mock engine does when asked to generate.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return these completions
    Complete(Vec<Completion>),
    /// Echo the prompt `n` times with one token per character
    Echo,
    /// Fail with an API error
    Fail { status: u16, message: String },
}

/// Engine double that records every prompt and sampling config it sees.
#[derive(Debug)]
pub struct MockEngine {
    behavior: MockBehavior,
    calls: Mutex<Vec<(String, SamplingConfig)>>,
}

#[allow(dead_code)]
impl MockEngine {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, SamplingConfig)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.calls().last().map(|(prompt, _)| prompt.clone())
    }
}

#[async_trait]
impl InferenceEngine for MockEngine {
    async fn generate(&self, prompt: &str, sampling: &SamplingConfig) -> PodgenResult<Vec<Completion>> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), sampling.clone()));

        match &self.behavior {
            MockBehavior::Complete(completions) => Ok(completions.clone()),
            MockBehavior::Echo => Ok((0..*sampling.n())
                .map(|_| Completion {
                    text: prompt.to_string(),
                    finish_reason: Some("stop".to_string()),
                    tokens: prompt.chars().count(),
                })
                .collect()),
            MockBehavior::Fail { status, message } => Err(EngineError::new(EngineErrorKind::Api {
                status: *status,
                message: message.clone(),
            })
            .into()),
        }
    }
}

/// Tokenizer double: one token per whitespace-separated word.
#[derive(Debug, Default)]
pub struct MockTokenizer {
    template: Option<ChatTemplate>,
}

#[allow(dead_code)]
impl MockTokenizer {
    pub fn plain() -> Self {
        Self { template: None }
    }

    pub fn with_template(source: &str) -> Self {
        Self {
            template: Some(ChatTemplate::new(source, None, None).expect("valid template")),
        }
    }
}

impl PromptTokenizer for MockTokenizer {
    fn chat_template(&self) -> Option<&ChatTemplate> {
        self.template.as_ref()
    }

    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError> {
        Ok(text
            .split_whitespace()
            .enumerate()
            .map(|(i, _)| i as u32)
            .collect())
    }
}

/// Shorthand for a completion with `tokens` generated tokens.
#[allow(dead_code)]
pub fn completion(text: &str, finish_reason: &str, tokens: usize) -> Completion {
    Completion {
        text: text.to_string(),
        finish_reason: Some(finish_reason.to_string()),
        tokens,
    }
}
