//! Data transfer objects for the engine's OpenAI-compatible completions API.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// OpenAI-compatible text completion request.
#[derive(Debug, Clone, Serialize, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct CompletionRequest {
    /// Model identifier
    model: String,
    /// Prompt text, already templated
    prompt: String,
    /// Sampling temperature
    temperature: f32,
    /// Nucleus sampling threshold
    top_p: f32,
    /// Maximum tokens to generate
    max_tokens: u32,
    /// Number of completions
    n: u32,
    /// Stop sequences
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    stop: Option<Vec<String>>,
    /// Presence penalty
    presence_penalty: f32,
    /// Frequency penalty
    frequency_penalty: f32,
    /// Enable streaming
    #[builder(default)]
    stream: bool,
    /// Ask the engine to include generated token ids in each choice
    #[builder(default = "true")]
    return_token_ids: bool,
}

impl CompletionRequest {
    /// Creates a new builder for CompletionRequest.
    pub fn builder() -> CompletionRequestBuilder {
        CompletionRequestBuilder::default()
    }
}

/// A choice in the completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    /// Position of this choice among the `n` requested
    #[serde(default)]
    pub index: u32,
    /// Generated text
    pub text: String,
    /// Reason for finishing
    #[serde(default)]
    pub finish_reason: Option<String>,
    /// Generated token ids, when the engine returns them
    #[serde(default)]
    pub token_ids: Option<Vec<u32>>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionUsage {
    /// Tokens in the prompt
    #[serde(default)]
    pub prompt_tokens: Option<usize>,
    /// Tokens in all completions
    #[serde(default)]
    pub completion_tokens: Option<usize>,
}

/// OpenAI-compatible text completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    /// Response choices
    pub choices: Vec<CompletionChoice>,
    /// Token usage
    #[serde(default)]
    pub usage: Option<CompletionUsage>,
}
