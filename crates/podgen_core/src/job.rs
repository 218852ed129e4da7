//! Job records, job inputs and generation results.

use crate::{ChatMessage, SamplingParams};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Error returned for a job input with neither `messages` nor `prompt`.
pub const INVALID_INPUT_MESSAGE: &str =
    "Invalid input format. Expected 'messages' or 'prompt' in input.";

/// Error returned when neither prompt source yields any text.
pub const NO_PROMPT_MESSAGE: &str = "No prompt or messages provided";

/// One unit of work as delivered by the job runner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters)]
pub struct Job {
    /// Identifier assigned by the runner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    /// Raw job input; shape is checked by the handler
    #[serde(default)]
    input: serde_json::Value,
}

impl Job {
    /// Creates a job record.
    pub fn new(id: Option<String>, input: serde_json::Value) -> Self {
        Self { id, input }
    }
}

/// Generation request carried by a job's `input`.
///
/// # Examples
///
/// ```
/// use podgen_core::JobInput;
///
/// let input: JobInput = serde_json::from_str(
///     r#"{"prompt": "Write a haiku", "sampling_params": {"n": 2}}"#,
/// ).unwrap();
/// assert_eq!(input.prompt().as_deref(), Some("Write a haiku"));
/// assert!(input.messages().is_none());
/// ```
#[derive(
    Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters, derive_builder::Builder,
)]
#[builder(setter(into, strip_option), default)]
pub struct JobInput {
    /// Conversation messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    messages: Option<Vec<ChatMessage>>,
    /// Raw prompt, used verbatim when no messages are given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prompt: Option<String>,
    /// Sampling knobs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sampling_params: Option<SamplingParams>,
    /// Streaming flag; accepted but not acted upon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// A single generated completion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct CompletionOutput {
    /// Generated text
    text: String,
    /// Why generation stopped ("stop", "length", ...)
    finish_reason: Option<String>,
    /// Number of generated tokens
    tokens: usize,
}

impl CompletionOutput {
    /// Creates a completion entry.
    pub fn new(text: impl Into<String>, finish_reason: Option<String>, tokens: usize) -> Self {
        Self {
            text: text.into(),
            finish_reason,
            tokens,
        }
    }
}

/// Successful generation payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct GenerationOutput {
    /// Completions in engine order
    output: Vec<CompletionOutput>,
    /// Configured model identifier
    model: String,
}

impl GenerationOutput {
    /// Creates a generation payload.
    pub fn new(output: Vec<CompletionOutput>, model: impl Into<String>) -> Self {
        Self {
            output,
            model: model.into(),
        }
    }
}

/// Failure payload, serialized as `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct JobFailure {
    /// Error message
    error: String,
}

/// The value a job returns: generated output or an error message.
///
/// # Examples
///
/// ```
/// use podgen_core::GenerationResult;
///
/// let result = GenerationResult::error("boom");
/// assert_eq!(serde_json::to_string(&result).unwrap(), r#"{"error":"boom"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenerationResult {
    /// Generation succeeded
    Success(GenerationOutput),
    /// Generation or validation failed
    Failure(JobFailure),
}

impl GenerationResult {
    /// Creates an error result.
    pub fn error(message: impl Into<String>) -> Self {
        GenerationResult::Failure(JobFailure {
            error: message.into(),
        })
    }

    /// Returns true for an error result.
    pub fn is_error(&self) -> bool {
        matches!(self, GenerationResult::Failure(_))
    }

    /// The error message, if this is an error result.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            GenerationResult::Failure(failure) => Some(failure.error().as_str()),
            GenerationResult::Success(_) => None,
        }
    }

    /// The generated output, if generation succeeded.
    pub fn output(&self) -> Option<&GenerationOutput> {
        match self {
            GenerationResult::Success(output) => Some(output),
            GenerationResult::Failure(_) => None,
        }
    }
}

impl From<GenerationOutput> for GenerationResult {
    fn from(output: GenerationOutput) -> Self {
        GenerationResult::Success(output)
    }
}

/// Status reported in the runner's response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// The handler ran and returned a value (which may be an error payload)
    Completed,
}

/// Response envelope for a synchronously executed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct JobResponse {
    /// Job identifier
    id: String,
    /// Execution status
    status: JobStatus,
    /// Handler return value
    output: GenerationResult,
}

impl JobResponse {
    /// Creates a completed envelope.
    pub fn completed(id: impl Into<String>, output: GenerationResult) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Completed,
            output,
        }
    }
}
