//! Trait interfaces at the engine boundary
//!
//! - [`InferenceServer`] - engine process lifecycle and health
//! - [`InferenceEngine`] - text generation for a single prompt
//! - [`PromptTokenizer`] - chat templating and token counting

use crate::ChatTemplate;
use async_trait::async_trait;
use podgen_core::SamplingConfig;
use podgen_error::{EngineError, EngineErrorKind, PodgenResult, TokenizerError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Interval between readiness probes.
pub const READINESS_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// One completion produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Completion {
    /// Generated text
    pub text: String,
    /// Why generation stopped
    pub finish_reason: Option<String>,
    /// Number of generated tokens
    pub tokens: usize,
}

/// Trait for an inference server the worker talks to over HTTP
#[async_trait]
pub trait InferenceServer: Send + Sync {
    /// Get the base URL of the server (e.g., "http://127.0.0.1:8000")
    fn base_url(&self) -> String;

    /// Check if the server is healthy and responding to requests
    async fn health_check(&self) -> Result<(), EngineError>;

    /// Wait for the server to become ready, with timeout
    ///
    /// Polls the server health endpoint until it responds successfully
    /// or the timeout is reached.
    async fn wait_until_ready(&self, timeout: Duration) -> Result<(), EngineError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.health_check().await {
                Ok(()) => return Ok(()),
                Err(e) if Instant::now() >= deadline => {
                    return Err(EngineError::new(EngineErrorKind::NotReady(format!(
                        "{} not healthy after {:?}: {}",
                        self.base_url(),
                        timeout,
                        e.kind
                    ))));
                }
                Err(e) => debug!(error = %e.kind, "Engine not ready yet"),
            }
            tokio::time::sleep(READINESS_POLL_INTERVAL).await;
        }
    }
}

/// Trait for engines that turn one prompt into completions
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Generate `sampling.n()` completions for `prompt`, in engine order.
    async fn generate(&self, prompt: &str, sampling: &SamplingConfig) -> PodgenResult<Vec<Completion>>;
}

/// Trait for tokenizers used around generation
pub trait PromptTokenizer: Send + Sync {
    /// The model's chat template, if it ships one.
    fn chat_template(&self) -> Option<&ChatTemplate>;

    /// Encode text into token ids without adding special tokens.
    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError>;
}
