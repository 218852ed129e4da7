//! Completion client for the engine's OpenAI-compatible HTTP API.

use crate::dto::{CompletionRequest, CompletionResponse};
use crate::{Completion, InferenceEngine, PromptTokenizer};
use async_trait::async_trait;
use podgen_core::SamplingConfig;
use podgen_error::{EngineError, EngineErrorKind, PodgenResult};
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// Client for an OpenAI-compatible completions endpoint.
///
/// Token counts come from the ids the engine returns for each choice, then
/// from `usage.completion_tokens` for a single choice, and only as a last
/// resort from re-encoding the text with the model tokenizer.
#[derive(Clone)]
pub struct CompletionClient {
    client: Client,
    base_url: String,
    model: String,
    tokenizer: Arc<dyn PromptTokenizer>,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl CompletionClient {
    /// Creates a new completion client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Engine base URL, without the `/v1` suffix
    /// * `model` - Model identifier the engine serves
    /// * `tokenizer` - Tokenizer used to count tokens when the engine omits ids
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        tokenizer: Arc<dyn PromptTokenizer>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let model = model.into();
        debug!(url = %base_url, model = %model, "Created completion client");
        Self {
            client: Client::new(),
            base_url,
            model,
            tokenizer,
        }
    }

    /// Returns the model name.
    pub fn model_name(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/completions", self.base_url)
    }

    fn build_request(&self, prompt: &str, sampling: &SamplingConfig) -> PodgenResult<CompletionRequest> {
        CompletionRequest::builder()
            .model(self.model.clone())
            .prompt(prompt)
            .temperature(*sampling.temperature())
            .top_p(*sampling.top_p())
            .max_tokens(*sampling.max_tokens())
            .n(*sampling.n())
            .stop(sampling.stop().clone())
            .presence_penalty(*sampling.presence_penalty())
            .frequency_penalty(*sampling.frequency_penalty())
            .build()
            .map_err(|e| {
                EngineError::new(EngineErrorKind::InvalidSampling(format!(
                    "Failed to build request: {}",
                    e
                )))
                .into()
            })
    }
}

#[async_trait]
impl InferenceEngine for CompletionClient {
    #[instrument(skip(self, prompt, sampling), fields(model = %self.model, prompt_len = prompt.len(), n = sampling.n()))]
    async fn generate(&self, prompt: &str, sampling: &SamplingConfig) -> PodgenResult<Vec<Completion>> {
        let request = self.build_request(prompt, sampling)?;

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "HTTP request failed");
                EngineError::new(EngineErrorKind::Http(format!("Request failed: {}", e)))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = %status, error = %error_text, "Engine API error");
            return Err(EngineError::new(EngineErrorKind::Api {
                status: status.as_u16(),
                message: error_text,
            })
            .into());
        }

        let body: CompletionResponse = response.json().await.map_err(|e| {
            error!(error = ?e, "Failed to parse response");
            EngineError::new(EngineErrorKind::ResponseParsing(format!(
                "Failed to parse JSON: {}",
                e
            )))
        })?;

        if body.choices.is_empty() {
            return Err(EngineError::new(EngineErrorKind::EmptyResponse).into());
        }

        let usage_tokens = body.usage.as_ref().and_then(|u| u.completion_tokens);
        let single = body.choices.len() == 1;
        let mut choices = body.choices;
        choices.sort_by_key(|choice| choice.index);
        debug!(choices = choices.len(), "Received completions");

        let mut completions = Vec::with_capacity(choices.len());
        for choice in choices {
            let tokens = match (choice.token_ids, usage_tokens) {
                (Some(ids), _) => ids.len(),
                (None, Some(count)) if single => count,
                (None, _) => {
                    warn!("Engine returned no token ids; counting by re-encoding text");
                    self.tokenizer.encode(&choice.text)?.len()
                }
            };
            completions.push(Completion {
                text: choice.text,
                finish_reason: choice.finish_reason,
                tokens,
            });
        }
        Ok(completions)
    }
}
