//! The engine adapter: one engine handle serving every job.

use crate::prompt::resolve_prompt;
use crate::{
    CompletionClient, EngineConfig, EngineProcess, InferenceEngine, InferenceServer,
    ModelTokenizer, PromptTokenizer, RemoteEngine,
};
use podgen_core::{
    CompletionOutput, GenerationOutput, GenerationResult, JobInput, NO_PROMPT_MESSAGE,
    SamplingConfig,
};
use podgen_error::PodgenResult;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Owns the inference engine and tokenizer for the lifetime of the worker.
///
/// Construct once with [`EngineAdapter::from_config`] and share behind an
/// `Arc`; [`EngineAdapter::generate`] never fails, it reports errors in the
/// returned [`GenerationResult`].
#[derive(Clone)]
pub struct EngineAdapter {
    model: String,
    engine: Arc<dyn InferenceEngine>,
    tokenizer: Arc<dyn PromptTokenizer>,
    server: Option<Arc<dyn InferenceServer>>,
}

impl std::fmt::Debug for EngineAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineAdapter")
            .field("model", &self.model)
            .field("server", &self.server.as_ref().map(|s| s.base_url()))
            .finish()
    }
}

impl EngineAdapter {
    /// Assembles an adapter from parts that are already running.
    pub fn new(
        model: impl Into<String>,
        engine: Arc<dyn InferenceEngine>,
        tokenizer: Arc<dyn PromptTokenizer>,
    ) -> Self {
        Self {
            model: model.into(),
            engine,
            tokenizer,
            server: None,
        }
    }

    /// Keeps an engine server handle alive alongside the adapter.
    pub fn with_server(mut self, server: Arc<dyn InferenceServer>) -> Self {
        self.server = Some(server);
        self
    }

    /// Loads the tokenizer, starts or attaches to the engine and waits for
    /// it to become ready.
    ///
    /// Any failure aborts construction; nothing is retried.
    #[instrument(skip(config), fields(model = %config.model_name()))]
    pub async fn from_config(config: &EngineConfig) -> PodgenResult<Self> {
        let tokenizer: Arc<dyn PromptTokenizer> = Arc::new(ModelTokenizer::load(config).await?);

        let server: Arc<dyn InferenceServer> = match config.base_url() {
            Some(url) => {
                info!(url = %url, "Attaching to running inference engine");
                Arc::new(RemoteEngine::new(url.clone()))
            }
            None => Arc::new(EngineProcess::launch(config)?),
        };
        server.wait_until_ready(*config.startup_timeout()).await?;

        let engine = Arc::new(CompletionClient::new(
            server.base_url(),
            config.model_name().clone(),
            tokenizer.clone(),
        ));
        info!(url = %server.base_url(), "Engine adapter ready");

        Ok(Self::new(config.model_name().clone(), engine, tokenizer).with_server(server))
    }

    /// Configured model identifier, reported in every successful result.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The engine server handle, when the adapter owns one.
    pub fn server(&self) -> Option<&Arc<dyn InferenceServer>> {
        self.server.as_ref()
    }

    /// Runs one generation request.
    #[instrument(skip(self, input), fields(model = %self.model))]
    pub async fn generate(&self, input: &JobInput) -> GenerationResult {
        if *input.stream() == Some(true) {
            warn!("Streaming was requested; returning the full result instead");
        }

        let prompt = match resolve_prompt(input, self.tokenizer.as_ref()) {
            Ok(Some(prompt)) => prompt,
            Ok(None) => return GenerationResult::error(NO_PROMPT_MESSAGE),
            Err(e) => {
                error!(error = %e, "Prompt rendering failed");
                return GenerationResult::error(e.kind.to_string());
            }
        };

        let sampling = input
            .sampling_params()
            .as_ref()
            .map(|params| params.resolve())
            .unwrap_or_default();

        match self.run(&prompt, &sampling).await {
            Ok(output) => output.into(),
            Err(e) => {
                error!(error = %e, "Generation failed");
                GenerationResult::error(e.summary())
            }
        }
    }

    async fn run(&self, prompt: &str, sampling: &SamplingConfig) -> PodgenResult<GenerationOutput> {
        sampling.validate()?;
        debug!(prompt_len = prompt.len(), n = *sampling.n(), "Submitting prompt");

        let completions = self.engine.generate(prompt, sampling).await?;
        let output = completions
            .into_iter()
            .map(|c| CompletionOutput::new(c.text, c.finish_reason, c.tokens))
            .collect::<Vec<_>>();
        debug!(completions = output.len(), "Generation finished");

        Ok(GenerationOutput::new(output, self.model.clone()))
    }
}
