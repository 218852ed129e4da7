//! The job handler: validates a job's input and delegates to the engine.

use crate::{JobMetrics, JobOutcome};
use podgen_core::{GenerationResult, INVALID_INPUT_MESSAGE, Job, JobInput};
use podgen_engine::EngineAdapter;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Entry point invoked once per job.
///
/// Never fails: invalid input and generation errors both come back as
/// `{"error": ...}` results.
#[derive(Debug, Clone)]
pub struct JobHandler {
    adapter: Arc<EngineAdapter>,
    metrics: Arc<JobMetrics>,
}

impl JobHandler {
    /// Creates a handler around a shared adapter.
    pub fn new(adapter: Arc<EngineAdapter>, metrics: Arc<JobMetrics>) -> Self {
        Self { adapter, metrics }
    }

    /// The adapter this handler delegates to.
    pub fn adapter(&self) -> &EngineAdapter {
        &self.adapter
    }

    /// Counters updated by this handler.
    pub fn metrics(&self) -> &Arc<JobMetrics> {
        &self.metrics
    }

    /// Runs one job.
    #[instrument(skip(self, job), fields(job_id = job.id().as_deref().unwrap_or("-")))]
    pub async fn handle(&self, job: &Job) -> GenerationResult {
        let started = Instant::now();
        self.metrics.record_received();

        let (result, outcome) = match parse_input(job.input()) {
            Ok(input) => {
                let result = self.adapter.generate(&input).await;
                let outcome = if result.is_error() {
                    JobOutcome::Failed
                } else {
                    JobOutcome::Succeeded
                };
                (result, outcome)
            }
            Err(result) => (result, JobOutcome::Rejected),
        };

        self.metrics.record_finished(outcome, started.elapsed());
        match result.error_message() {
            Some(error) => warn!(outcome = outcome.as_str(), error, "Job returned an error"),
            None => info!(elapsed_ms = started.elapsed().as_millis() as u64, "Job completed"),
        }
        result
    }
}

/// Accepts an input mapping that names `messages` or `prompt`.
fn parse_input(input: &Value) -> Result<JobInput, GenerationResult> {
    let Some(map) = input.as_object() else {
        return Err(GenerationResult::error(INVALID_INPUT_MESSAGE));
    };
    if !map.contains_key("messages") && !map.contains_key("prompt") {
        return Err(GenerationResult::error(INVALID_INPUT_MESSAGE));
    }
    JobInput::deserialize(input).map_err(|e| GenerationResult::error(e.to_string()))
}
