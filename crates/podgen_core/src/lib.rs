//! Core data types for the podgen serverless inference worker.
//!
//! This crate defines the job envelope, the generation input accepted by
//! the handler, sampling parameters with their defaults, and the result
//! shape returned to callers.

mod job;
mod message;
mod observability;
mod sampling;
mod serde_util;

pub use job::{
    CompletionOutput, GenerationOutput, GenerationResult, INVALID_INPUT_MESSAGE, Job, JobFailure,
    JobInput, JobInputBuilder, JobResponse, JobStatus, NO_PROMPT_MESSAGE,
};
pub use message::{ChatMessage, ChatMessageBuilder, Role};
pub use observability::{LogFormat, init_observability, init_tracing, shutdown_observability};
pub use sampling::{
    DEFAULT_FREQUENCY_PENALTY, DEFAULT_MAX_TOKENS, DEFAULT_N, DEFAULT_PRESENCE_PENALTY,
    DEFAULT_TEMPERATURE, DEFAULT_TOP_P, SamplingConfig, SamplingParams, SamplingParamsBuilder,
    StopSequences,
};
