//! Inference engine adapter for the podgen worker.
//!
//! The engine itself is an external OpenAI-compatible server (vLLM by
//! default) that this crate either launches as a child process or attaches
//! to by URL. Around it sit the model tokenizer, chat template rendering,
//! a plain-text fallback formatter, and the [`EngineAdapter`] that turns a
//! job input into a generation result.
//!
//! # Example
//!
//! ```no_run
//! use podgen_core::JobInputBuilder;
//! use podgen_engine::{EngineAdapter, EngineConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig::from_env()?;
//! let adapter = EngineAdapter::from_config(&config).await?;
//!
//! let input = JobInputBuilder::default()
//!     .prompt("Write a function to check if a number is prime:")
//!     .build()?;
//! let result = adapter.generate(&input).await;
//! println!("{}", serde_json::to_string(&result)?);
//! # Ok(())
//! # }
//! ```

mod adapter;
mod client;
mod config;
pub mod dto;
mod prompt;
mod server;
mod template;
mod tokenizer;
mod traits;

pub use adapter::EngineAdapter;
pub use client::CompletionClient;
pub use config::{DEFAULT_MODEL_NAME, EngineConfig, EngineConfigBuilder};
pub use prompt::{ASSISTANT_CUE, format_messages, resolve_prompt};
pub use server::{EngineProcess, RemoteEngine};
pub use template::ChatTemplate;
pub use tokenizer::ModelTokenizer;
pub use traits::{
    Completion, InferenceEngine, InferenceServer, PromptTokenizer, READINESS_POLL_INTERVAL,
};
