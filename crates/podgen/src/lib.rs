//! Serverless LLM inference worker.
//!
//! Each job carries either a chat `messages` list or a raw `prompt` plus
//! optional sampling parameters. The worker renders the prompt, runs it
//! through one long-lived inference engine and returns the completions, or
//! an `{"error": ...}` payload when anything goes wrong.
//!
//! This crate re-exports the workspace crates:
//!
//! - [`podgen_core`] - job, message and sampling types
//! - [`podgen_engine`] - engine process, completion client, tokenizer
//! - [`podgen_server`] - job handler and local HTTP runner
//! - [`podgen_error`] - error types

pub mod cli;

pub use podgen_core::*;
pub use podgen_engine::*;
pub use podgen_error::*;
pub use podgen_server::*;
