//! Error types for the podgen serverless inference worker.
//!
//! Every error records the source location where it was created. Domain
//! errors convert into [`PodgenError`] so `?` works across crate boundaries.

mod config;
mod engine;
mod error;
mod server;
mod tokenizer;

pub use config::ConfigError;
pub use engine::{EngineError, EngineErrorKind};
pub use error::{PodgenError, PodgenErrorKind, PodgenResult};
pub use server::{ServerError, ServerErrorKind};
pub use tokenizer::{TokenizerError, TokenizerErrorKind};
