//! Crate-level error aggregation.

use crate::{ConfigError, EngineError, ServerError, TokenizerError};

/// Crate-level error variants.
#[derive(Debug, derive_more::From)]
pub enum PodgenErrorKind {
    /// Configuration error
    Config(ConfigError),
    /// Inference engine error
    Engine(EngineError),
    /// Tokenizer or chat template error
    Tokenizer(TokenizerError),
    /// Job runner error
    Server(ServerError),
}

impl std::fmt::Display for PodgenErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PodgenErrorKind::Config(e) => write!(f, "{}", e),
            PodgenErrorKind::Engine(e) => write!(f, "{}", e),
            PodgenErrorKind::Tokenizer(e) => write!(f, "{}", e),
            PodgenErrorKind::Server(e) => write!(f, "{}", e),
        }
    }
}

/// Podgen error with kind discrimination.
#[derive(Debug)]
pub struct PodgenError(Box<PodgenErrorKind>);

impl PodgenError {
    /// Create a new error from a kind.
    pub fn new(kind: PodgenErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &PodgenErrorKind {
        &self.0
    }

    /// Message without source location, suitable for returning to job callers.
    ///
    /// # Examples
    ///
    /// ```
    /// use podgen_error::{EngineError, EngineErrorKind, PodgenError};
    ///
    /// let err: PodgenError = EngineError::new(EngineErrorKind::EmptyResponse).into();
    /// assert_eq!(err.summary(), "Engine returned no completions");
    /// ```
    pub fn summary(&self) -> String {
        match self.kind() {
            PodgenErrorKind::Config(e) => e.message.clone(),
            PodgenErrorKind::Engine(e) => e.kind.to_string(),
            PodgenErrorKind::Tokenizer(e) => e.kind.to_string(),
            PodgenErrorKind::Server(e) => e.kind.to_string(),
        }
    }
}

impl std::fmt::Display for PodgenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Podgen Error: {}", self.0)
    }
}

impl std::error::Error for PodgenError {}

// Generic From implementation for any type that converts to PodgenErrorKind
impl<T> From<T> for PodgenError
where
    T: Into<PodgenErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for podgen operations.
pub type PodgenResult<T> = std::result::Result<T, PodgenError>;
