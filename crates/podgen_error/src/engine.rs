//! Inference engine error types.

/// Inference engine error conditions.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum EngineErrorKind {
    /// The engine process could not be spawned
    #[display("Failed to launch engine: {}", _0)]
    Launch(String),
    /// The engine did not report healthy before the startup deadline
    #[display("Engine not ready: {}", _0)]
    NotReady(String),
    /// HTTP/network failure talking to the engine
    #[display("HTTP error: {}", _0)]
    Http(String),
    /// The engine answered with a non-success status
    #[display("API error (status {}): {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },
    /// The engine response could not be decoded
    #[display("Response parsing failed: {}", _0)]
    ResponseParsing(String),
    /// A sampling parameter is outside the range the engine accepts
    #[display("Invalid sampling parameter: {}", _0)]
    InvalidSampling(String),
    /// The engine returned no completions
    #[display("Engine returned no completions")]
    EmptyResponse,
}

/// Inference engine error with source location tracking.
///
/// # Examples
///
/// ```
/// use podgen_error::{EngineError, EngineErrorKind};
///
/// let err = EngineError::new(EngineErrorKind::Api {
///     status: 400,
///     message: "n must be at least 1".to_string(),
/// });
/// assert!(format!("{}", err).contains("status 400"));
/// ```
#[derive(Debug, Clone)]
pub struct EngineError {
    /// The kind of error that occurred
    pub kind: EngineErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl EngineError {
    /// Create a new EngineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: EngineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Engine Error: {} at line {} in {}",
            self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for EngineError {}
