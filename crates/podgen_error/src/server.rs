//! Job runner error types.

/// Job runner error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ServerErrorKind {
    /// Could not bind the listening socket
    #[display("Failed to bind {}: {}", addr, message)]
    Bind {
        /// Address that was requested
        addr: String,
        /// Underlying error
        message: String,
    },
    /// The HTTP server stopped with an error
    #[display("Server error: {}", _0)]
    Serve(String),
}

/// Job runner error with source location tracking.
#[derive(Debug, Clone)]
pub struct ServerError {
    /// The kind of error that occurred
    pub kind: ServerErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ServerError {
    /// Create a new ServerError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ServerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Server Error: {} at line {} in {}",
            self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for ServerError {}
