//! Tokenizer and chat template error types.

/// Tokenizer error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenizerErrorKind {
    /// Fetching tokenizer files from the model hub failed
    Download(String),
    /// Tokenizer files were found but could not be loaded
    Load(String),
    /// The chat template failed to compile or render
    Template(String),
    /// Encoding text into token ids failed
    Encode(String),
}

impl std::fmt::Display for TokenizerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenizerErrorKind::Download(msg) => {
                write!(f, "Failed to download tokenizer files: {}", msg)
            }
            TokenizerErrorKind::Load(msg) => write!(f, "Failed to load tokenizer: {}", msg),
            TokenizerErrorKind::Template(msg) => write!(f, "Chat template error: {}", msg),
            TokenizerErrorKind::Encode(msg) => write!(f, "Tokenization failed: {}", msg),
        }
    }
}

/// Tokenizer error with source location tracking.
///
/// # Examples
///
/// ```
/// use podgen_error::{TokenizerError, TokenizerErrorKind};
///
/// let err = TokenizerError::new(TokenizerErrorKind::Template("undefined value".into()));
/// assert!(format!("{}", err).contains("Chat template error"));
/// ```
#[derive(Debug, Clone)]
pub struct TokenizerError {
    /// The kind of error that occurred
    pub kind: TokenizerErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl TokenizerError {
    /// Create a new TokenizerError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TokenizerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl std::fmt::Display for TokenizerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Tokenizer Error: {} at line {} in {}",
            self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for TokenizerError {}
