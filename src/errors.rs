/*!
 * Error types for the doctran application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a translation provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making a request to the provider fails (transport level)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Error when the provider response is malformed or wrong-shaped
    #[error("Failed to parse provider response: {0}")]
    ParseError(String),

    /// Error returned by an HTTP API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error when a subprocess agent exits with a non-zero status
    #[error("Agent process failed (exit={exit_code}): {detail}")]
    AgentFailed {
        /// Process exit code
        exit_code: i32,
        /// Truncated stdout/stderr captured from the agent
        detail: String,
    },

    /// Error when a required credential is missing from the environment
    #[error("Missing credential: {0} is not set")]
    MissingCredential(String),
}

impl ProviderError {
    /// Whether this error is a protocol error (wrong-shaped response) rather
    /// than a transport failure. Protocol errors are eligible for bisection
    /// retry; transport failures fail the batch attempt immediately.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::ParseError(_))
    }
}

/// Errors that can occur during batch translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider returned a different number of translations than requested
    /// and the batch cannot be subdivided further
    #[error("Translation count mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Number of source strings sent
        expected: usize,
        /// Number of translations received
        actual: usize,
    },

    /// The bisection retry budget was exhausted
    #[error("Exceeded retry depth {max_depth} while translating batch of {len}")]
    DepthExceeded {
        /// Maximum allowed bisection depth, counting the initial attempt
        max_depth: usize,
        /// Size of the range that could not be subdivided further
        len: usize,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error in run configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error decoding, parsing or serializing the document
    #[error("Document error: {0}")]
    Document(String),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// The run was interrupted; a checkpoint was written before exiting
    #[error("Interrupted: checkpoint and partial output saved")]
    Interrupted,

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}
