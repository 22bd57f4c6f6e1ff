//! Unified error types for the koban client.
//!
//! The hierarchy mirrors the failure surfaces of the signing flow:
//! - Local input validation (before any network call)
//! - Transport failures (connection, timeout)
//! - Backend rejections (non-2xx responses)
//! - Post-condition violations (2xx responses whose payload fails a contract)
//! - Signature generation failures
//! - Tool dispatch failures

/// Result type alias for koban operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for wallet API operations and the signing flow.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Bad input rejected locally, before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Connection or timeout failure reaching the backend.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-2xx backend response.
    #[error("Backend error ({status}): {message}")]
    Backend {
        /// HTTP status code returned by the backend.
        status: u16,
        /// Message mined from the JSON error body, or the raw text.
        message: String,
    },

    /// The call succeeded but its payload violated a required contract,
    /// e.g. a signing record that never reached `completed`.
    #[error("Post-condition failed: {0}")]
    PostCondition(String),

    /// Signature generation error.
    #[error("Signer error: {0}")]
    Signer(#[from] SignerError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error with a message.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a transport error with a message.
    #[must_use]
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a backend error from a status code and message.
    #[must_use]
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// Create a post-condition error with a message.
    #[must_use]
    pub fn post_condition(msg: impl Into<String>) -> Self {
        Self::PostCondition(msg.into())
    }

    /// Build a backend error from a non-2xx response body.
    ///
    /// Prefers the `message` (or `error`) string of a JSON error body;
    /// falls back to the raw response text when the body is not JSON.
    #[must_use]
    pub fn backend_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("error"))
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| body.trim().to_owned());

        let message = if message.is_empty() {
            "empty response body".to_owned()
        } else {
            message
        };

        Self::Backend { status, message }
    }

    /// Check whether this error was produced before any network call.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Signer(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::transport("request timed out")
        } else if err.is_connect() {
            Self::transport(format!("connection failed: {err}"))
        } else {
            Self::transport(err.to_string())
        }
    }
}

/// Error type for local signature generation.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum SignerError {
    /// The operation hash could not be decoded from hex.
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// The private key is malformed.
    #[error("Key format error: {0}")]
    KeyFormat(String),

    /// The signing primitive itself failed.
    #[error("Signing error: {0}")]
    Signing(String),
}

impl SignerError {
    /// Create a decoding error.
    #[must_use]
    pub fn decoding(msg: impl Into<String>) -> Self {
        Self::Decoding(msg.into())
    }

    /// Create a key format error.
    #[must_use]
    pub fn key_format(msg: impl Into<String>) -> Self {
        Self::KeyFormat(msg.into())
    }

    /// Create a signing error.
    #[must_use]
    pub fn signing(msg: impl Into<String>) -> Self {
        Self::Signing(msg.into())
    }
}

/// Error type for tool dispatch failures.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ToolError {
    /// Error during tool execution.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Invalid arguments provided to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Operation not part of the supported set.
    #[error("Operation not found: {0}")]
    NotFound(String),

    /// Generic error.
    #[error("Tool error: {0}")]
    Other(String),
}

impl ToolError {
    /// Create an execution error.
    #[must_use]
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Create an invalid arguments error.
    #[must_use]
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }
}

impl From<String> for ToolError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for ToolError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidArguments(err.to_string())
    }
}

impl From<Error> for ToolError {
    fn from(e: Error) -> Self {
        match e {
            Error::Validation(msg) => Self::InvalidArguments(msg),
            _ => Self::Execution(e.to_string()),
        }
    }
}
