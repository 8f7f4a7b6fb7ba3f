// Error handling module
// Defines the client and run-level error types

use thiserror::Error;

/// Errors raised by generation requests against the llama server
#[derive(Error, Debug)]
pub enum ClientError {
    /// Server answered with a non-success status
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Request never produced a response (timeout, refused connection, ...)
    #[error("HTTP request failed ({kind}): {source}")]
    Transport {
        kind: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Response body was not the JSON we expected
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Wrap a reqwest error, tagging it with a coarse category for logs
    pub fn transport(source: reqwest::Error) -> Self {
        Self::Transport {
            kind: error_kind(&source),
            source,
        }
    }
}

/// Categorize a transport error for better debugging
pub fn error_kind(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connection_failed"
    } else if e.is_request() {
        "request_error"
    } else if e.is_body() {
        "body_error"
    } else if e.is_decode() {
        "decode_error"
    } else {
        "unknown"
    }
}

/// Fatal failures of a benchmark run, each mapped to its own exit status
#[derive(Error, Debug)]
pub enum RunError {
    /// Health check did not return 200
    #[error("Server at {base_url} is not healthy")]
    Unhealthy { base_url: String },

    /// The single smoke-test generation raised
    #[error("Smoke test generation failed: {0}")]
    SmokeTest(#[source] ClientError),

    /// The HTTP client could not be built
    #[error("Failed to set up client: {0:#}")]
    Setup(anyhow::Error),

    /// Results could not be written
    #[error("Failed to persist results: {0:#}")]
    Persist(anyhow::Error),
}

impl RunError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Setup(_) | RunError::Persist(_) => 1,
            RunError::Unhealthy { .. } => 2,
            RunError::SmokeTest(_) => 3,
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
