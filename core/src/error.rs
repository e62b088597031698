//! Error types for the AppVeyor client.
//!
//! # Design
//! Three failure points exist on every call and each gets its own variant:
//! no response at all (`Transport`), a response with a non-2xx status
//! (`Request`, keeping the exact status and raw body), and a 2xx body that is
//! not the JSON we expected (`Decode`). Nothing is retried. The remaining
//! variants cover failures before a request leaves the process.

use thiserror::Error;

/// Result type alias for client operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received: connection, DNS, TLS or body read failure.
    #[error("transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Request { status: u16, body: String },

    /// A 2xx response body could not be decoded.
    #[error("failed to decode response body: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    /// The JSON request payload could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// Query parameters could not be form-encoded.
    #[error("failed to encode query string: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Wrap any error (or message) as a transport failure.
    pub fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ApiError::Transport(err.into())
    }

    /// HTTP status of a `Request` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body of a `Request` or `Decode` error.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Request { body, .. } | ApiError::Decode { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        ApiError::Transport(Box::new(err))
    }
}
