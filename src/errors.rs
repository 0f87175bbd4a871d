use std::path::PathBuf;

use thiserror::Error;

/// All errors that can occur when using the VidNavigator SDK.
#[derive(Error, Debug)]
pub enum VidNavigatorError {
    /// No usable API key was available when building the client.
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// Invalid parameters (HTTP 400).
    #[error("bad request: {message}")]
    BadRequest { message: String },

    /// Usage limits exceeded, the plan must be upgraded (HTTP 402).
    #[error("payment required: {message}")]
    PaymentRequired { message: String },

    /// The key is valid but lacks permission for this resource (HTTP 403).
    #[error("access denied: {message}")]
    AccessDenied { message: String },

    /// The requested resource was not found (HTTP 404).
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Too many requests (HTTP 429).
    #[error("rate limit exceeded: {message}")]
    RateLimitExceeded { message: String },

    /// Any 5xx response.
    #[error("server error {status_code}: {message}")]
    Server { status_code: u16, message: String },

    /// A non-2xx status without a dedicated variant.
    #[error("unexpected response ({status_code}): {message}")]
    Api { status_code: u16, message: String },

    /// A transport-level HTTP error from reqwest (connect, DNS, timeout...).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A success response whose body did not match the expected schema.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// An I/O error, typically from reading a local file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The path handed to `upload_file` is not an existing regular file.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}

impl VidNavigatorError {
    /// Map a non-success HTTP status to its error variant.
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            400 => Self::BadRequest { message },
            402 => Self::PaymentRequired { message },
            403 => Self::AccessDenied { message },
            404 => Self::NotFound { message },
            429 => Self::RateLimitExceeded { message },
            500.. => Self::Server {
                status_code,
                message,
            },
            _ => Self::Api {
                status_code,
                message,
            },
        }
    }

    /// The HTTP status this error was built from, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::BadRequest { .. } => Some(400),
            Self::PaymentRequired { .. } => Some(402),
            Self::AccessDenied { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::RateLimitExceeded { .. } => Some(429),
            Self::Server { status_code, .. } | Self::Api { status_code, .. } => Some(*status_code),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// `true` for 429, 5xx and transport failures. The SDK never retries on
    /// its own; this is for callers that do.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded { .. } | Self::Server { .. } | Self::Request(_)
        )
    }
}

/// A convenience alias for `Result<T, VidNavigatorError>`.
pub type Result<T> = std::result::Result<T, VidNavigatorError>;
