use thiserror::Error;

use crate::store::StoreError;

/// Error outputs from `qogam-core`
#[derive(Debug, Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum QogamError {
    /// The presented input is not valid for the requested operation
    #[error("invalid_input_{attribute}: {reason}")]
    InvalidInput {
        /// The attribute that failed validation.
        attribute: String,
        /// Human-readable reason.
        reason: String,
    },
    /// Network connection error or non-2xx response. `error` carries the server's message when one was sent.
    #[error("{error}")]
    NetworkError {
        /// The requested URL.
        url: String,
        /// HTTP status, if a response was received.
        status: Option<u16>,
        /// Error description (server `message` field when available).
        error: String,
    },
    /// The server answered 2xx but reported the operation as unsuccessful.
    #[error("{message}")]
    Rejected {
        /// The server's message, or a default describing the operation.
        message: String,
    },
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out")]
    Timeout {
        /// The requested URL.
        url: String,
    },
    /// The operation was cancelled before it completed.
    #[error("operation cancelled")]
    Cancelled,
    /// The operation requires an authenticated session.
    #[error("not authenticated")]
    Unauthenticated,
    /// Unexpected error serializing or deserializing information
    #[error("serialization_error: {error}")]
    SerializationError {
        /// Underlying error description.
        error: String,
    },
    /// The platform key-value store failed.
    #[error(transparent)]
    Storage(#[from] StoreError),
    /// Unhandled error
    #[error("unexpected_error: {error}")]
    Generic {
        /// Underlying error description.
        error: String,
    },
}

impl QogamError {
    /// The server-provided message carried by this error, if it came from the backend.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::NetworkError {
                status: Some(_),
                error,
                ..
            }
            | Self::Rejected { message: error } => Some(error.as_str()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for QogamError {
    fn from(error: serde_json::Error) -> Self {
        Self::SerializationError {
            error: error.to_string(),
        }
    }
}

impl From<reqwest::Error> for QogamError {
    fn from(error: reqwest::Error) -> Self {
        let url = error
            .url()
            .map_or_else(|| "<unknown>".to_string(), ToString::to_string);
        if error.is_timeout() {
            return Self::Timeout { url };
        }
        Self::NetworkError {
            url,
            status: error.status().map(|status| status.as_u16()),
            error: error.to_string(),
        }
    }
}
