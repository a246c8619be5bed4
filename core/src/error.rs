//! Error types for sending requests through a `Client`.
//!
//! # Design
//! One variant per stage of `Client::send`: validation, body building,
//! transport, body read and decoding. Backend causes are boxed so the three
//! backends can share a single error type. `DecodeError` keeps the raw body
//! text because the usual cause is a server answering with HTML or plain
//! text where JSON was expected.

use thiserror::Error;

/// Boxed cause reported by a backend library.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SendError>;

/// Errors returned by `Client::send` and the body builder.
#[derive(Debug, Error)]
pub enum SendError {
    /// A required request field (method, scheme, domain, path) is missing,
    /// or the request could not be turned into a backend request.
    #[error("invalid request, {0}")]
    InvalidRequestError(String),

    /// A multipart part could not be written into the body.
    #[error("multipart encoding failed: {0}")]
    MultipartEncodingError(String),

    /// The request payload could not be serialized to JSON.
    #[error("marshal request failed: {0}")]
    SerializationError(#[source] serde_json::Error),

    /// The response body could not be read from the transport.
    #[error("failed to read response body: {0}")]
    BodyReadError(#[source] BoxError),

    /// The response body is not valid JSON for the target response.
    #[error("failed to parse json content: {body}, because: {source}")]
    DecodeError {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backend failed to complete the round trip.
    #[error("failed to get response: {0}")]
    TransportError(#[source] BoxError),
}

impl SendError {
    pub(crate) fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SendError::TransportError(Box::new(err))
    }

    pub(crate) fn body_read<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SendError::BodyReadError(Box::new(err))
    }
}
