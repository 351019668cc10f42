//! Error types for the REST client.
//!
//! # Design
//! Every failure a `RestClient` can hit is recorded as a single sticky
//! `RestError`. The variants tell the caller which step failed; none of them
//! is raised as a panic.

use std::error::Error as StdError;

use thiserror::Error;

/// Errors latched by `RestClient::execute` and `RestClient::parse_response_body`.
#[derive(Debug, Error)]
pub enum RestError {
    /// The request payload could not be serialized to JSON.
    #[error("failed to encode request payload: {0}")]
    Encode(#[source] serde_json::Error),

    /// The method or URL was rejected before dispatch.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The transport failed to deliver the request or to read the response body.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The response body is not valid JSON or does not fit the receiver.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Failure reported by a `Transport` implementation.
///
/// Wraps whatever error the underlying HTTP stack produced so it stays
/// reachable through `source()`.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(Box<dyn StdError + Send + Sync>);

impl TransportError {
    pub fn new(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self(err.into())
    }

    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync> {
        self.0
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err)
    }
}
