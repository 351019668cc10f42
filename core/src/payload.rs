//! Request payloads.
//!
//! A payload is either raw bytes sent as-is or a value encoded to JSON when
//! the request is executed. `Empty` stands for "no payload" and encodes to
//! `null`, so every request carries a body.

use serde::Serialize;

use crate::error::RestError;

/// Body of an outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload<T = serde_json::Value> {
    /// Sent verbatim.
    Raw(Vec<u8>),
    /// JSON-encoded at execution time.
    Json(T),
    /// Encodes to `null`.
    Empty,
}

impl<T> Payload<T> {
    pub fn raw(body: impl Into<Vec<u8>>) -> Self {
        Payload::Raw(body.into())
    }

    pub fn json(value: T) -> Self {
        Payload::Json(value)
    }
}

impl<T> Default for Payload<T> {
    fn default() -> Self {
        Payload::Empty
    }
}

impl<T: Serialize> Payload<T> {
    /// Produce the request body bytes.
    pub fn encode(&self) -> Result<Vec<u8>, RestError> {
        match self {
            Payload::Raw(bytes) => Ok(bytes.clone()),
            Payload::Json(value) => serde_json::to_vec(value).map_err(RestError::Encode),
            Payload::Empty => serde_json::to_vec(&Option::<&T>::None).map_err(RestError::Encode),
        }
    }
}
