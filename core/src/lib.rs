//! Chainable JSON-over-HTTP client.
//!
//! # Overview
//! `RestClient` describes one request (URL, method, payload, headers),
//! executes it through an `Agent`, buffers the response body and decodes it
//! into a caller-supplied value:
//!
//! ```no_run
//! use std::collections::HashMap;
//! use rest_core::{Agent, Payload, RestClient};
//!
//! #[derive(serde::Deserialize, Default)]
//! struct Created { id: i64 }
//!
//! let agent = Agent::default();
//! let mut created = Created::default();
//! let mut client = RestClient::new(
//!     &agent,
//!     "https://example.test/items",
//!     "POST",
//!     Payload::json(serde_json::json!({ "name": "x" })),
//!     HashMap::new(),
//! );
//! client.execute().parse_response_body(&mut created);
//! assert!(client.error().is_none());
//! ```
//!
//! # Design
//! - Failures latch into a sticky error on the `RestClient`; once set, every
//!   later step is a no-op.
//! - The `Agent` owns the `Transport` and the `BufferPool`; callers create
//!   it, there is no global client.
//! - `Transport` is the I/O seam. `UreqTransport` (feature `ureq`, on by
//!   default) is the stock implementation; tests substitute in-memory ones.

pub mod agent;
pub mod client;
pub mod error;
pub mod http;
pub mod payload;
pub mod pool;
#[cfg(feature = "ureq")]
pub mod ureq_transport;

pub use agent::Agent;
pub use client::{RestClient, DEFAULT_CONTENT_TYPE};
pub use error::{RestError, TransportError};
pub use http::{HttpRequest, HttpResponse, Transport};
pub use payload::Payload;
pub use pool::{BufferPool, PooledBuffer};
#[cfg(feature = "ureq")]
pub use ureq_transport::UreqTransport;
