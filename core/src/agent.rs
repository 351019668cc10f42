//! Caller-owned bundle of a transport and a buffer pool.
//!
//! # Design
//! An `Agent` is created once and shared by reference; every `RestClient`
//! borrows it for the duration of one exchange. Nothing in the crate is
//! process-global, so two agents with different transports can coexist.

use std::collections::HashMap;
use std::fmt;

use crate::client::RestClient;
use crate::http::Transport;
use crate::payload::Payload;
use crate::pool::BufferPool;

/// Transport and buffer pool shared by every `RestClient` created from it.
pub struct Agent {
    transport: Box<dyn Transport>,
    pool: BufferPool,
}

impl Agent {
    /// Agent over `transport` with a default `BufferPool`.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::with_pool(transport, BufferPool::new())
    }

    pub fn with_pool(transport: impl Transport + 'static, pool: BufferPool) -> Self {
        Self {
            transport: Box::new(transport),
            pool,
        }
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    /// Shorthand for `RestClient::new(self, ...)`.
    pub fn request<P>(
        &self,
        url: impl Into<String>,
        method: impl Into<String>,
        param: Payload<P>,
        header: HashMap<String, String>,
    ) -> RestClient<'_, P> {
        RestClient::new(self, url, method, param, header)
    }
}

#[cfg(feature = "ureq")]
impl Default for Agent {
    fn default() -> Self {
        Self::new(crate::ureq_transport::UreqTransport::default())
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}
