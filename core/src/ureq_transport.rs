//! `Transport` backed by a `ureq` agent.

use log::trace;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse, Transport};

/// Blocking transport over `ureq`.
///
/// Timeouts, TLS and proxy settings come from the wrapped `ureq::Agent`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Wrap a caller-configured agent.
    ///
    /// The agent should have `http_status_as_error(false)`; otherwise 4xx/5xx
    /// responses surface as transport errors instead of data.
    pub fn new(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self::new(agent)
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = ::http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        // An empty payload goes out with no body at all rather than a
        // zero-length one.
        let response = if request.body.is_empty() {
            self.agent.run(builder.body(()).map_err(TransportError::new)?)
        } else {
            self.agent
                .run(builder.body(request.body).map_err(TransportError::new)?)
        }
        .map_err(TransportError::new)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect::<Vec<_>>();
        trace!("ureq response {status} with {} headers", headers.len());

        Ok(HttpResponse {
            status,
            headers,
            body: Box::new(response.into_body().into_reader()),
        })
    }
}
