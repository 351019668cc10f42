//! One HTTP exchange: assemble, execute, buffer, decode.
//!
//! # Design
//! `RestClient` is write-once-then-read. Its inputs are fixed by `new`; the
//! response fields are written once by a successful `execute`. The first
//! failure is stored in `error` and turns every later `execute` or
//! `parse_response_body` into a no-op, so a chain of calls can be checked
//! once at the end.

use std::collections::HashMap;
use std::io::Read;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::agent::Agent;
use crate::error::{RestError, TransportError};
use crate::http::HttpRequest;
use crate::payload::Payload;

/// `Content-Type` sent unless the caller supplies one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json;charset=utf-8";

/// A single request/response exchange driven through an `Agent`.
///
/// Create one per request with `new`, then chain `execute` and
/// `parse_response_body`. Check `error` once at the end.
#[derive(Debug)]
pub struct RestClient<'a, P = serde_json::Value> {
    agent: &'a Agent,

    url: String,
    method: String,
    param: Payload<P>,
    header: HashMap<String, String>,

    response_status: u16,
    response_headers: HashMap<String, Vec<String>>,
    response_body: Vec<u8>,

    error: Option<RestError>,
}

impl<'a, P> RestClient<'a, P> {
    /// Store the request inputs. Performs no validation and no I/O.
    ///
    /// An empty `method` is sent as `GET`.
    pub fn new(
        agent: &'a Agent,
        url: impl Into<String>,
        method: impl Into<String>,
        param: Payload<P>,
        header: HashMap<String, String>,
    ) -> Self {
        Self {
            agent,
            url: url.into(),
            method: method.into(),
            param,
            header,
            response_status: 0,
            response_headers: HashMap::new(),
            response_body: Vec::new(),
            error: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn param(&self) -> &Payload<P> {
        &self.param
    }

    pub fn header(&self) -> &HashMap<String, String> {
        &self.header
    }

    /// Status code of the response; `0` until `execute` succeeds.
    pub fn response_status(&self) -> u16 {
        self.response_status
    }

    /// Response headers keyed by lowercased name, values in arrival order.
    pub fn response_headers(&self) -> &HashMap<String, Vec<String>> {
        &self.response_headers
    }

    /// First value of response header `name`, compared case-insensitively.
    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.response_headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn response_body(&self) -> &[u8] {
        &self.response_body
    }

    pub fn error(&self) -> Option<&RestError> {
        self.error.as_ref()
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Consume the client, yielding the response body or the latched error.
    pub fn into_result(self) -> Result<Vec<u8>, RestError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.response_body),
        }
    }

    /// Decode the response body as JSON into `receiver`.
    ///
    /// No-op if an error is already latched. A decode failure latches
    /// `RestError::Decode` and leaves `receiver` untouched.
    pub fn parse_response_body<R: DeserializeOwned>(&mut self, receiver: &mut R) {
        if self.error.is_some() {
            return;
        }
        match serde_json::from_slice(&self.response_body) {
            Ok(value) => *receiver = value,
            Err(err) => self.fail(RestError::Decode(err)),
        }
    }

    fn fail(&mut self, err: RestError) {
        warn!("{} {} failed: {err}", self.method, self.url);
        self.error = Some(err);
    }
}

impl<'a, P: Serialize> RestClient<'a, P> {
    /// Send the request and buffer the whole response.
    ///
    /// No-op if an error is already latched. On failure no response field is
    /// written.
    pub fn execute(&mut self) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        if let Err(err) = self.try_execute() {
            self.fail(err);
        }
        self
    }

    fn try_execute(&mut self) -> Result<(), RestError> {
        let agent = self.agent;
        let request = self.assemble_request()?;
        debug!("sending {} {} ({} bytes)", request.method, request.url, request.body.len());

        let mut response = agent.transport().send(request)?;

        let mut buffer = agent.pool().acquire();
        response
            .body
            .read_to_end(&mut buffer)
            .map_err(TransportError::from)?;

        self.response_body = buffer.to_vec();
        self.response_status = response.status;
        self.response_headers = group_headers(response.headers);
        debug!(
            "{} {} -> {} ({} bytes)",
            self.method,
            self.url,
            self.response_status,
            self.response_body.len()
        );
        Ok(())
    }

    fn assemble_request(&self) -> Result<HttpRequest, RestError> {
        let body = self.param.encode()?;

        let method = if self.method.is_empty() {
            "GET"
        } else {
            self.method.as_str()
        };
        ::http::Method::from_bytes(method.as_bytes())
            .map_err(|_| RestError::InvalidRequest(format!("invalid method {method:?}")))?;
        ::url::Url::parse(&self.url)
            .map_err(|e| RestError::InvalidRequest(format!("invalid url {:?}: {e}", self.url)))?;

        let mut headers = vec![("Content-Type".to_string(), DEFAULT_CONTENT_TYPE.to_string())];
        let mut overlay: Vec<_> = self.header.iter().collect();
        overlay.sort();
        for (name, value) in overlay {
            headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }

        Ok(HttpRequest {
            method: method.to_string(),
            url: self.url.clone(),
            headers,
            body,
        })
    }
}

fn group_headers(pairs: Vec<(String, String)>) -> HashMap<String, Vec<String>> {
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
    for (name, value) in pairs {
        grouped
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value);
    }
    grouped
}
