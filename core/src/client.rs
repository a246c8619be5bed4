//! The `Client` contract shared by every backend.
//!
//! # Design
//! A send is split into three backend-independent steps around the one
//! backend-specific step:
//! 1. `PreparedRequest::prepare` validates the request, builds the body and
//!    converts the headers;
//! 2. the backend executes the call and drains the response body;
//! 3. `decode_response` decodes the body, fills the metadata and stores the
//!    raw bytes.
//!
//! `send_with` strings these together, along with the optional debug dumps,
//! so each backend only supplies step 2. No step retries.

use std::time::Duration;

use bytes::Bytes;
use http::header::USER_AGENT;
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::body::build_body;
use crate::dump;
use crate::error::{Result, SendError};
use crate::http::Method;
use crate::request::Request;
use crate::response::{Response, ResponseMeta};

/// A client sends a request and fills the given response.
///
/// Everything about the call (method, scheme, domain, path, params, body)
/// comes from the `Request`; the client holds only transport settings.
pub trait Client {
    fn send(&self, request: &mut dyn Request, response: &mut dyn Response) -> Result<()>;

    /// Dump outgoing requests and incoming responses through `tracing`.
    fn set_debug(&mut self, debug: bool);
}

/// Transport settings shared by all backends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClientConfig {
    /// Whole-call timeout. `None` leaves the backend default in place.
    pub timeout_ms: Option<u64>,
    /// Sent as `User-Agent` unless the request sets its own.
    pub user_agent: Option<String>,
    pub debug: bool,
}

impl ClientConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// A validated request with its body built and headers converted.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl PreparedRequest {
    pub fn prepare(request: &mut dyn Request, config: &ClientConfig) -> Result<Self> {
        request.check_valid()?;
        let body = build_body(request)?;

        let method = request
            .method()
            .ok_or_else(|| SendError::InvalidRequestError("no method set".to_string()))?;

        let mut headers = HeaderMap::new();
        for (name, value) in request.headers() {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                SendError::InvalidRequestError(format!("bad header name {name:?}: {e}"))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                SendError::InvalidRequestError(format!("bad value for header {name:?}: {e}"))
            })?;
            headers.insert(header_name, header_value);
        }
        if let Some(agent) = &config.user_agent {
            if !headers.contains_key(USER_AGENT) {
                let value = HeaderValue::from_str(agent).map_err(|e| {
                    SendError::InvalidRequestError(format!("bad user agent {agent:?}: {e}"))
                })?;
                headers.insert(USER_AGENT, value);
            }
        }

        Ok(Self {
            method,
            url: request.url(),
            headers,
            body,
        })
    }
}

/// Decode `body` into `response`, then record `meta` and the raw bytes.
pub fn decode_response(meta: ResponseMeta, body: Bytes, response: &mut dyn Response) -> Result<()> {
    response
        .decode(&body)
        .map_err(|source| SendError::DecodeError {
            body: String::from_utf8_lossy(&body).into_owned(),
            source,
        })?;
    response.fill(&meta);
    response.set_raw(body);
    Ok(())
}

/// Run one send: prepare, execute through `execute`, decode.
pub(crate) fn send_with<F>(
    config: &ClientConfig,
    request: &mut dyn Request,
    response: &mut dyn Response,
    execute: F,
) -> Result<()>
where
    F: FnOnce(&PreparedRequest) -> Result<(ResponseMeta, Bytes)>,
{
    let prepared = PreparedRequest::prepare(request, config)?;
    debug!(method = %prepared.method, url = %prepared.url, "sending request");
    if config.debug {
        dump::log_request(&prepared);
    }

    let (meta, body) = execute(&prepared)?;
    debug!(status = %meta.status, bytes = body.len(), "received response");
    if config.debug {
        dump::log_response(&meta, &body);
    }

    decode_response(meta, body, response)
}
