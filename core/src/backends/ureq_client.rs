//! Standard blocking backend: a `ureq` agent driven by `http::Request`.

use std::io::Read as _;

use bytes::Bytes;

use crate::client::{send_with, Client, ClientConfig, PreparedRequest};
use crate::error::{Result, SendError};
use crate::request::Request;
use crate::response::{Response, ResponseMeta};

/// A [`Client`] backed by a [`ureq::Agent`].
#[derive(Debug)]
pub struct UreqClient {
    agent: ureq::Agent,
    config: ClientConfig,
}

impl UreqClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            agent: build_agent(&config),
            config,
        }
    }

    fn execute(&self, prepared: &PreparedRequest) -> Result<(ResponseMeta, Bytes)> {
        let mut builder = http::Request::builder()
            .method(http::Method::from(prepared.method))
            .uri(&prepared.url);
        for (name, value) in &prepared.headers {
            builder = builder.header(name, value);
        }

        // `Agent::run` sends whatever body the request carries, GET included.
        let req = builder
            .body(prepared.body.to_vec())
            .map_err(|e| SendError::InvalidRequestError(e.to_string()))?;
        let response = self.agent.run(req).map_err(SendError::transport)?;

        read_response(response)
    }
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl Client for UreqClient {
    fn send(&self, request: &mut dyn Request, response: &mut dyn Response) -> Result<()> {
        send_with(&self.config, request, response, |prepared| self.execute(prepared))
    }

    fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
    }
}

/// Agent that hands every status code back as data.
pub(crate) fn build_agent(config: &ClientConfig) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(config.timeout())
        .http_status_as_error(false)
        .build()
        .new_agent()
}

/// Drain the body once and split off the metadata.
pub(crate) fn read_response(
    response: http::Response<ureq::Body>,
) -> Result<(ResponseMeta, Bytes)> {
    let (parts, body) = response.into_parts();

    let mut body_bytes = Vec::new();
    body.into_reader()
        .read_to_end(&mut body_bytes)
        .map_err(SendError::body_read)?;

    let meta = ResponseMeta::new(parts.status, parts.version, parts.headers);
    Ok((meta, Bytes::from(body_bytes)))
}
