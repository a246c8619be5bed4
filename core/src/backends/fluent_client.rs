//! Fluent-builder backend: `ureq`'s chained `get`/`post` request API.
//!
//! Same agent settings as `UreqClient`, but every call is assembled through
//! `RequestBuilder` (`agent.post(url).header(..).send(body)`) instead of a
//! prebuilt `http::Request`. GET bodies go out through `force_send_body`.

use bytes::Bytes;
use http::HeaderMap;

use super::ureq_client::{build_agent, read_response};
use crate::client::{send_with, Client, ClientConfig, PreparedRequest};
use crate::error::{Result, SendError};
use crate::http::Method;
use crate::request::Request;
use crate::response::{Response, ResponseMeta};

/// A [`Client`] built on ureq's fluent request builder.
#[derive(Debug)]
pub struct FluentClient {
    agent: ureq::Agent,
    config: ClientConfig,
}

impl FluentClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            agent: build_agent(&config),
            config,
        }
    }

    fn execute(&self, prepared: &PreparedRequest) -> Result<(ResponseMeta, Bytes)> {
        let url = prepared.url.as_str();
        let result = match prepared.method {
            Method::Get => with_headers(self.agent.get(url), &prepared.headers)
                .force_send_body()
                .send(&prepared.body[..]),
            Method::Post => {
                with_headers(self.agent.post(url), &prepared.headers).send(&prepared.body[..])
            }
        };
        read_response(result.map_err(SendError::transport)?)
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &HeaderMap,
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name, value);
    }
    builder
}

impl Default for FluentClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl Client for FluentClient {
    fn send(&self, request: &mut dyn Request, response: &mut dyn Response) -> Result<()> {
        send_with(&self.config, request, response, |prepared| self.execute(prepared))
    }

    fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
    }
}
