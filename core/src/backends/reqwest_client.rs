//! Alternative transport: a pooled `reqwest::blocking` client.

use bytes::Bytes;

use crate::client::{send_with, Client, ClientConfig, PreparedRequest};
use crate::error::{Result, SendError};
use crate::request::Request;
use crate::response::{Response, ResponseMeta};

/// A [`Client`] backed by [`reqwest::blocking::Client`].
///
/// Must not be used from inside an async runtime; reqwest's blocking client
/// runs its own.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
    config: ClientConfig,
}

impl ReqwestClient {
    /// Fails with `TransportError` when reqwest cannot set up its client,
    /// e.g. the TLS backend does not initialise.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder().tcp_nodelay(true);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(SendError::transport)?;
        Ok(Self { client, config })
    }

    /// Use an existing [`reqwest::blocking::Client`] and its settings.
    pub fn from_client(client: reqwest::blocking::Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    fn execute(&self, prepared: &PreparedRequest) -> Result<(ResponseMeta, Bytes)> {
        let response = self
            .client
            .request(prepared.method.into(), &prepared.url)
            .headers(prepared.headers.clone())
            .body(prepared.body.clone())
            .send()
            .map_err(SendError::transport)?;

        let meta = ResponseMeta::new(
            response.status(),
            response.version(),
            response.headers().clone(),
        );
        let body = response.bytes().map_err(SendError::body_read)?;
        Ok((meta, body))
    }
}

impl Default for ReqwestClient {
    /// Panics where [`reqwest::blocking::Client::new`] does.
    fn default() -> Self {
        Self::from_client(reqwest::blocking::Client::new(), ClientConfig::default())
    }
}

impl Client for ReqwestClient {
    fn send(&self, request: &mut dyn Request, response: &mut dyn Response) -> Result<()> {
        send_with(&self.config, request, response, |prepared| self.execute(prepared))
    }

    fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
    }
}
