//! Response model filled by a `Client` after a successful round trip.
//!
//! # Design
//! Transport metadata (`ResponseMeta`) and the raw body are recorded
//! separately from the decoded value. `fill` only copies metadata; the body
//! reaches the response through `decode` and `set_raw` after the backend
//! has drained the transport stream.

use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use http::{HeaderMap, StatusCode, Version};
use serde::de::{DeserializeOwned, IgnoredAny};

/// Status and header information of a response, without the body.
#[derive(Debug, Clone, Default)]
pub struct ResponseMeta {
    /// Status line, e.g. `200 OK`.
    pub status: String,
    pub status_code: StatusCode,
    pub version: Version,
    /// From the `Content-Length` header; `None` when absent or unparsable.
    pub content_length: Option<u64>,
    pub headers: HeaderMap,
}

impl ResponseMeta {
    pub fn new(status_code: StatusCode, version: Version, headers: HeaderMap) -> Self {
        let status = match status_code.canonical_reason() {
            Some(reason) => format!("{} {reason}", status_code.as_u16()),
            None => status_code.as_u16().to_string(),
        };
        let content_length = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        Self {
            status,
            status_code,
            version,
            content_length,
            headers,
        }
    }

    /// Protocol string, e.g. `HTTP/1.1`.
    pub fn proto(&self) -> &'static str {
        match self.version {
            Version::HTTP_09 => "HTTP/0.9",
            Version::HTTP_10 => "HTTP/1.0",
            Version::HTTP_2 => "HTTP/2.0",
            Version::HTTP_3 => "HTTP/3.0",
            _ => "HTTP/1.1",
        }
    }

    /// All values of header `name`, in received order.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }
}

/// Capability set every response handed to a `Client` provides.
pub trait Response {
    /// Decode the JSON body into the caller's structure.
    fn decode(&mut self, body: &[u8]) -> serde_json::Result<()>;

    /// Record transport metadata. Must not look at the body.
    fn fill(&mut self, meta: &ResponseMeta);

    /// Keep the exact undecoded body.
    fn set_raw(&mut self, raw: Bytes);

    fn raw(&self) -> &[u8];

    fn meta(&self) -> &ResponseMeta;
}

/// Metadata and raw body; decoding only checks that the body is JSON.
#[derive(Debug, Clone, Default)]
pub struct BaseResponse {
    meta: ResponseMeta,
    raw: Bytes,
}

impl BaseResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &str {
        &self.meta.status
    }

    pub fn status_code(&self) -> StatusCode {
        self.meta.status_code
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.meta.headers
    }
}

impl Response for BaseResponse {
    fn decode(&mut self, body: &[u8]) -> serde_json::Result<()> {
        serde_json::from_slice::<IgnoredAny>(body).map(|_| ())
    }

    fn fill(&mut self, meta: &ResponseMeta) {
        self.meta = meta.clone();
    }

    fn set_raw(&mut self, raw: Bytes) {
        self.raw = raw;
    }

    fn raw(&self) -> &[u8] {
        &self.raw
    }

    fn meta(&self) -> &ResponseMeta {
        &self.meta
    }
}

/// A response whose JSON body is decoded into `T`.
#[derive(Debug, Clone)]
pub struct JsonResponse<T> {
    base: BaseResponse,
    data: Option<T>,
}

impl<T> JsonResponse<T> {
    pub fn new() -> Self {
        Self {
            base: BaseResponse::new(),
            data: None,
        }
    }

    /// The decoded body, once a send has succeeded.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn base(&self) -> &BaseResponse {
        &self.base
    }
}

impl<T> Default for JsonResponse<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> Response for JsonResponse<T> {
    fn decode(&mut self, body: &[u8]) -> serde_json::Result<()> {
        self.data = Some(serde_json::from_slice(body)?);
        Ok(())
    }

    fn fill(&mut self, meta: &ResponseMeta) {
        self.base.fill(meta);
    }

    fn set_raw(&mut self, raw: Bytes) {
        self.base.set_raw(raw);
    }

    fn raw(&self) -> &[u8] {
        self.base.raw()
    }

    fn meta(&self) -> &ResponseMeta {
        self.base.meta()
    }
}
