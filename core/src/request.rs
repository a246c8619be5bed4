//! Outbound request model.
//!
//! # Design
//! `Request` is a capability set with default methods operating on a
//! `BaseRequest` reached through `base()` / `base_mut()`. A caller type
//! embeds a `BaseRequest`, implements the two accessors, and overrides
//! `json_body` when it carries a payload. `JsonRequest<T>` does exactly that
//! for any serde payload.
//!
//! Requests are plain mutable values: no interior synchronisation, consumed
//! once per `Client::send`.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Result, SendError};
use crate::http::{
    encode_query, media_type, Method, Scheme, CONTENT_TYPE, CONTENT_TYPE_FORM, CONTENT_TYPE_JSON,
    CONTENT_TYPE_MULTIPART,
};
use crate::params::{ParamWriter, ToParams};

/// One field or file segment of a multipart/form-data body.
pub struct MultipartPart {
    pub field_name: String,
    /// `None` or empty for a plain field.
    pub file_name: Option<String>,
    pub value: Box<dyn Read + Send>,
}

impl MultipartPart {
    pub fn is_file(&self) -> bool {
        self.file_name.as_deref().is_some_and(|name| !name.is_empty())
    }
}

impl fmt::Debug for MultipartPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultipartPart")
            .field("field_name", &self.field_name)
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

/// Request state shared by every `Request` implementation.
#[derive(Debug)]
pub struct BaseRequest {
    method: Option<Method>,
    scheme: Option<Scheme>,
    domain: String,
    path: String,
    params: BTreeMap<String, String>,
    form_params: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
    multipart: Vec<MultipartPart>,
}

impl BaseRequest {
    pub fn new() -> Self {
        Self {
            method: None,
            scheme: None,
            domain: String::new(),
            path: "/".to_string(),
            params: BTreeMap::new(),
            form_params: BTreeMap::new(),
            headers: BTreeMap::new(),
            multipart: Vec::new(),
        }
    }
}

impl Default for BaseRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Capability set every request handed to a `Client` provides.
pub trait Request {
    fn base(&self) -> &BaseRequest;

    fn base_mut(&mut self) -> &mut BaseRequest;

    /// Body used when the content type is neither form nor multipart.
    fn json_body(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&serde_json::Map::new())
    }

    fn method(&self) -> Option<Method> {
        self.base().method
    }

    fn scheme(&self) -> Option<Scheme> {
        self.base().scheme
    }

    fn domain(&self) -> &str {
        &self.base().domain
    }

    fn path(&self) -> &str {
        &self.base().path
    }

    fn params(&self) -> &BTreeMap<String, String> {
        &self.base().params
    }

    fn form_params(&self) -> &BTreeMap<String, String> {
        &self.base().form_params
    }

    fn headers(&self) -> &BTreeMap<String, String> {
        &self.base().headers
    }

    /// Header value, matching the name case-insensitively.
    fn header(&self, name: &str) -> Option<&str> {
        self.base()
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    fn multipart(&self) -> &[MultipartPart] {
        &self.base().multipart
    }

    /// Remove and return the multipart parts, leaving none behind.
    fn take_multipart(&mut self) -> Vec<MultipartPart> {
        std::mem::take(&mut self.base_mut().multipart)
    }

    /// `scheme://domain/path`, plus `?query` when a non-empty param exists.
    fn url(&self) -> String {
        let base = self.base();
        let scheme = base.scheme.map(Scheme::as_str).unwrap_or_default();
        let mut url = format!("{scheme}://{}", base.domain);
        if !base.path.starts_with('/') {
            url.push('/');
        }
        url.push_str(&base.path);

        let query = encode_query(&base.params);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        url
    }

    fn set_method(&mut self, method: &str) {
        self.base_mut().method = Some(Method::from_name(method));
    }

    fn set_scheme(&mut self, scheme: &str) {
        let parsed = Scheme::from_name(scheme);
        if parsed == Scheme::Https && !scheme.is_empty() && !scheme.eq_ignore_ascii_case("https") {
            warn!(scheme, "unrecognised scheme, using https");
        }
        self.base_mut().scheme = Some(parsed);
    }

    fn set_domain(&mut self, domain: &str) {
        self.base_mut().domain = domain.to_string();
    }

    fn set_path(&mut self, path: &str) {
        self.base_mut().path = path.to_string();
    }

    /// Split `url` into scheme, domain and path, merging its query pairs into
    /// the params. A URL that does not parse leaves the request unchanged.
    fn set_url(&mut self, url: &str) {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(url, %err, "ignoring unparsable url");
                return;
            }
        };
        let Some(host) = parsed.host_str() else {
            debug!(url, "ignoring url without host");
            return;
        };
        let domain = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        self.set_scheme(parsed.scheme());
        let base = self.base_mut();
        base.domain = domain;
        base.path = parsed.path().to_string();
        base.params.extend(parsed.query_pairs().into_owned());
    }

    fn set_param(&mut self, key: &str, value: &str) {
        self.base_mut()
            .params
            .insert(key.to_string(), value.to_string());
    }

    fn set_form_param(&mut self, key: &str, value: &str) {
        self.base_mut()
            .form_params
            .insert(key.to_string(), value.to_string());
    }

    /// Set a header, replacing any existing header of the same name in
    /// whatever case it was stored.
    fn set_header(&mut self, name: &str, value: &str) {
        let headers = &mut self.base_mut().headers;
        headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
        headers.insert(name.to_string(), value.to_string());
    }

    fn set_params<I, K, V>(&mut self, params: I)
    where
        Self: Sized,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.base_mut()
            .params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    fn set_form_params<I, K, V>(&mut self, params: I)
    where
        Self: Sized,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.base_mut()
            .form_params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    fn set_headers<I, K, V>(&mut self, headers: I)
    where
        Self: Sized,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (k, v) in headers {
            self.set_header(k.as_ref(), v.as_ref());
        }
    }

    /// Append a multipart part. An empty `file_name` makes it a plain field.
    fn add_multipart<R>(&mut self, field_name: &str, file_name: &str, value: R)
    where
        Self: Sized,
        R: Read + Send + 'static,
    {
        let file_name = (!file_name.is_empty()).then(|| file_name.to_string());
        self.base_mut().multipart.push(MultipartPart {
            field_name: field_name.to_string(),
            file_name,
            value: Box::new(value),
        });
    }

    /// Flatten `source` into the query params.
    fn construct_params<P>(&mut self, source: &P)
    where
        Self: Sized,
        P: ToParams + ?Sized,
    {
        let mut writer = ParamWriter::new(&mut self.base_mut().params);
        source.write_params(&mut writer);
    }

    /// Fails on the first missing field among method, scheme, domain, path.
    fn check_valid(&self) -> Result<()> {
        let base = self.base();
        if base.method.is_none() {
            return Err(SendError::InvalidRequestError("no method set".to_string()));
        }
        if base.scheme.is_none() {
            return Err(SendError::InvalidRequestError("no scheme set".to_string()));
        }
        if base.domain.is_empty() {
            return Err(SendError::InvalidRequestError("no domain set".to_string()));
        }
        if base.path.is_empty() {
            return Err(SendError::InvalidRequestError("no path set".to_string()));
        }
        Ok(())
    }

    fn is_content_type_form(&self) -> bool {
        content_type_is(self.header(CONTENT_TYPE), CONTENT_TYPE_FORM)
    }

    fn is_content_type_json(&self) -> bool {
        content_type_is(self.header(CONTENT_TYPE), CONTENT_TYPE_JSON)
    }

    fn is_content_type_multipart(&self) -> bool {
        content_type_is(self.header(CONTENT_TYPE), CONTENT_TYPE_MULTIPART)
    }
}

fn content_type_is(value: Option<&str>, expected: &str) -> bool {
    value.is_some_and(|v| media_type(v) == expected)
}

impl Request for BaseRequest {
    fn base(&self) -> &BaseRequest {
        self
    }

    fn base_mut(&mut self) -> &mut BaseRequest {
        self
    }
}

/// A request whose JSON body is a typed serde payload.
#[derive(Debug)]
pub struct JsonRequest<T> {
    base: BaseRequest,
    pub payload: T,
}

impl<T: Serialize> JsonRequest<T> {
    pub fn new(payload: T) -> Self {
        Self {
            base: BaseRequest::new(),
            payload,
        }
    }
}

impl<T: Serialize> Request for JsonRequest<T> {
    fn base(&self) -> &BaseRequest {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseRequest {
        &mut self.base
    }

    fn json_body(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.payload)
    }
}
