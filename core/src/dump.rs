//! Debug dumps of outgoing requests and incoming responses.
//!
//! Dumps are rendered in HTTP/1.1 wire layout and emitted with
//! `tracing::debug!` on target `sendhttp::dump`. They only read the data
//! they are given.

use std::fmt::Write as _;

use bytes::Bytes;
use http::header::HOST;
use http::HeaderMap;
use tracing::debug;
use url::Url;

use crate::client::PreparedRequest;
use crate::response::ResponseMeta;

/// Render a request line, headers and body.
pub fn format_request(request: &PreparedRequest) -> String {
    let (target, host) = match Url::parse(&request.url) {
        Ok(url) => {
            let mut target = url.path().to_string();
            if let Some(query) = url.query() {
                target.push('?');
                target.push_str(query);
            }
            let host = match (url.host_str(), url.port()) {
                (Some(h), Some(p)) => format!("{h}:{p}"),
                (Some(h), None) => h.to_string(),
                _ => String::new(),
            };
            (target, host)
        }
        Err(_) => (request.url.clone(), String::new()),
    };

    let mut out = format!("{} {target} HTTP/1.1\r\n", request.method);
    if !host.is_empty() && !request.headers.contains_key(HOST) {
        let _ = write!(out, "Host: {host}\r\n");
    }
    write_headers(&mut out, &request.headers);
    out.push_str("\r\n");
    out.push_str(&String::from_utf8_lossy(&request.body));
    out
}

/// Render a status line, headers and body.
pub fn format_response(meta: &ResponseMeta, body: &Bytes) -> String {
    let mut out = format!("{} {}\r\n", meta.proto(), meta.status);
    write_headers(&mut out, &meta.headers);
    out.push_str("\r\n");
    out.push_str(&String::from_utf8_lossy(body));
    out
}

fn write_headers(out: &mut String, headers: &HeaderMap) {
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        let _ = write!(out, "{name}: {value}\r\n");
    }
}

pub(crate) fn log_request(request: &PreparedRequest) {
    debug!(target: "sendhttp::dump", "http request:\n{}", format_request(request));
}

pub(crate) fn log_response(meta: &ResponseMeta, body: &Bytes) {
    debug!(target: "sendhttp::dump", "http response:\n{}", format_response(meta, body));
}
