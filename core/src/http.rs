//! Plain HTTP vocabulary shared by requests, the body builder and backends.
//!
//! # Design
//! `Method` and `Scheme` are closed enums. Parsing never fails: anything
//! that is not recognised falls back to `GET` and `https` respectively, so a
//! request always carries a usable value once a setter has been called.

use std::fmt;

use url::form_urlencoded;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_MULTIPART: &str = "multipart/form-data";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    /// Case-insensitive; unrecognised names map to `Get`.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("POST") {
            Method::Post
        } else {
            Method::Get
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for http::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => http::Method::GET,
            Method::Post => http::Method::POST,
        }
    }
}

/// URL scheme for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    /// Case-insensitive; anything other than `http` maps to `Https`.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("http") {
            Scheme::Http
        } else {
            Scheme::Https
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encode `pairs` as `application/x-www-form-urlencoded`.
///
/// Pairs with an empty value are dropped. The rest are sorted by key; the
/// sort is stable, so a key given several times keeps its value order.
/// Only the RFC 3986 unreserved set stays literal: `~` is kept and `*` is
/// escaped as `%2A`, unlike the WHATWG form encoding.
pub fn encode_query<I, K, V>(pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs: Vec<(K, V)> = pairs
        .into_iter()
        .filter(|(_, v)| !v.as_ref().is_empty())
        .collect();
    pairs.sort_by(|a, b| a.0.as_ref().cmp(b.0.as_ref()));

    let mut out = String::new();
    for (k, v) in &pairs {
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(&escape(k.as_ref()));
        out.push('=');
        out.push_str(&escape(v.as_ref()));
    }
    out
}

fn escape(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes())
        .collect::<String>()
        .replace('*', "%2A")
        .replace("%7E", "~")
}

/// Media type of a `Content-Type` value, without parameters, lowercased.
pub(crate) fn media_type(value: &str) -> String {
    value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
