//! Pluggable HTTP client core.
//!
//! # Overview
//! A caller describes a call with a `Request` (method, scheme, domain, path,
//! params, headers, and a JSON, form or multipart body), hands it to any
//! `Client` together with a blank `Response`, and gets the response decoded
//! into its own structure.
//!
//! # Design
//! - `Request` / `Response` are traits over embeddable base structs
//!   (`BaseRequest`, `BaseResponse`); `JsonRequest<T>` and
//!   `JsonResponse<T>` cover the common typed case.
//! - The body format follows the request's Content-Type header.
//! - Validation, body building and decoding are shared; a backend only
//!   executes the call. Backends: `UreqClient` (standard blocking),
//!   `ReqwestClient` (pooled alternative transport), `FluentClient`
//!   (fluent request builder).
//! - Clients are plain values built by the caller; there is no global
//!   client and no retry.

pub mod backends;
pub mod body;
pub mod client;
pub mod dump;
pub mod error;
pub mod http;
pub mod params;
pub mod request;
pub mod response;

#[cfg(feature = "ureq-client")]
pub use backends::{FluentClient, UreqClient};
#[cfg(feature = "reqwest-client")]
pub use backends::ReqwestClient;
pub use body::{build_body, MultipartWriter};
pub use client::{decode_response, Client, ClientConfig, PreparedRequest};
pub use error::{BoxError, Result, SendError};
pub use crate::http::{encode_query, Method, Scheme};
pub use params::{ParamValue, ParamWriter, ToParams};
pub use request::{BaseRequest, JsonRequest, MultipartPart, Request};
pub use response::{BaseResponse, JsonResponse, Response, ResponseMeta};
