//! Test server for exercising HTTP clients.
//!
//! Routes:
//! - `/` answers every GET/POST with [`GREETING`] followed by a newline.
//! - `/echo` describes the request it received as an [`Echo`].
//! - `/multipart` parses a multipart/form-data body into a [`MultipartEcho`].
//! - `/text` answers with a body that is not JSON.
//! - `/status/{code}` answers with the given status and a small JSON body.
//! - `/delay/{ms}` waits `ms` milliseconds (at most [`MAX_DELAY_MS`]), then
//!   answers like `/`.

use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Multipart, Path, RawQuery},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

pub const GREETING: &str = r#"{"msg": "Hello, World"}"#;

pub const MAX_DELAY_MS: u64 = 10_000;

/// What `/echo` saw.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub user_agent: Option<String>,
    pub body: String,
}

/// One part of a multipart body as `/multipart` parsed it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipartEcho {
    pub parts: Vec<EchoPart>,
}

pub fn app() -> Router {
    Router::new()
        .route("/", get(greeting).post(greeting))
        .route("/echo", any(echo))
        .route("/multipart", post(multipart))
        .route("/text", get(text).post(text))
        .route("/status/{code}", any(status))
        .route("/delay/{ms}", any(delay))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn greeting() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        format!("{GREETING}\n"),
    )
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn echo(
    method: Method,
    uri: Uri,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Echo> {
    tracing::debug!(%method, %uri, bytes = body.len(), "echo");
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query,
        content_type: header_string(&headers, header::CONTENT_TYPE),
        user_agent: header_string(&headers, header::USER_AGENT),
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn multipart(mut form: Multipart) -> Result<Json<MultipartEcho>, (StatusCode, String)> {
    let bad_request = |e: axum::extract::multipart::MultipartError| {
        (StatusCode::BAD_REQUEST, e.to_string())
    };

    let mut parts = Vec::new();
    while let Some(field) = form.next_field().await.map_err(bad_request)? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(bad_request)?;
        parts.push(EchoPart {
            name,
            file_name,
            content_type,
            text: String::from_utf8_lossy(&data).into_owned(),
        });
    }
    Ok(Json(MultipartEcho { parts }))
}

async fn text() -> &'static str {
    "plain text, not json"
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, Json<serde_json::Value>), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, Json(serde_json::json!({ "code": code }))))
}

async fn delay(Path(ms): Path<u64>) -> impl IntoResponse {
    tokio::time::sleep(Duration::from_millis(ms.min(MAX_DELAY_MS))).await;
    greeting().await
}
