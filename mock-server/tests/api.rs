use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Echo, MultipartEcho, GREETING};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str, content_type: Option<&str>, body: &str) -> Request<String> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(http::header::CONTENT_TYPE, content_type);
    }
    builder.body(body.to_string()).unwrap()
}

// --- greeting ---

#[tokio::test]
async fn greeting_has_trailing_newline() {
    let resp = app()
        .oneshot(request("GET", "/", None, ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[http::header::CONTENT_TYPE],
        "application/json"
    );
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], format!("{GREETING}\n").as_bytes());
}

#[tokio::test]
async fn greeting_answers_post() {
    let resp = app()
        .oneshot(request("POST", "/", Some("application/json"), "{}"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// --- echo ---

#[tokio::test]
async fn echo_reports_form_body_and_query() {
    let resp = app()
        .oneshot(request(
            "POST",
            "/echo?limit=10&offset=20",
            Some("application/x-www-form-urlencoded"),
            "a=hello&b=100",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.path, "/echo");
    assert_eq!(echo.query.as_deref(), Some("limit=10&offset=20"));
    assert_eq!(
        echo.content_type.as_deref(),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(echo.body, "a=hello&b=100");
}

#[tokio::test]
async fn echo_without_query_or_body() {
    let resp = app()
        .oneshot(request("GET", "/echo", None, ""))
        .await
        .unwrap();
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "GET");
    assert!(echo.query.is_none());
    assert!(echo.content_type.is_none());
    assert!(echo.body.is_empty());
}

// --- multipart ---

#[tokio::test]
async fn multipart_lists_fields_and_files() {
    let body = "--XYZ\r\n\
                Content-Disposition: form-data; name=\"key1\"; filename=\"file1.txt\"\r\n\
                Content-Type: application/octet-stream\r\n\r\n\
                file body\r\n\
                --XYZ\r\n\
                Content-Disposition: form-data; name=\"key2\"\r\n\r\n\
                hello world\r\n\
                --XYZ--\r\n";
    let resp = app()
        .oneshot(request(
            "POST",
            "/multipart",
            Some("multipart/form-data; boundary=XYZ"),
            body,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: MultipartEcho = body_json(resp).await;
    assert_eq!(echo.parts.len(), 2);
    assert_eq!(echo.parts[0].name, "key1");
    assert_eq!(echo.parts[0].file_name.as_deref(), Some("file1.txt"));
    assert_eq!(echo.parts[0].text, "file body");
    assert_eq!(echo.parts[1].name, "key2");
    assert!(echo.parts[1].file_name.is_none());
    assert_eq!(echo.parts[1].text, "hello world");
}

#[tokio::test]
async fn multipart_without_boundary_is_rejected() {
    let resp = app()
        .oneshot(request("POST", "/multipart", Some("multipart/form-data"), ""))
        .await
        .unwrap();
    assert!(resp.status().is_client_error());
}

// --- text / status ---

#[tokio::test]
async fn text_is_not_json() {
    let resp = app()
        .oneshot(request("GET", "/text", None, ""))
        .await
        .unwrap();
    let body = body_bytes(resp).await;
    assert!(serde_json::from_slice::<serde_json::Value>(&body).is_err());
}

#[tokio::test]
async fn status_route_returns_requested_code() {
    let resp = app()
        .oneshot(request("GET", "/status/503", None, ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let value: serde_json::Value = body_json(resp).await;
    assert_eq!(value["code"], 503);
}

#[tokio::test]
async fn status_route_rejects_invalid_code() {
    let resp = app()
        .oneshot(request("GET", "/status/42", None, ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- delay ---

#[tokio::test]
async fn delay_waits_then_greets() {
    let started = tokio::time::Instant::now();
    let resp = app()
        .oneshot(request("GET", "/delay/50", None, ""))
        .await
        .unwrap();
    assert!(started.elapsed() >= std::time::Duration::from_millis(50));
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], format!("{GREETING}\n").as_bytes());
}
