//! Wire body construction, selected by the request's Content-Type.
//!
//! - `application/x-www-form-urlencoded`: the form params, query-encoded.
//! - `multipart/form-data`: the multipart parts in insertion order. The
//!   request's Content-Type is rewritten to carry the generated boundary.
//! - anything else: `Request::json_body`.

use std::io;

use bytes::Bytes;
use uuid::Uuid;

use crate::error::{Result, SendError};
use crate::http::{encode_query, CONTENT_TYPE, CONTENT_TYPE_MULTIPART};
use crate::request::{MultipartPart, Request};

/// Build the body for `request`.
///
/// Multipart parts are drained from the request.
pub fn build_body(request: &mut dyn Request) -> Result<Bytes> {
    if request.is_content_type_form() {
        return Ok(Bytes::from(encode_query(request.form_params())));
    }

    if request.is_content_type_multipart() {
        let mut writer = MultipartWriter::new();
        for part in request.take_multipart() {
            writer.write_part(part)?;
        }
        request.set_header(CONTENT_TYPE, &writer.content_type());
        return Ok(writer.finish());
    }

    request
        .json_body()
        .map(Bytes::from)
        .map_err(SendError::SerializationError)
}

/// Streams multipart/form-data parts into an in-memory buffer.
#[derive(Debug)]
pub struct MultipartWriter {
    boundary: String,
    buf: Vec<u8>,
}

impl MultipartWriter {
    pub fn new() -> Self {
        Self::with_boundary(Uuid::new_v4().simple().to_string())
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            buf: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Content-Type header value including the boundary.
    pub fn content_type(&self) -> String {
        format!("{CONTENT_TYPE_MULTIPART}; boundary={}", self.boundary)
    }

    pub fn write_part(&mut self, mut part: MultipartPart) -> Result<()> {
        if part.field_name.is_empty() {
            return Err(SendError::MultipartEncodingError(
                "part has no field name".to_string(),
            ));
        }
        check_header_safe(&part.field_name)?;

        if !self.buf.is_empty() {
            self.buf.extend_from_slice(b"\r\n");
        }
        self.buf
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());

        let name = escape_quotes(&part.field_name);
        match part.file_name.as_deref().filter(|f| !f.is_empty()) {
            Some(file_name) => {
                check_header_safe(file_name)?;
                let file_name = escape_quotes(file_name);
                self.buf.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
            }
            None => {
                self.buf.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
            }
        }

        io::copy(&mut part.value, &mut self.buf).map_err(|e| {
            SendError::MultipartEncodingError(format!(
                "reading value of part {:?}: {e}",
                part.field_name
            ))
        })?;
        Ok(())
    }

    /// Write the closing boundary and return the body.
    pub fn finish(mut self) -> Bytes {
        if !self.buf.is_empty() {
            self.buf.extend_from_slice(b"\r\n");
        }
        self.buf
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        Bytes::from(self.buf)
    }
}

impl Default for MultipartWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn check_header_safe(s: &str) -> Result<()> {
    if s.contains(['\r', '\n']) {
        return Err(SendError::MultipartEncodingError(format!(
            "line break in part header value {s:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use serde::Serialize;

    use super::*;
    use crate::http::{CONTENT_TYPE_FORM, CONTENT_TYPE_JSON};
    use crate::request::{BaseRequest, JsonRequest};

    #[derive(Serialize)]
    struct Greeting {
        msg: String,
        count: u32,
    }

    #[test]
    fn default_body_is_payload_json() {
        let mut req = JsonRequest::new(Greeting {
            msg: "hi".to_string(),
            count: 2,
        });
        let body = build_body(&mut req).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, serde_json::json!({"msg": "hi", "count": 2}));
    }

    #[test]
    fn explicit_json_content_type_uses_payload() {
        let mut req = JsonRequest::new(Greeting {
            msg: "x".to_string(),
            count: 0,
        });
        req.set_header(CONTENT_TYPE, CONTENT_TYPE_JSON);
        let body = build_body(&mut req).unwrap();
        assert_eq!(&body[..], br#"{"msg":"x","count":0}"#);
    }

    #[test]
    fn form_body_round_trips_non_empty_params() {
        let mut req = BaseRequest::new();
        req.set_header(CONTENT_TYPE, CONTENT_TYPE_FORM);
        req.set_form_params([("a", "hello world"), ("b", "100:200"), ("skip", "")]);

        let body = build_body(&mut req).unwrap();
        let parsed: std::collections::BTreeMap<String, String> =
            url::form_urlencoded::parse(&body).into_owned().collect();

        let mut expected = req.form_params().clone();
        expected.remove("skip");
        assert_eq!(parsed, expected);
    }

    #[test]
    fn multipart_body_writes_fields_and_files() {
        let mut req = BaseRequest::new();
        req.set_header(CONTENT_TYPE, CONTENT_TYPE_MULTIPART);
        req.add_multipart("key1", "file1.txt", Cursor::new(b"file contents".to_vec()));
        req.add_multipart("key2", "", Cursor::new(b"hello world".to_vec()));

        let body = build_body(&mut req).unwrap();
        let content_type = req.header(CONTENT_TYPE).unwrap().to_string();
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();
        assert!(!boundary.is_empty());
        assert!(req.is_content_type_multipart());
        assert!(req.multipart().is_empty());

        let text = String::from_utf8(body.to_vec()).unwrap();
        let expected = format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"key1\"; filename=\"file1.txt\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             file contents\r\n\
             --{b}\r\n\
             Content-Disposition: form-data; name=\"key2\"\r\n\r\n\
             hello world\r\n\
             --{b}--\r\n",
            b = boundary
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn empty_multipart_is_only_closing_boundary() {
        let writer = MultipartWriter::with_boundary("xyz");
        assert_eq!(&writer.finish()[..], b"--xyz--\r\n");
    }

    #[test]
    fn multipart_escapes_quotes_in_names() {
        let mut writer = MultipartWriter::with_boundary("b");
        writer
            .write_part(MultipartPart {
                field_name: "a\"b".to_string(),
                file_name: None,
                value: Box::new(std::io::empty()),
            })
            .unwrap();
        let text = String::from_utf8(writer.finish().to_vec()).unwrap();
        assert!(text.contains(r#"name="a\"b""#), "{text}");
    }

    #[test]
    fn multipart_rejects_missing_field_name() {
        let mut req = BaseRequest::new();
        req.set_header(CONTENT_TYPE, CONTENT_TYPE_MULTIPART);
        req.add_multipart("", "", std::io::empty());
        let err = build_body(&mut req).unwrap_err();
        assert!(matches!(err, SendError::MultipartEncodingError(_)));
    }

    #[test]
    fn multipart_rejects_line_breaks_in_file_name() {
        let mut writer = MultipartWriter::with_boundary("b");
        let err = writer
            .write_part(MultipartPart {
                field_name: "f".to_string(),
                file_name: Some("evil\r\nX-Injected: 1".to_string()),
                value: Box::new(std::io::empty()),
            })
            .unwrap_err();
        assert!(matches!(err, SendError::MultipartEncodingError(_)));
    }

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk gone"))
        }
    }

    #[test]
    fn multipart_read_failure_is_encoding_error() {
        let mut req = BaseRequest::new();
        req.set_header(CONTENT_TYPE, CONTENT_TYPE_MULTIPART);
        req.add_multipart("upload", "data.bin", BrokenReader);
        let err = build_body(&mut req).unwrap_err();
        match err {
            SendError::MultipartEncodingError(msg) => assert!(msg.contains("disk gone"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refusing to serialize"))
        }
    }

    #[test]
    fn json_failure_is_serialization_error() {
        let mut req = JsonRequest::new(Unserializable);
        let err = build_body(&mut req).unwrap_err();
        assert!(matches!(err, SendError::SerializationError(_)));
    }
}
