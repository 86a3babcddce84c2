//! Response serializer: content negotiation, default headers and wire bytes.
//!
//! The wire format is LF-only: `PROTOCOL SP CODE SP TEXT\n`, the header lines
//! joined by `\n`, then `\n\n` and the rendered content.

use serde_json::Value;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::SystemTime;

use crate::dispatcher::{ContentType, HeaderVec, Response};

pub const DEFAULT_PROTOCOL: &str = "HTTP/1.1";

/// Pick the media type to send.
///
/// The handler's type wins only when the `Accept` header lists it exactly or
/// contains `*/*`. Tokens are trimmed and `;q=` style parameters ignored.
/// Everything else, including a missing `Accept`, falls back to `text/plain`.
#[must_use]
pub fn negotiate(requested: Option<ContentType>, accept: Option<&str>) -> ContentType {
    match (requested, accept) {
        (Some(ct), Some(accept)) if accepts(accept, ct) => ct,
        _ => ContentType::PlainText,
    }
}

fn accepts(accept: &str, ct: ContentType) -> bool {
    accept
        .split(',')
        .map(|token| token.split(';').next().unwrap_or_default().trim())
        .any(|token| token == "*/*" || token.eq_ignore_ascii_case(ct.as_str()))
}

/// Strings go out verbatim, `null` as nothing, anything else as JSON text
#[must_use]
pub fn render_content(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `Content-Type`, `Content-Length` (in bytes), `Connection: close` and `Date`
#[must_use]
pub fn default_headers(content: &str, content_type: ContentType, now: SystemTime) -> HeaderVec {
    let mut headers = HeaderVec::new();
    headers.push((Arc::from("Content-Type"), content_type.as_str().to_string()));
    headers.push((Arc::from("Content-Length"), content.len().to_string()));
    headers.push((Arc::from("Connection"), "close".to_string()));
    headers.push((Arc::from("Date"), httpdate::fmt_http_date(now)));
    headers
}

/// Serialize with the current time for the `Date` header
#[must_use]
pub fn serialize_response(response: Response, protocol: &str, accept: Option<&str>) -> Vec<u8> {
    serialize_response_at(response, protocol, accept, SystemTime::now())
}

/// Serialize a response to wire bytes.
///
/// Unset fields get defaults: status 200 with its reason phrase, the
/// negotiated content type, and the default header set when the handler
/// supplied no headers at all. Handler headers are sent as given. An empty
/// `protocol` becomes `HTTP/1.1`.
#[must_use]
pub fn serialize_response_at(
    response: Response,
    protocol: &str,
    accept: Option<&str>,
    now: SystemTime,
) -> Vec<u8> {
    let protocol = if protocol.is_empty() {
        DEFAULT_PROTOCOL
    } else {
        protocol
    };
    let status_code = response.status_code.unwrap_or(200);
    let status_text = response.status_text.unwrap_or_else(|| "OK".to_string());
    let content_type = negotiate(response.content_type, accept);
    let content = render_content(&response.content);
    let headers = if response.headers.is_empty() {
        default_headers(&content, content_type, now)
    } else {
        response.headers
    };

    let header_block = headers
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect::<Vec<_>>()
        .join("\n");

    let mut out = Vec::with_capacity(64 + header_block.len() + content.len());
    out.extend_from_slice(format!("{} {} {}\n", protocol, status_code, status_text).as_bytes());
    out.extend_from_slice(header_block.as_bytes());
    out.extend_from_slice(b"\n\n");
    out.extend_from_slice(content.as_bytes());
    out
}

/// Write serialized bytes in full and flush
pub fn write_response<W: Write>(stream: &mut W, bytes: &[u8]) -> io::Result<()> {
    stream.write_all(bytes)?;
    stream.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::{Duration, UNIX_EPOCH};

    fn fixed_now() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(784_111_777)
    }

    fn wire(response: Response, protocol: &str, accept: Option<&str>) -> String {
        String::from_utf8(serialize_response_at(response, protocol, accept, fixed_now())).unwrap()
    }

    #[test]
    fn test_negotiate() {
        let json = Some(ContentType::Json);
        assert_eq!(negotiate(json, Some("*/*")), ContentType::Json);
        assert_eq!(negotiate(json, Some("text/html, application/json;q=0.9")), ContentType::Json);
        assert_eq!(negotiate(json, Some("text/html")), ContentType::PlainText);
        assert_eq!(negotiate(json, None), ContentType::PlainText);
        assert_eq!(negotiate(None, Some("*/*")), ContentType::PlainText);
    }

    #[test]
    fn test_render_content() {
        assert_eq!(render_content(&json!("pong")), "pong");
        assert_eq!(render_content(&Value::Null), "");
        assert_eq!(render_content(&json!({ "a": 1 })), r#"{"a":1}"#);
        assert_eq!(render_content(&json!(3)), "3");
    }

    #[test]
    fn test_serialize_text_with_defaults() {
        let out = wire(Response::text("pong"), "HTTP/1.1", Some("*/*"));
        assert_eq!(
            out,
            "HTTP/1.1 200 OK\n\
             Content-Type: text/plain\n\
             Content-Length: 4\n\
             Connection: close\n\
             Date: Sun, 06 Nov 1994 08:49:37 GMT\n\
             \n\
             pong"
        );
    }

    #[test]
    fn test_serialize_json_content_length_is_bytes() {
        let out = wire(Response::json(json!({ "name": "Zoë" })), "HTTP/1.1", Some("application/json"));
        let (head, body) = out.split_once("\n\n").unwrap();
        assert_eq!(body, r#"{"name":"Zoë"}"#);
        assert!(head.contains("Content-Type: application/json"));
        assert!(head.contains(&format!("Content-Length: {}", body.len())));
    }

    #[test]
    fn test_serialize_empty_response() {
        let out = wire(Response::empty(), "", None);
        assert!(out.starts_with("HTTP/1.1 200 OK\nContent-Type: text/plain\nContent-Length: 0\n"));
        assert!(out.ends_with("\n\n"));
    }

    #[test]
    fn test_handler_headers_replace_defaults() {
        let response = Response::text("gone")
            .with_status(404, "Not Here")
            .with_header("X-Custom", "1");
        let out = wire(response, "HTTP/1.0", Some("*/*"));
        assert_eq!(out, "HTTP/1.0 404 Not Here\nX-Custom: 1\n\ngone");
    }

    #[test]
    fn test_status_text_defaults_to_ok_whatever_the_code() {
        let created = Response {
            status_code: Some(201),
            ..Response::text("made")
        };
        assert!(wire(created, "HTTP/1.1", None).starts_with("HTTP/1.1 201 OK\n"));

        let missing = Response {
            status_code: Some(404),
            ..Response::text("x")
        };
        assert!(wire(missing, "HTTP/1.1", Some("*/*")).starts_with("HTTP/1.1 404 OK\n"));
    }
}
