//! Request parser: framed head and body into a [`Request`].

use http::Method;
use std::collections::HashMap;

use super::error::ParseError;
use super::framing::FramedMessage;
use crate::dispatcher::{Body, ContentType, Request};
use crate::router::ParamVec;

/// Parse a framed message into a request.
///
/// The request line is `METHOD SP PATH SP PROTOCOL`; the path is split at the
/// first `?` and loses its leading `/`. Header lines are split on the first
/// `:` with both sides trimmed; lines without a `:` are ignored. The body is
/// interpreted by `Content-Type`:
///
/// - absent, `text/plain`, `text/html`: passed through as text
/// - `application/json`: decoded with `serde_json`
/// - anything else: [`ParseError::UnsupportedContentType`]
pub fn parse_request(message: &FramedMessage) -> Result<Request, ParseError> {
    if message.head.trim().is_empty() {
        return Err(ParseError::EmptyHead);
    }

    let mut lines = message.head.lines();
    let request_line = lines.next().unwrap_or_default();
    let tokens: Vec<&str> = request_line.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(ParseError::RequestLine(request_line.trim().to_string()));
    }

    let method: Method = tokens[0]
        .parse()
        .map_err(|_| ParseError::InvalidMethod(tokens[0].to_string()))?;

    let (raw_path, query) = match tokens[1].split_once('?') {
        Some((path, query)) => (path, query.split('&').map(str::to_string).collect()),
        None => (tokens[1], Vec::new()),
    };
    let path = raw_path.strip_prefix('/').unwrap_or(raw_path).to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect();

    let mut request = Request {
        method,
        path,
        protocol: tokens[2].to_string(),
        headers,
        query,
        params: ParamVec::new(),
        body: Body::None,
    };
    request.body = parse_body(&request, message.body.as_deref())?;
    Ok(request)
}

/// Legacy-normalise raw bytes and parse them
pub fn parse_raw(raw: &[u8]) -> Result<Request, ParseError> {
    parse_request(&FramedMessage::from_raw(raw))
}

fn parse_body(request: &Request, body: Option<&str>) -> Result<Body, ParseError> {
    let text = || body.map_or(Body::None, |b| Body::Text(b.to_string()));
    let Some(content_type) = request.header("Content-Type") else {
        return Ok(text());
    };
    match ContentType::from_media_type(content_type) {
        Some(ContentType::PlainText | ContentType::Html) => Ok(text()),
        Some(ContentType::Json) => Ok(Body::Json(serde_json::from_str(body.unwrap_or(""))?)),
        None => Err(ParseError::UnsupportedContentType(content_type.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn msg(head: &str, body: Option<&str>) -> FramedMessage {
        FramedMessage {
            head: head.to_string(),
            body: body.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_request_line_and_query() {
        let req = parse_request(&msg("GET /a/b?x=1&flag HTTP/1.1", None)).unwrap();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.path, "a/b");
        assert_eq!(req.protocol, "HTTP/1.1");
        assert_eq!(req.query, vec!["x=1".to_string(), "flag".to_string()]);
        assert_eq!(req.body, Body::None);
    }

    #[test]
    fn test_only_one_leading_slash_is_removed() {
        let req = parse_request(&msg("GET //a HTTP/1.1", None)).unwrap();
        assert_eq!(req.path, "/a");
    }

    #[test]
    fn test_headers_split_on_first_colon_and_skip_malformed() {
        let req = parse_request(&msg(
            "GET / HTTP/1.1\nHost: localhost:8000\nnot a header\nX-Empty:",
            None,
        ))
        .unwrap();
        assert_eq!(req.header("host"), Some("localhost:8000"));
        assert_eq!(req.header("X-Empty"), Some(""));
        assert_eq!(req.headers.len(), 2);
    }

    #[test]
    fn test_body_by_content_type() {
        let plain = parse_request(&msg("POST / HTTP/1.1", Some("raw text"))).unwrap();
        assert_eq!(plain.body, Body::Text("raw text".into()));

        let html = parse_request(&msg(
            "POST / HTTP/1.1\nContent-Type: text/html",
            Some("<p>x</p>"),
        ))
        .unwrap();
        assert_eq!(html.body, Body::Text("<p>x</p>".into()));

        let json_body = parse_request(&msg(
            "POST / HTTP/1.1\ncontent-type: application/json; charset=utf-8",
            Some(r#"{"a":[1,2]}"#),
        ))
        .unwrap();
        assert_eq!(json_body.body, Body::Json(json!({ "a": [1, 2] })));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_request(&msg("  ", None)),
            Err(ParseError::EmptyHead)
        ));
        assert!(matches!(
            parse_request(&msg("GET /", None)),
            Err(ParseError::RequestLine(line)) if line == "GET /"
        ));
        assert!(matches!(
            parse_request(&msg("G(T / HTTP/1.1", None)),
            Err(ParseError::InvalidMethod(m)) if m == "G(T"
        ));
        assert!(matches!(
            parse_request(&msg("POST / HTTP/1.1\nContent-Type: application/xml", Some("<a/>"))),
            Err(ParseError::UnsupportedContentType(ct)) if ct == "application/xml"
        ));
        assert!(matches!(
            parse_request(&msg("POST / HTTP/1.1\nContent-Type: application/json", Some("{"))),
            Err(ParseError::Json(_))
        ));
        assert!(matches!(
            parse_request(&msg("POST / HTTP/1.1\nContent-Type: application/json", None)),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn test_parse_raw_handles_crlf_and_nul_padding() {
        let req = parse_raw(b"PUT /items/3 HTTP/1.1\r\nAccept: */*\r\n\r\nbody\0\0").unwrap();
        assert_eq!(req.method, Method::PUT);
        assert_eq!(req.path, "items/3");
        assert_eq!(req.header("Accept"), Some("*/*"));
        assert_eq!(req.body, Body::Text("body".into()));
    }
}
