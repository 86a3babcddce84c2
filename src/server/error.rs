use std::fmt;
use std::io;

/// Failure to assemble a complete HTTP message off the connection
#[derive(Debug)]
pub enum FramingError {
    /// The socket read failed (includes read timeouts)
    Io(io::Error),
    /// The peer closed the connection before a complete head arrived
    ConnectionClosed {
        /// Bytes received before the close
        received: usize,
    },
    /// The peer closed the connection before `Content-Length` body bytes arrived
    UnexpectedEof { expected: usize, received: usize },
    /// The message grew past the configured `max_request_bytes`
    TooLarge { limit: usize },
    /// `Content-Length` was present but not a non-negative integer
    InvalidContentLength(String),
}

impl fmt::Display for FramingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramingError::Io(e) => write!(f, "framing error: read failed: {}", e),
            FramingError::ConnectionClosed { received } => write!(
                f,
                "framing error: connection closed after {} bytes, before the end of the head",
                received
            ),
            FramingError::UnexpectedEof { expected, received } => write!(
                f,
                "framing error: body truncated, expected {} bytes, received {}",
                expected, received
            ),
            FramingError::TooLarge { limit } => {
                write!(f, "framing error: request exceeds {} bytes", limit)
            }
            FramingError::InvalidContentLength(value) => {
                write!(f, "framing error: invalid Content-Length '{}'", value)
            }
        }
    }
}

impl std::error::Error for FramingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FramingError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for FramingError {
    fn from(e: io::Error) -> Self {
        FramingError::Io(e)
    }
}

/// Failure to turn a framed message into a [`crate::dispatcher::Request`]
#[derive(Debug)]
pub enum ParseError {
    /// Nothing but whitespace before the first blank line
    EmptyHead,
    /// The request line has fewer than three whitespace-separated tokens
    RequestLine(String),
    /// The method token is not a valid HTTP method
    InvalidMethod(String),
    /// `Content-Type` is none of `text/plain`, `text/html`, `application/json`
    UnsupportedContentType(String),
    /// `Content-Type: application/json` with a body that fails to decode
    Json(serde_json::Error),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::EmptyHead => write!(f, "parse error: empty HTTP head"),
            ParseError::RequestLine(line) => {
                write!(f, "parse error: invalid HTTP request line '{}'", line)
            }
            ParseError::InvalidMethod(method) => {
                write!(f, "parse error: invalid HTTP method '{}'", method)
            }
            ParseError::UnsupportedContentType(ct) => {
                write!(f, "ContentTypeException: unsupported Content-Type '{}'", ct)
            }
            ParseError::Json(e) => write!(f, "parse error: invalid JSON body: {}", e),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        ParseError::Json(e)
    }
}
