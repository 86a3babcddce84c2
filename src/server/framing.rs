//! Message reader: assembles one HTTP message from a byte stream.
//!
//! Two modes are available:
//!
//! - [`FramingMode::ContentLength`] (default) reads until the header
//!   terminator (`\r\n\r\n`, or a bare `\n\n`), then reads exactly
//!   `Content-Length` body bytes.
//! - [`FramingMode::Legacy`] keeps the compatibility loop: read fixed-size
//!   zero-filled chunks until one ends in a zero byte, strip NUL and CR,
//!   split on the first blank line. It cannot detect boundaries on arbitrary
//!   TCP fragmentation nor bodies containing zero bytes.
//!
//! Both modes stop with [`FramingError::TooLarge`] past `max_bytes`.

use serde::Deserialize;
use std::io::{ErrorKind, Read};

use super::error::FramingError;
use crate::runtime_config::RuntimeConfig;

/// How message boundaries are detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FramingMode {
    #[default]
    ContentLength,
    Legacy,
}

impl FramingMode {
    /// Parse `content-length` or `legacy` (case-insensitive)
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "content-length" | "content_length" => Some(Self::ContentLength),
            "legacy" => Some(Self::Legacy),
            _ => None,
        }
    }
}

/// A framed message split into head and optional body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedMessage {
    /// Request line and header lines, `\n`-separated, no CR
    pub head: String,
    /// Everything after the first blank line; `None` if there was none
    pub body: Option<String>,
}

impl FramedMessage {
    /// Normalise raw bytes the legacy way: drop NUL and CR bytes, then split
    /// on the first `\n\n`.
    #[must_use]
    pub fn from_raw(raw: &[u8]) -> Self {
        let cleaned: Vec<u8> = raw
            .iter()
            .copied()
            .filter(|b| *b != 0 && *b != b'\r')
            .collect();
        let text = String::from_utf8_lossy(&cleaned);
        match text.split_once("\n\n") {
            Some((head, body)) => Self {
                head: head.to_string(),
                body: Some(body.to_string()),
            },
            None => Self {
                head: text.into_owned(),
                body: None,
            },
        }
    }
}

/// Reads one message per connection according to a [`FramingMode`]
#[derive(Debug, Clone, Copy)]
pub struct MessageReader {
    mode: FramingMode,
    chunk_size: usize,
    max_bytes: usize,
}

impl MessageReader {
    #[must_use]
    pub fn new(mode: FramingMode, chunk_size: usize, max_bytes: usize) -> Self {
        Self {
            mode,
            chunk_size: chunk_size.max(1),
            max_bytes,
        }
    }

    #[must_use]
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(
            config.framing,
            config.read_chunk_size,
            config.max_request_bytes,
        )
    }

    #[must_use]
    pub fn mode(&self) -> FramingMode {
        self.mode
    }

    pub fn read_message<R: Read>(&self, stream: &mut R) -> Result<FramedMessage, FramingError> {
        match self.mode {
            FramingMode::ContentLength => self.read_content_length(stream),
            FramingMode::Legacy => self.read_legacy(stream),
        }
    }

    fn read_legacy<R: Read>(&self, stream: &mut R) -> Result<FramedMessage, FramingError> {
        let mut buf = Vec::with_capacity(self.chunk_size);
        loop {
            let mut chunk = vec![0u8; self.chunk_size];
            let n = read_some(stream, &mut chunk)?;
            // A short read leaves the zero padding in place
            let done = chunk[self.chunk_size - 1] == 0;
            buf.extend_from_slice(&chunk[..n]);
            if buf.len() > self.max_bytes {
                return Err(FramingError::TooLarge {
                    limit: self.max_bytes,
                });
            }
            if done {
                break;
            }
        }
        if buf.is_empty() {
            return Err(FramingError::ConnectionClosed { received: 0 });
        }
        Ok(FramedMessage::from_raw(&buf))
    }

    fn read_content_length<R: Read>(&self, stream: &mut R) -> Result<FramedMessage, FramingError> {
        let mut buf: Vec<u8> = Vec::with_capacity(self.chunk_size);
        let mut chunk = vec![0u8; self.chunk_size];

        let mut scan_from = 0;
        let (head_end, body_start) = loop {
            if let Some(found) = find_head_terminator(&buf, scan_from) {
                break found;
            }
            if buf.len() > self.max_bytes {
                return Err(FramingError::TooLarge {
                    limit: self.max_bytes,
                });
            }
            let n = read_some(stream, &mut chunk)?;
            if n == 0 {
                return Err(FramingError::ConnectionClosed {
                    received: buf.len(),
                });
            }
            // A terminator may straddle the previous read
            scan_from = buf.len().saturating_sub(3);
            buf.extend_from_slice(&chunk[..n]);
        };

        let head = String::from_utf8_lossy(&buf[..head_end]).replace(['\r', '\0'], "");
        let content_length = content_length(&head)?;
        let total = body_start
            .checked_add(content_length)
            .filter(|total| *total <= self.max_bytes)
            .ok_or(FramingError::TooLarge {
                limit: self.max_bytes,
            })?;

        while buf.len() < total {
            let n = read_some(stream, &mut chunk)?;
            if n == 0 {
                return Err(FramingError::UnexpectedEof {
                    expected: content_length,
                    received: buf.len() - body_start,
                });
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let body = String::from_utf8_lossy(&buf[body_start..total]).into_owned();
        Ok(FramedMessage {
            head,
            body: Some(body),
        })
    }
}

fn read_some<R: Read>(stream: &mut R, chunk: &mut [u8]) -> Result<usize, FramingError> {
    loop {
        match stream.read(chunk) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(FramingError::Io(e)),
        }
    }
}

/// Position of the earliest blank line starting at or after `from`:
/// `(end of head, start of body)`
fn find_head_terminator(buf: &[u8], from: usize) -> Option<(usize, usize)> {
    let tail = buf.get(from..)?;
    let crlf = tail
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|i| (from + i, from + i + 4));
    let lf = tail
        .windows(2)
        .position(|w| w == b"\n\n")
        .map(|i| (from + i, from + i + 2));
    match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

/// `Content-Length` from the head's header lines, 0 when absent
fn content_length(head: &str) -> Result<usize, FramingError> {
    for line in head.lines().skip(1) {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case("content-length") {
            let value = value.trim();
            return value
                .parse()
                .map_err(|_| FramingError::InvalidContentLength(value.to_string()));
        }
    }
    Ok(0)
}
