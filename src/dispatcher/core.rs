//! Dispatcher core module - the request/response model and handler invocation.

use crate::logger::Logger;
use crate::router::{ParamVec, RouteMatch, RouteTrie};
use http::Method;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Maximum inline response headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for responses.
///
/// Header names use `Arc<str>` because most of them are the same handful of
/// static strings; values are per-response data.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// The three media types the parser and serializer recognise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Html,
    Json,
    PlainText,
}

impl ContentType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Html => "text/html",
            ContentType::Json => "application/json",
            ContentType::PlainText => "text/plain",
        }
    }

    /// Classify a `Content-Type` header value by prefix, so parameters such
    /// as `; charset=utf-8` are tolerated. Returns `None` for anything else.
    #[must_use]
    pub fn from_media_type(value: &str) -> Option<Self> {
        let value = value.trim();
        [ContentType::PlainText, ContentType::Html, ContentType::Json]
            .into_iter()
            .find(|ct| {
                let prefix = ct.as_str();
                value.len() >= prefix.len()
                    && value.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
            })
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body after content-type interpretation
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Body {
    /// No blank line separated a body from the head
    #[default]
    None,
    /// Passed through verbatim (no `Content-Type`, `text/plain`, `text/html`)
    Text(String),
    /// Decoded from `application/json`
    Json(Value),
}

impl Body {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Convert into a JSON value: text becomes a JSON string, no body is `null`
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Body::None => Value::Null,
            Body::Text(s) => Value::String(s),
            Body::Json(v) => v,
        }
    }
}

/// A parsed HTTP request
///
/// Created per connection by the parser. The dispatcher fills `params` from
/// the trie descent before handing it to the handler by value.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Request path with the leading `/` and the query string removed
    pub path: String,
    /// Protocol token from the request line, e.g. `HTTP/1.1`
    pub protocol: String,
    /// Header names keep the case the client sent; use [`Request::header`]
    pub headers: HashMap<String, String>,
    /// Raw `&`-separated query tokens (`k=v` or bare flags), undecoded
    pub query: Vec<String>,
    /// Dynamic segment bindings, in path order
    pub params: ParamVec,
    pub body: Body,
}

impl Request {
    /// Build a request with no headers, query or body
    #[must_use]
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.trim_start_matches('/').to_string(),
            protocol: "HTTP/1.1".to_string(),
            headers: HashMap::new(),
            query: Vec::new(),
            params: ParamVec::new(),
            body: Body::None,
        }
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get a path parameter bound by a dynamic segment.
    ///
    /// Last write wins if the same name was bound at two depths.
    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert params to a HashMap (allocates)
    #[must_use]
    pub fn params_map(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// Value of the first `key=value` query token with this key
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.iter().find_map(|token| {
            let (k, v) = token.split_once('=')?;
            (k == key).then_some(v)
        })
    }

    /// Whether a bare flag token (no `=`) equal to `key` is present
    #[must_use]
    pub fn query_flag(&self, key: &str) -> bool {
        self.query.iter().any(|token| token == key)
    }
}

/// Response produced by a handler
///
/// Anything left unset here is filled in by the serializer: status 200/"OK",
/// and when `headers` is empty, the default header set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Response {
    /// Strings are written verbatim; any other value is rendered as JSON text.
    /// `Value::Null` renders as an empty body.
    pub content: Value,
    pub content_type: Option<ContentType>,
    pub status_code: Option<u16>,
    pub status_text: Option<String>,
    pub headers: HeaderVec,
}

impl Response {
    /// The empty default response: no content, every field left to defaults
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Value::String(content.into()),
            content_type: Some(ContentType::PlainText),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn html(content: impl Into<String>) -> Self {
        Self {
            content: Value::String(content.into()),
            content_type: Some(ContentType::Html),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn json(content: Value) -> Self {
        Self {
            content,
            content_type: Some(ContentType::Json),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_status(mut self, code: u16, text: impl Into<String>) -> Self {
        self.status_code = Some(code);
        self.status_text = Some(text.into());
        self
    }

    /// Add or replace a header (case-insensitive name match)
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value.into());
        self
    }

    /// Add or update a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    /// Get a header by name
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Request handling capability stored on routes and trie nodes
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, request: Request) -> Response;
}

impl<F> Handler for F
where
    F: Fn(Request) -> Response + Send + Sync + 'static,
{
    fn handle(&self, request: Request) -> Response {
        self(request)
    }
}

/// Shared, type-erased handler
pub type BoxedHandler = Arc<dyn Handler>;

/// Resolves a parsed request against the route trie and invokes the handler
///
/// The trie is built once and shared read-only, so a `Dispatcher` can be
/// cloned into every connection coroutine without locking.
#[derive(Clone)]
pub struct Dispatcher {
    trie: Arc<RouteTrie>,
    logger: Arc<dyn Logger>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(trie: RouteTrie, logger: Arc<dyn Logger>) -> Self {
        Self {
            trie: Arc::new(trie),
            logger,
        }
    }

    #[must_use]
    pub fn trie(&self) -> &RouteTrie {
        &self.trie
    }

    /// Dispatch a request to its handler.
    ///
    /// Unregistered method or path yields [`Response::empty`]; there is no
    /// distinction here between "not found" and "no content". A panicking
    /// handler is caught and turned into a 500 response.
    pub fn dispatch(&self, mut request: Request) -> Response {
        let Some(RouteMatch { handler, params }) =
            self.trie.resolve(&request.method, &request.path)
        else {
            self.logger.debug(
                "Dispatcher",
                &format!("No route for {} {{{{ {} }}}}", request.method, request.path),
            );
            return Response::empty();
        };

        request.params = params;
        let method = request.method.clone();
        let path = request.path.clone();

        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| handler.handle(request)))
        {
            Ok(response) => response,
            Err(panic) => {
                let panic_message = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                self.logger.error(
                    "Dispatcher",
                    &format!("Handler for {method} {{{{ {path} }}}} panicked: {panic_message}"),
                );
                Response::text("Internal Server Error").with_status(500, "Internal Server Error")
            }
        }
    }
}
