//! # Dispatcher Module
//!
//! Turns a parsed [`Request`] into a [`Response`] by walking the route trie
//! and invoking the matched [`Handler`].
//!
//! ## Overview
//!
//! - Resolves `(method, path)` against the read-only [`crate::router::RouteTrie`]
//! - Binds captured dynamic segments into `request.params`
//! - Invokes the handler synchronously on the calling coroutine
//! - Returns the empty default response when nothing matches
//! - Catches handler panics and answers `500 Internal Server Error`
//!
//! ## Handlers
//!
//! Any `Fn(Request) -> Response + Send + Sync` is a handler; so is any type
//! implementing [`Handler`] directly:
//!
//! ```rust
//! use sprint::dispatcher::{Handler, Request, Response};
//!
//! struct Greeter {
//!     greeting: String,
//! }
//!
//! impl Handler for Greeter {
//!     fn handle(&self, req: Request) -> Response {
//!         let name = req.param("name").unwrap_or("world");
//!         Response::text(format!("{}, {}!", self.greeting, name))
//!     }
//! }
//! ```
//!
//! ## Request Flow
//!
//! 1. Connection coroutine parses the request
//! 2. `Dispatcher::dispatch` resolves it in the trie
//! 3. The handler runs and returns a `Response`
//! 4. The serializer fills in defaults and writes the bytes

mod core;

pub use core::{
    Body, BoxedHandler, ContentType, Dispatcher, Handler, HeaderVec, Request, Response,
    MAX_INLINE_HEADERS,
};
