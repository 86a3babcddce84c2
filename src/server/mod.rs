//! # Server Module
//!
//! The HTTP/1.1 layer over raw TCP, served by `may` coroutines.
//!
//! Each accepted connection carries exactly one request:
//!
//! 1. [`framing`] reads one message off the stream
//! 2. [`request`] parses it into a [`crate::dispatcher::Request`]
//! 3. the [`crate::dispatcher::Dispatcher`] resolves and invokes the handler
//! 4. [`response`] serializes the result, which is written before the socket closes
//!
//! [`connection`] runs that pipeline; [`http_server`] accepts connections and
//! spawns one coroutine per connection.

pub mod connection;
pub mod error;
pub mod framing;
pub mod http_server;
pub mod request;
pub mod response;

pub use connection::ConnectionHandler;
pub use error::{FramingError, ParseError};
pub use framing::{FramedMessage, FramingMode, MessageReader};
pub use http_server::{HttpServer, Server, ServerHandle};
pub use request::{parse_raw, parse_request};
pub use response::{negotiate, render_content, serialize_response, serialize_response_at};
