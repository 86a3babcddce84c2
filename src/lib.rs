//! # Sprint
//!
//! **Sprint** is a small, embeddable HTTP/1.1 server core built on the `may`
//! coroutine runtime. Applications declare routes on controllers, group
//! controllers into modules, and Sprint serves them over raw TCP with one
//! coroutine per connection.
//!
//! ## Overview
//!
//! Sprint covers the whole path from socket to handler:
//! - a route trie keyed by method and path segment, with `:name` captures
//! - a hand-rolled HTTP/1.1 framer and request parser
//! - a dispatcher that binds path parameters and invokes the handler
//! - a serializer that negotiates the content type and writes default headers
//!
//! Each connection carries exactly one request and is closed after the
//! response (`Connection: close`).
//!
//! ## Architecture
//!
//! - **[`module`]** - routes, controllers, the module graph and the route table builder
//! - **[`router`]** - the route trie: arena-allocated, iterative insert and lookup
//! - **[`dispatcher`]** - `Request`/`Response`, the `Handler` capability, dispatch
//! - **[`server`]** - framing, parsing, serialization, connection acceptor
//! - **[`logger`]** - the explicit logging capability passed through the stack
//! - **[`logging`]** - `tracing-subscriber` set-up for the binary
//! - **[`runtime_config`]** - YAML and `SPRINT_*` environment configuration
//! - **[`cli`]** - the `sprint` command line
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Acceptor as HttpServer<br/>(accept coroutine)
//!     participant Conn as ConnectionHandler<br/>(per-connection coroutine)
//!     participant Trie as RouteTrie
//!     participant Handler
//!
//!     Client->>Acceptor: TCP connect
//!     Acceptor->>Conn: spawn coroutine
//!     Client->>Conn: GET /users/42 HTTP/1.1
//!     Conn->>Conn: frame + parse
//!     Conn->>Trie: resolve(GET, "users/42")
//!     Trie-->>Conn: handler, {id: "42"}
//!     Conn->>Handler: handle(request)
//!     Handler-->>Conn: Response
//!     Conn->>Conn: negotiate + serialize
//!     Conn-->>Client: HTTP/1.1 200 OK ... (close)
//! ```
//!
//! ### Failure behaviour
//!
//! Unknown routes, framing failures and parse failures all produce the empty
//! default response (`200 OK`, empty `text/plain` body). A panicking handler
//! is caught and answered with `500 Internal Server Error`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sprint::dispatcher::{Request, Response};
//! use sprint::logger::{Logger, TracingLogger};
//! use sprint::module::{BasicController, Controller, RouteTable};
//! use sprint::runtime_config::RuntimeConfig;
//! use sprint::server::Server;
//! use http::Method;
//! use std::sync::Arc;
//!
//! let hello = BasicController::new("HelloController", "/hello")
//!     .route(Method::GET, ":name", |req: Request| {
//!         Response::text(format!("hello {}", req.param("name").unwrap_or("you")))
//!     });
//!
//! let logger: Arc<dyn Logger> = Arc::new(TracingLogger);
//! let controllers: Vec<Arc<dyn Controller>> = vec![Arc::new(hello)];
//! let table = RouteTable::from_controllers(&controllers, logger.as_ref());
//!
//! Server::new(RuntimeConfig::from_env(), logger).run(&table).unwrap();
//! ```
//!
//! ## Runtime Considerations
//!
//! Sprint uses the `may` coroutine runtime, not tokio or async-std. This means:
//!
//! - Handlers run on the connection's coroutine and must not block the worker
//!   thread with std blocking primitives
//! - Coroutine stack size is configurable via `SPRINT_STACK_SIZE`
//! - The route trie is immutable once built and shared without locking

pub mod cli;
pub mod dispatcher;
pub mod echo;
pub mod ids;
pub mod logger;
pub mod logging;
pub mod module;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use dispatcher::{Body, ContentType, Dispatcher, Handler, Request, Response};
pub use module::{BasicController, Controller, Module, ModuleRegistry, Route, RouteTable};
pub use router::RouteTrie;
pub use server::{HttpServer, Server, ServerHandle};
