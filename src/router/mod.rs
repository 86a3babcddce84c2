//! # Router Module
//!
//! Path matching and route resolution for Sprint, built on a method- and
//! path-segment trie.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Building the routing trie from the flattened route table
//! - Matching `(method, path)` to the registered handler
//! - Binding dynamic `:name` segments to parameter values
//!
//! ## Architecture
//!
//! 1. **Build**: at startup every route is inserted into a [`RouteTrie`].
//!    The root is keyed by method; each level below consumes one path
//!    segment. A node has any number of static children and at most one
//!    dynamic child.
//!
//! 2. **Resolve**: for each request the trie is walked segment by segment,
//!    preferring the static child and falling back to the dynamic child.
//!
//! After the build the trie is never mutated, so it is shared across
//! connection coroutines behind an `Arc` with no locking.
//!
//! ## Example
//!
//! ```rust
//! use sprint::dispatcher::{Request, Response};
//! use sprint::module::Route;
//! use sprint::router::RouteTrie;
//! use http::Method;
//!
//! let mut trie = RouteTrie::new();
//! trie.insert(&Route::new(Method::GET, "users/:id", |req: Request| {
//!     Response::text(req.param("id").unwrap_or_default().to_string())
//! }));
//!
//! let matched = trie.resolve(&Method::GET, "users/42").unwrap();
//! assert_eq!(matched.get_param("id"), Some("42"));
//! ```
//!
//! ## Performance
//!
//! Lookup is O(k) in the number of path segments and independent of the
//! number of registered routes. Parameters are kept in a `SmallVec`, so a
//! match with ≤8 bindings does not touch the heap for the container.

mod core;
mod trie;

pub use core::{ParamVec, RouteMatch, MAX_INLINE_PARAMS};
pub use trie::{InsertReport, NodeId, RouteTrie};
