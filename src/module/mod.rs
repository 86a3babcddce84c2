//! # Module Module
//!
//! Declarative registration: routes, controllers, modules, and the route
//! table builder that flattens them into the ordered list the trie consumes.
//!
//! ## Overview
//!
//! - [`Route`] - a `(method, path pattern, handler)` triple
//! - [`Controller`] - anything that reports a name and base path and
//!   supplies routes; [`BasicController`] is the ready-made one
//! - [`Module`] - controllers plus named imports/exports
//! - [`ModuleRegistry`] - the module graph, walked with cycle detection
//! - [`RouteTable`] - the flattened list with fully joined paths
//!
//! ## Example
//!
//! ```rust
//! use sprint::dispatcher::{Request, Response};
//! use sprint::logger::NoopLogger;
//! use sprint::module::{BasicController, Module, ModuleRegistry, RouteTable};
//! use http::Method;
//!
//! let users = BasicController::new("UsersController", "/users")
//!     .route(Method::GET, "/:id", |req: Request| {
//!         Response::text(req.param("id").unwrap_or_default().to_string())
//!     });
//!
//! let mut registry = ModuleRegistry::new();
//! registry.register(Module::new("app").import("users")).unwrap();
//! registry.register(Module::new("users").controller(users)).unwrap();
//!
//! let table = RouteTable::from_registry(&registry, "app", &NoopLogger).unwrap();
//! assert_eq!(table.routes()[0].path, "users/:id");
//! ```

mod core;
mod error;

pub use core::{
    is_supported_method, join_paths, BasicController, Controller, ControllerInfo, Module,
    ModuleRegistry, Route, RouteTable, SUPPORTED_METHODS,
};
pub use error::RouteTableError;
