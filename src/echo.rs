//! Demo application served by the `sprint` binary and used by the tests.
//!
//! `AppModule` (ping and echo controllers) imports `UsersModule`.

use http::Method;
use serde_json::json;

use crate::dispatcher::{Request, Response};
use crate::logger::Logger;
use crate::module::{BasicController, Module, ModuleRegistry, RouteTable, RouteTableError};

pub const ROOT_MODULE: &str = "AppModule";

pub fn ping_handler(_req: Request) -> Response {
    Response::text("pong")
}

/// Echoes back everything the parser and dispatcher produced
pub fn echo_handler(req: Request) -> Response {
    Response::json(json!({
        "method": req.method.to_string(),
        "path": req.path,
        "params": req.params_map(),
        "query": req.query,
        "body": req.body.into_value(),
    }))
}

fn user_handler(req: Request) -> Response {
    Response::json(json!({ "id": req.param("id") }))
}

fn admin_handler(_req: Request) -> Response {
    Response::json(json!({ "id": "admin", "admin": true }))
}

fn users_module() -> Module {
    let users = BasicController::new("UsersController", "/users")
        .route(Method::GET, "admin", admin_handler)
        .route(Method::GET, ":id", user_handler)
        .route(Method::GET, ":id/posts/:post", echo_handler);
    Module::new("UsersModule")
        .controller(users)
        .export("UsersModule")
}

fn app_module() -> Module {
    let ping = BasicController::new("PingController", "/").route(Method::GET, "ping", ping_handler);
    let echo = BasicController::new("EchoController", "/echo")
        .route(Method::POST, "", echo_handler)
        .route(Method::PUT, ":key", echo_handler);
    Module::new(ROOT_MODULE)
        .import("UsersModule")
        .controller(ping)
        .controller(echo)
}

pub fn registry() -> Result<ModuleRegistry, RouteTableError> {
    let mut registry = ModuleRegistry::new();
    registry.register(app_module())?;
    registry.register(users_module())?;
    Ok(registry)
}

/// The demo route table, flattened from [`ROOT_MODULE`]
pub fn route_table(logger: &dyn Logger) -> Result<RouteTable, RouteTableError> {
    RouteTable::from_registry(&registry()?, ROOT_MODULE, logger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{Body, Dispatcher};
    use crate::logger::NoopLogger;
    use crate::router::RouteTrie;
    use std::sync::Arc;

    fn dispatcher() -> Dispatcher {
        let table = route_table(&NoopLogger).unwrap();
        Dispatcher::new(RouteTrie::build(table.routes(), &NoopLogger), Arc::new(NoopLogger))
    }

    #[test]
    fn test_route_table_order_and_paths() {
        let table = route_table(&NoopLogger).unwrap();
        let paths: Vec<String> = table
            .routes()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect();
        assert_eq!(
            paths,
            vec![
                "GET ping",
                "POST echo",
                "PUT echo/:key",
                "GET users/admin",
                "GET users/:id",
                "GET users/:id/posts/:post",
            ]
        );
    }

    #[test]
    fn test_demo_routes_dispatch() {
        let d = dispatcher();
        assert_eq!(d.dispatch(Request::new(Method::GET, "ping")).content, json!("pong"));
        assert_eq!(
            d.dispatch(Request::new(Method::GET, "users/admin")).content,
            json!({ "id": "admin", "admin": true })
        );
        assert_eq!(
            d.dispatch(Request::new(Method::GET, "users/9")).content,
            json!({ "id": "9" })
        );
    }

    #[test]
    fn test_echo_reflects_request() {
        let d = dispatcher();
        let mut req = Request::new(Method::PUT, "echo/k1");
        req.query = vec!["a=1".into()];
        req.body = Body::Text("hi".into());
        assert_eq!(
            d.dispatch(req).content,
            json!({
                "method": "PUT",
                "path": "echo/k1",
                "params": { "key": "k1" },
                "query": ["a=1"],
                "body": "hi",
            })
        );
    }
}
