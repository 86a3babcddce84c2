//! Route table and trie tests through the public API
//!
//! Builds controllers and modules the way an application would, flattens
//! them into a route table and checks what the trie resolves.

use http::Method;
use sprint::dispatcher::{Request, Response};
use sprint::logger::{LogLevel, MemoryLogger, NoopLogger};
use sprint::module::{BasicController, Controller, Module, ModuleRegistry, RouteTable, RouteTableError};
use sprint::router::RouteTrie;
use std::sync::Arc;

fn named(name: &'static str) -> impl Fn(Request) -> Response + Send + Sync + 'static {
    move |_req: Request| Response::text(name)
}

fn handler_name(trie: &RouteTrie, method: Method, path: &str) -> Option<String> {
    let matched = trie.resolve(&method, path)?;
    let response = matched.handler.handle(Request::new(method, path));
    response.content.as_str().map(str::to_string)
}

fn zoo_registry() -> ModuleRegistry {
    let animals = BasicController::new("AnimalsController", "/zoo/animals/")
        .route(Method::GET, "/", named("get_animals"))
        .route(Method::POST, "", named("create_animal"))
        .route(Method::GET, ":id", named("get_animal"))
        .route(Method::PUT, ":id", named("update_animal"))
        .route(Method::GET, ":id/toys/:toy_id", named("animal_toy"));
    let habitats = BasicController::new("HabitatsController", "zoo")
        .route(Method::GET, ":category/animals/:id/habitats/:habitat_id", named("habitat"));
    let health = BasicController::new("HealthController", "/")
        .route(Method::GET, "zoo/health", named("health_check"))
        .route(Method::HEAD, "zoo/health", named("health_head"));

    let mut registry = ModuleRegistry::new();
    registry
        .register(Module::new("ZooModule").import("HabitatModule").controller(animals))
        .unwrap();
    registry
        .register(Module::new("HabitatModule").import("HealthModule").controller(habitats))
        .unwrap();
    registry
        .register(Module::new("HealthModule").controller(health))
        .unwrap();
    registry
}

#[test]
fn test_module_graph_to_trie() {
    let table = RouteTable::from_registry(&zoo_registry(), "ZooModule", &NoopLogger).unwrap();
    let trie = RouteTrie::build(table.routes(), &NoopLogger);

    assert_eq!(trie.len(), 7);
    assert_eq!(handler_name(&trie, Method::GET, "zoo/animals").unwrap(), "get_animals");
    assert_eq!(handler_name(&trie, Method::POST, "zoo/animals").unwrap(), "create_animal");
    assert_eq!(handler_name(&trie, Method::GET, "zoo/animals/5").unwrap(), "get_animal");
    assert_eq!(handler_name(&trie, Method::PUT, "zoo/animals/5").unwrap(), "update_animal");
    assert_eq!(handler_name(&trie, Method::GET, "zoo/health").unwrap(), "health_check");

    let matched = trie
        .resolve(&Method::GET, "zoo/cats/animals/9/habitats/3")
        .unwrap();
    assert_eq!(matched.get_param("category"), Some("cats"));
    assert_eq!(matched.get_param("id"), Some("9"));
    assert_eq!(matched.get_param("habitat_id"), Some("3"));
}

#[test]
fn test_unsupported_method_is_skipped_with_warning() {
    let logger = MemoryLogger::new();
    let table = RouteTable::from_registry(&zoo_registry(), "ZooModule", &logger).unwrap();
    assert!(table.routes().iter().all(|r| r.method != Method::HEAD));
    assert_eq!(logger.find(LogLevel::Warn, "ControllerResolver").len(), 1);

    let trie = RouteTrie::build(table.routes(), &NoopLogger);
    assert!(trie.resolve(&Method::HEAD, "zoo/health").is_none());
}

#[test]
fn test_controllers_are_logged_in_flatten_order() {
    let logger = MemoryLogger::new();
    RouteTable::from_registry(&zoo_registry(), "ZooModule", &logger).unwrap();
    let lines: Vec<String> = logger
        .find(LogLevel::Log, "ControllerResolver")
        .into_iter()
        .map(|e| e.message)
        .collect();
    assert_eq!(
        lines,
        vec![
            "AnimalsController | /zoo/animals/",
            "HabitatsController | zoo",
            "HealthController | /",
        ]
    );
}

#[test]
fn test_patterns_lists_every_route() {
    let table = RouteTable::from_registry(&zoo_registry(), "ZooModule", &NoopLogger).unwrap();
    let trie = RouteTrie::build(table.routes(), &NoopLogger);
    let patterns = trie.patterns();
    assert_eq!(patterns.len(), 7);
    assert!(patterns.contains(&("GET".to_string(), "/zoo/animals/:id/toys/:toy_id".to_string())));
    assert!(patterns.contains(&("POST".to_string(), "/zoo/animals".to_string())));
}

#[test]
fn test_later_dynamic_label_overwrites_earlier() {
    let controllers: Vec<Arc<dyn Controller>> = vec![Arc::new(
        BasicController::new("Items", "items")
            .route(Method::GET, ":id", named("by_id"))
            .route(Method::GET, ":slug/details", named("details")),
    )];
    let logger = MemoryLogger::new();
    let table = RouteTable::from_controllers(&controllers, &NoopLogger);
    let trie = RouteTrie::build(table.routes(), &logger);

    assert!(!logger.find(LogLevel::Warn, "ViewResolver").is_empty());
    assert_eq!(trie.len(), 1);
    // The `:id` subtree (and its handler) was replaced by `:slug`
    assert!(trie.resolve(&Method::GET, "items/7").is_none());
    let matched = trie.resolve(&Method::GET, "items/7/details").unwrap();
    assert_eq!(matched.get_param("slug"), Some("7"));
    assert_eq!(matched.get_param("id"), None);
}

#[test]
fn test_import_cycle_is_rejected() {
    let mut registry = ModuleRegistry::new();
    registry.register(Module::new("a").import("b")).unwrap();
    registry.register(Module::new("b").import("c")).unwrap();
    registry.register(Module::new("c").import("a")).unwrap();

    match RouteTable::from_registry(&registry, "a", &NoopLogger) {
        Err(RouteTableError::ModuleCycle(path)) => assert_eq!(path, vec!["a", "b", "c", "a"]),
        other => panic!("expected a cycle, got {other:?}"),
    }
}
