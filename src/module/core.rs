use super::error::RouteTableError;
use crate::dispatcher::{BoxedHandler, Handler};
use crate::logger::Logger;
use http::Method;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Methods the route trie accepts; anything else is skipped at build time
pub const SUPPORTED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
];

#[must_use]
pub fn is_supported_method(method: &Method) -> bool {
    SUPPORTED_METHODS.contains(method)
}

/// Join path fragments with single slashes.
///
/// Leading, trailing and repeated slashes are collapsed and empty fragments
/// dropped, so `join_paths(&["/api/", "//users/:id/"])` is `api/users/:id`.
#[must_use]
pub fn join_paths(parts: &[&str]) -> String {
    parts
        .iter()
        .flat_map(|part| part.split('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// A `(method, path pattern, handler)` triple
///
/// Segments prefixed with `:` are dynamic captures. The path is stored
/// normalised by [`join_paths`].
#[derive(Clone)]
pub struct Route {
    pub method: Method,
    pub path: String,
    pub handler: BoxedHandler,
}

impl Route {
    pub fn new<H: Handler>(method: Method, path: &str, handler: H) -> Self {
        Self::from_handler(method, path, Arc::new(handler))
    }

    /// Build a route around an already shared handler
    #[must_use]
    pub fn from_handler(method: Method, path: &str, handler: BoxedHandler) -> Self {
        Self {
            method,
            path: join_paths(&[path]),
            handler,
        }
    }

    /// Copy of this route mounted under `base_path`
    #[must_use]
    pub fn mounted_at(&self, base_path: &str) -> Self {
        Self {
            method: self.method.clone(),
            path: join_paths(&[base_path, &self.path]),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// What [`Controller::init`] reports about itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerInfo {
    pub name: String,
    /// Prefix joined in front of every route of the controller
    pub base_path: String,
}

/// Supplies routes to the route table builder at startup
pub trait Controller: Send + Sync {
    fn init(&self) -> ControllerInfo;
    fn routes(&self) -> Vec<Route>;
}

/// A named controller holding a list of routes under a base path
#[derive(Debug, Clone)]
pub struct BasicController {
    name: String,
    base_path: String,
    routes: Vec<Route>,
}

impl BasicController {
    #[must_use]
    pub fn new(name: &str, base_path: &str) -> Self {
        Self {
            name: name.to_string(),
            base_path: base_path.to_string(),
            routes: Vec::new(),
        }
    }

    /// Append a route; `endpoint` is relative to the base path
    pub fn add_route<H: Handler>(&mut self, method: Method, endpoint: &str, handler: H) -> &mut Self {
        self.routes.push(Route::new(method, endpoint, handler));
        self
    }

    /// Builder form of [`BasicController::add_route`]
    #[must_use]
    pub fn route<H: Handler>(mut self, method: Method, endpoint: &str, handler: H) -> Self {
        self.add_route(method, endpoint, handler);
        self
    }
}

impl Controller for BasicController {
    fn init(&self) -> ControllerInfo {
        ControllerInfo {
            name: self.name.clone(),
            base_path: self.base_path.clone(),
        }
    }

    fn routes(&self) -> Vec<Route> {
        self.routes.clone()
    }
}

/// A unit of composition: controllers plus named imports and exports
///
/// Modules refer to each other by name through a [`ModuleRegistry`], so the
/// graph is explicit and can be checked for cycles when the route table is
/// built.
#[derive(Clone, Default)]
pub struct Module {
    pub name: String,
    pub imports: Vec<String>,
    pub exports: Vec<String>,
    pub controllers: Vec<Arc<dyn Controller>>,
}

impl Module {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn import(mut self, name: &str) -> Self {
        self.imports.push(name.to_string());
        self
    }

    #[must_use]
    pub fn export(mut self, name: &str) -> Self {
        self.exports.push(name.to_string());
        self
    }

    #[must_use]
    pub fn controller<C: Controller + 'static>(mut self, controller: C) -> Self {
        self.controllers.push(Arc::new(controller));
        self
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("imports", &self.imports)
            .field("exports", &self.exports)
            .field("controllers", &self.controllers.len())
            .finish()
    }
}

/// Named collection of modules forming the application graph
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, Module>,
}

impl ModuleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module; names must be unique
    pub fn register(&mut self, module: Module) -> Result<(), RouteTableError> {
        if self.modules.contains_key(&module.name) {
            return Err(RouteTableError::DuplicateModule(module.name));
        }
        self.modules.insert(module.name.clone(), module);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    fn lookup(&self, name: &str) -> Result<&Module, RouteTableError> {
        self.get(name)
            .ok_or_else(|| RouteTableError::UnknownModule(name.to_string()))
    }

    /// Modules reachable from `root` through imports, root first, each once.
    ///
    /// Fails on an unknown import or export, or on an import cycle.
    pub fn resolve_order(&self, root: &str) -> Result<Vec<&Module>, RouteTableError> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Visit {
            InProgress,
            Done,
        }

        let root = self.lookup(root)?;
        let mut state: HashMap<&str, Visit> = HashMap::new();
        let mut order: Vec<&Module> = Vec::new();
        // (module, index of the next import to follow)
        let mut stack: Vec<(&Module, usize)> = Vec::new();

        state.insert(root.name.as_str(), Visit::InProgress);
        order.push(root);
        stack.push((root, 0));

        while let Some(top) = stack.len().checked_sub(1) {
            let (module, next) = stack[top];
            let Some(import) = module.imports.get(next) else {
                for export in &module.exports {
                    self.lookup(export)?;
                }
                state.insert(module.name.as_str(), Visit::Done);
                stack.pop();
                continue;
            };
            stack[top].1 += 1;

            match state.get(import.as_str()) {
                Some(Visit::Done) => {}
                Some(Visit::InProgress) => {
                    let start = stack
                        .iter()
                        .position(|(m, _)| m.name == *import)
                        .unwrap_or(0);
                    let mut cycle: Vec<String> =
                        stack[start..].iter().map(|(m, _)| m.name.clone()).collect();
                    cycle.push(import.clone());
                    return Err(RouteTableError::ModuleCycle(cycle));
                }
                None => {
                    let imported = self.lookup(import)?;
                    state.insert(imported.name.as_str(), Visit::InProgress);
                    order.push(imported);
                    stack.push((imported, 0));
                }
            }
        }

        Ok(order)
    }
}

/// The flattened, ordered route list fed to the route trie
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Flatten the given controllers in order, joining each base path with
    /// its routes' paths.
    pub fn from_controllers(controllers: &[Arc<dyn Controller>], logger: &dyn Logger) -> Self {
        let mut routes = Vec::new();
        for controller in controllers {
            let info = controller.init();
            logger.log(
                "ControllerResolver",
                &format!("{} | {}", info.name, info.base_path),
            );
            for route in controller.routes() {
                if !is_supported_method(&route.method) {
                    logger.warn(
                        "ControllerResolver",
                        &format!(
                            "Skipping {} {{{{ {} }}}}: unsupported method",
                            route.method, route.path
                        ),
                    );
                    continue;
                }
                routes.push(route.mounted_at(&info.base_path));
            }
        }
        Self { routes }
    }

    /// Flatten the controllers of every module reachable from `root`
    pub fn from_registry(
        registry: &ModuleRegistry,
        root: &str,
        logger: &dyn Logger,
    ) -> Result<Self, RouteTableError> {
        let controllers: Vec<Arc<dyn Controller>> = registry
            .resolve_order(root)?
            .into_iter()
            .flat_map(|module| module.controllers.iter().cloned())
            .collect();
        Ok(Self::from_controllers(&controllers, logger))
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[must_use]
    pub fn into_routes(self) -> Vec<Route> {
        self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
