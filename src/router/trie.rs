//! Segment trie for HTTP route matching
//!
//! The root's static children are keyed by HTTP method name; below each
//! method node there is one level per path segment. A node holds:
//!
//! - a map of static children keyed by the literal segment text
//! - at most **one** dynamic child (a `:name` segment), whatever its name
//! - an optional handler, set on the node where a registered route ends
//!
//! Nodes live in an arena (`Vec<TrieNode>`) and refer to each other by
//! [`NodeId`]. Insertion and lookup are loops over the path segments, so
//! deep paths cannot exhaust the coroutine stack.
//!
//! ## Matching rules
//!
//! - Static match always wins over the dynamic child at the same level.
//! - There is no backtracking: once a static child is taken, a dead end
//!   further down is a miss, even if the dynamic sibling would have matched.
//! - Empty segments (leading, trailing or doubled slashes) are ignored.
//!
//! ## Dynamic slot overwrite
//!
//! Registering a dynamic segment at a position already holding a dynamic
//! child with a *different* label replaces it, together with its subtree.
//! The same label reuses the existing node, so `/users/:id` and
//! `/users/:id/posts` coexist. [`InsertReport`] tells the caller when a
//! replacement happened.

use http::Method;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use super::core::{ParamVec, RouteMatch};
use crate::dispatcher::BoxedHandler;
use crate::logger::{Logger, PerfStatus};
use crate::module::Route;

/// Index of a node in the trie arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

const ROOT: NodeId = NodeId(0);

struct TrieNode {
    /// Method name, literal segment, or `:name` for dynamic nodes
    label: String,
    /// Number of path segments consumed to reach this node from its method node
    level: usize,
    handler: Option<BoxedHandler>,
    static_children: HashMap<String, NodeId>,
    dynamic_child: Option<NodeId>,
    /// Capture name for dynamic nodes (`label` minus the `:`)
    param_name: Option<Arc<str>>,
}

impl TrieNode {
    fn new(label: &str, level: usize) -> Self {
        Self {
            label: label.to_string(),
            level,
            handler: None,
            static_children: HashMap::new(),
            dynamic_child: None,
            param_name: None,
        }
    }

    fn new_dynamic(label: &str, param_name: &str, level: usize) -> Self {
        Self {
            param_name: Some(Arc::from(param_name)),
            ..Self::new(label, level)
        }
    }
}

/// What an insertion displaced, if anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertReport {
    /// Labels of dynamic children that were overwritten, outermost first
    pub replaced_dynamic: Vec<String>,
    /// A handler was already registered for this exact method and pattern
    pub replaced_handler: bool,
}

/// Method- and path-segment trie mapping requests to handlers
///
/// Built once before the acceptor starts and read-only afterwards, so
/// concurrent lookups need no locking.
pub struct RouteTrie {
    nodes: Vec<TrieNode>,
    route_count: usize,
}

impl Default for RouteTrie {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a path into its non-empty segments
fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

impl RouteTrie {
    /// Create an empty trie holding only the root
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::new("", 0)],
            route_count: 0,
        }
    }

    /// Build a trie from a flattened route list, logging each mapping
    pub fn build(routes: &[Route], logger: &dyn Logger) -> Self {
        let mut trie = Self::new();
        for route in routes {
            let start = Instant::now();
            let report = trie.insert(route);
            for label in &report.replaced_dynamic {
                logger.warn(
                    "ViewResolver",
                    &format!(
                        "Dynamic segment {label} replaced while mapping {} {{{{ {} }}}}",
                        route.method, route.path
                    ),
                );
            }
            if report.replaced_handler {
                logger.warn(
                    "ViewResolver",
                    &format!(
                        "Handler for {} {{{{ {} }}}} registered twice, last one wins",
                        route.method, route.path
                    ),
                );
            }
            logger.perf_log(
                "ViewResolver",
                &format!("Mapped {}, {{{{ {} }}}}", route.method, route.path),
                start.elapsed(),
                PerfStatus::Ok,
            );
        }
        logger.debug(
            "ViewResolver",
            &format!(
                "Route trie built: {} routes, {} nodes, depth {}",
                trie.len(),
                trie.node_count(),
                trie.max_depth()
            ),
        );
        trie
    }

    fn push(&mut self, node: TrieNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn node(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut TrieNode {
        &mut self.nodes[id.0]
    }

    /// Insert one route, creating intermediate nodes as needed
    pub fn insert(&mut self, route: &Route) -> InsertReport {
        let mut report = InsertReport::default();
        let method = route.method.as_str();

        let method_node = self.node(ROOT).static_children.get(method).copied();
        let mut current = match method_node {
            Some(id) => id,
            None => {
                let id = self.push(TrieNode::new(method, 0));
                self.node_mut(ROOT)
                    .static_children
                    .insert(method.to_string(), id);
                id
            }
        };

        for segment in segments(&route.path) {
            let level = self.node(current).level + 1;
            current = if let Some(param_name) = segment.strip_prefix(':') {
                let existing = self.node(current).dynamic_child;
                match existing {
                    Some(existing) if self.node(existing).label == segment => existing,
                    previous => {
                        if let Some(previous) = previous {
                            report
                                .replaced_dynamic
                                .push(self.node(previous).label.clone());
                            self.route_count -= self.handlers_under(previous);
                        }
                        let id = self.push(TrieNode::new_dynamic(segment, param_name, level));
                        self.node_mut(current).dynamic_child = Some(id);
                        id
                    }
                }
            } else {
                let existing = self.node(current).static_children.get(segment).copied();
                match existing {
                    Some(existing) => existing,
                    None => {
                        let id = self.push(TrieNode::new(segment, level));
                        self.node_mut(current)
                            .static_children
                            .insert(segment.to_string(), id);
                        id
                    }
                }
            };
        }

        let previous = self
            .node_mut(current)
            .handler
            .replace(Arc::clone(&route.handler));
        if previous.is_some() {
            report.replaced_handler = true;
        } else {
            self.route_count += 1;
        }
        report
    }

    /// Resolve a request path to its handler and parameter bindings.
    ///
    /// Returns `None` for an unknown method, a segment with neither a static
    /// nor a dynamic child, or a path ending on a node without a handler.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let mut current = *self.node(ROOT).static_children.get(method.as_str())?;
        let mut params = ParamVec::new();

        for segment in segments(path) {
            let node = self.node(current);
            current = if let Some(&next) = node.static_children.get(segment) {
                next
            } else if let Some(dynamic) = node.dynamic_child {
                if let Some(name) = &self.node(dynamic).param_name {
                    params.push((Arc::clone(name), segment.to_string()));
                }
                dynamic
            } else {
                return None;
            };
        }

        let handler = self.node(current).handler.as_ref()?;
        Some(RouteMatch {
            handler: Arc::clone(handler),
            params,
        })
    }

    /// Number of reachable routes. Re-registering a pattern does not add to
    /// it, and routes detached by a dynamic overwrite no longer count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }

    fn handlers_under(&self, id: NodeId) -> usize {
        let mut count = 0;
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            count += usize::from(node.handler.is_some());
            stack.extend(node.static_children.values().copied());
            stack.extend(node.dynamic_child);
        }
        count
    }

    /// Nodes allocated in the arena, including detached dynamic subtrees
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Deepest level reachable from any method node
    #[must_use]
    pub fn max_depth(&self) -> usize {
        let mut depth = 0;
        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            depth = depth.max(node.level);
            stack.extend(node.static_children.values().copied());
            stack.extend(node.dynamic_child);
        }
        depth
    }

    /// Every reachable `(method, pattern)` that carries a handler, sorted
    #[must_use]
    pub fn patterns(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for (method, &method_node) in &self.node(ROOT).static_children {
            let mut stack: Vec<(NodeId, String)> = vec![(method_node, String::new())];
            while let Some((id, prefix)) = stack.pop() {
                let node = self.node(id);
                if node.handler.is_some() {
                    let pattern = if prefix.is_empty() {
                        "/".to_string()
                    } else {
                        prefix.clone()
                    };
                    out.push((method.clone(), pattern));
                }
                for (segment, &child) in &node.static_children {
                    stack.push((child, format!("{prefix}/{segment}")));
                }
                if let Some(dynamic) = node.dynamic_child {
                    stack.push((dynamic, format!("{prefix}/{}", self.node(dynamic).label)));
                }
            }
        }
        out.sort();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{Request, Response};
    use crate::logger::{LogLevel, MemoryLogger};

    fn route(method: Method, path: &str, body: &'static str) -> Route {
        Route::new(method, path, move |_req: Request| Response::text(body))
    }

    fn call(trie: &RouteTrie, method: Method, path: &str) -> Option<(String, ParamVec)> {
        let m = trie.resolve(&method, path)?;
        let resp = m.handler.handle(Request::new(method, path));
        Some((resp.content.as_str()?.to_string(), m.params))
    }

    #[test]
    fn test_trie_simple_route() {
        let mut trie = RouteTrie::new();
        trie.insert(&route(Method::GET, "health", "ok"));

        let (body, params) = call(&trie, Method::GET, "health").unwrap();
        assert_eq!(body, "ok");
        assert!(params.is_empty());
    }

    #[test]
    fn test_trie_root_route() {
        let mut trie = RouteTrie::new();
        trie.insert(&route(Method::GET, "", "root"));
        assert_eq!(call(&trie, Method::GET, "").unwrap().0, "root");
        assert_eq!(call(&trie, Method::GET, "/").unwrap().0, "root");
    }

    #[test]
    fn test_trie_levels_increment_per_segment() {
        let mut trie = RouteTrie::new();
        trie.insert(&route(Method::GET, "a/b/:c/d", "x"));
        assert_eq!(trie.max_depth(), 4);
        // root + method + 4 segments
        assert_eq!(trie.node_count(), 6);
    }

    #[test]
    fn test_trie_identical_static_insert_reuses_nodes() {
        let mut trie = RouteTrie::new();
        trie.insert(&route(Method::GET, "a/b", "first"));
        let nodes = trie.node_count();
        let report = trie.insert(&route(Method::GET, "a/b", "second"));

        assert_eq!(trie.node_count(), nodes);
        assert!(report.replaced_handler);
        assert_eq!(trie.len(), 1);
        assert_eq!(call(&trie, Method::GET, "a/b").unwrap().0, "second");
    }

    #[test]
    fn test_trie_same_dynamic_label_is_shared() {
        let mut trie = RouteTrie::new();
        trie.insert(&route(Method::GET, "users/:id", "user"));
        let report = trie.insert(&route(Method::GET, "users/:id/posts", "posts"));

        assert!(report.replaced_dynamic.is_empty());
        assert_eq!(call(&trie, Method::GET, "users/1").unwrap().0, "user");
        assert_eq!(call(&trie, Method::GET, "users/1/posts").unwrap().0, "posts");
    }

    #[test]
    fn test_trie_dynamic_overwrite_is_reported() {
        let mut trie = RouteTrie::new();
        trie.insert(&route(Method::GET, "users/:id", "by_id"));
        let report = trie.insert(&route(Method::GET, "users/:name", "by_name"));

        assert_eq!(report.replaced_dynamic, vec![":id".to_string()]);
        assert_eq!(trie.len(), 1);
        let (body, params) = call(&trie, Method::GET, "users/bob").unwrap();
        assert_eq!(body, "by_name");
        assert_eq!(params[0].0.as_ref(), "name");
    }

    #[test]
    fn test_trie_overwrite_drops_whole_subtree_from_len() {
        let mut trie = RouteTrie::new();
        trie.insert(&route(Method::GET, "items/:id", "item"));
        trie.insert(&route(Method::GET, "items/:id/details", "details"));
        trie.insert(&route(Method::GET, "items/:id/tags/:tag", "tag"));
        trie.insert(&route(Method::GET, "items/all", "all"));
        assert_eq!(trie.len(), 4);

        trie.insert(&route(Method::GET, "items/:slug", "slug"));
        assert_eq!(trie.len(), 2);
        assert_eq!(trie.len(), trie.patterns().len());
    }

    #[test]
    fn test_trie_no_backtracking_into_dynamic_sibling() {
        let mut trie = RouteTrie::new();
        trie.insert(&route(Method::GET, "users/admin", "admin"));
        trie.insert(&route(Method::GET, "users/:id/posts", "posts"));

        // "admin" takes the static branch, which has no "posts" child
        assert!(trie.resolve(&Method::GET, "users/admin/posts").is_none());
        assert_eq!(call(&trie, Method::GET, "users/7/posts").unwrap().0, "posts");
    }

    #[test]
    fn test_trie_intermediate_node_has_no_handler() {
        let mut trie = RouteTrie::new();
        trie.insert(&route(Method::GET, "a/b/c", "deep"));
        assert!(trie.resolve(&Method::GET, "a/b").is_none());
        assert!(trie.resolve(&Method::GET, "a/b/c/d").is_none());
    }

    #[test]
    fn test_trie_patterns_lists_reachable_routes() {
        let mut trie = RouteTrie::new();
        trie.insert(&route(Method::GET, "", "root"));
        trie.insert(&route(Method::GET, "users/:id", "user"));
        trie.insert(&route(Method::POST, "users", "create"));

        assert_eq!(
            trie.patterns(),
            vec![
                ("GET".to_string(), "/".to_string()),
                ("GET".to_string(), "/users/:id".to_string()),
                ("POST".to_string(), "/users".to_string()),
            ]
        );
    }

    #[test]
    fn test_build_logs_each_mapping_and_overwrites() {
        let logger = MemoryLogger::new();
        let routes = vec![
            route(Method::GET, "users/:id", "a"),
            route(Method::GET, "users/:name", "b"),
        ];
        let trie = RouteTrie::build(&routes, &logger);

        assert_eq!(trie.len(), 1);
        assert_eq!(trie.len(), trie.patterns().len());
        let mapped = logger.find(LogLevel::Log, "ViewResolver");
        assert_eq!(mapped.len(), 2);
        assert_eq!(mapped[0].message, "Mapped GET, {{ users/:id }}");
        assert!(mapped[0].elapsed.is_some());
        assert_eq!(logger.find(LogLevel::Warn, "ViewResolver").len(), 1);
    }
}
