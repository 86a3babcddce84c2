use crate::dispatcher::BoxedHandler;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Maximum number of path parameters before heap allocation.
/// Most routes bind ≤4 dynamic segments (e.g. `/users/:id/posts/:post`).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Param names use `Arc<str>` because they come from the trie, which is
/// built once at startup; values are per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of resolving a request path in the trie
#[derive(Clone)]
pub struct RouteMatch {
    pub handler: BoxedHandler,
    /// Dynamic segment bindings in path order
    pub params: ParamVec,
}

impl RouteMatch {
    /// Get a bound parameter by name (last write wins)
    #[inline]
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for RouteMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
